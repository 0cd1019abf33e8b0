//! Statistics data model for shortened URLs
//!
//! Mirrors the payload returned by the spoo.me statistics endpoint and adds
//! the derived views the bot renders: dense daily click series, click
//! averages and the last-click summary.

use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Full statistics record for one short code
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UrlStatistics {
    /// The short code this record describes
    #[serde(rename = "_id")]
    pub short_code: String,
    /// The original long URL
    #[serde(rename = "url")]
    pub long_url: String,
    /// Total number of clicks
    #[serde(rename = "total-clicks")]
    pub total_clicks: u64,
    /// Total number of unique clicks
    #[serde(rename = "total_unique_clicks")]
    pub total_unique_clicks: u64,
    /// Creation timestamp as reported by the service
    #[serde(rename = "creation-date")]
    pub created_at: String,
    /// Timestamp of the most recent click, if any
    #[serde(rename = "last-click")]
    pub last_click_time: Option<String>,
    /// Browser used for the most recent click
    #[serde(rename = "last-click-browser")]
    pub last_click_browser: Option<String>,
    /// Platform used for the most recent click
    #[serde(rename = "last-click-os")]
    pub last_click_platform: Option<String>,
    /// Clicks per platform
    #[serde(rename = "os_name", default)]
    pub platforms: HashMap<String, u64>,
    /// Unique clicks per platform
    #[serde(rename = "unique_os_name", default)]
    pub unique_platforms: HashMap<String, u64>,
    /// Clicks per browser
    #[serde(rename = "browser", default)]
    pub browsers: HashMap<String, u64>,
    /// Unique clicks per browser
    #[serde(rename = "unique_browser", default)]
    pub unique_browsers: HashMap<String, u64>,
    /// Clicks per referrer
    #[serde(rename = "referrer", default)]
    pub referrers: HashMap<String, u64>,
    /// Unique clicks per referrer
    #[serde(rename = "unique_referrer", default)]
    pub unique_referrers: HashMap<String, u64>,
    /// Clicks per country
    #[serde(rename = "country", default)]
    pub countries: HashMap<String, u64>,
    /// Unique clicks per country
    #[serde(rename = "unique_country", default)]
    pub unique_countries: HashMap<String, u64>,
    /// Clicks per day, keyed by `YYYY-MM-DD`
    #[serde(rename = "counter", default)]
    pub daily_clicks: HashMap<String, u64>,
    /// Unique clicks per day, keyed by `YYYY-MM-DD`
    #[serde(rename = "unique_counter", default)]
    pub daily_unique_clicks: HashMap<String, u64>,
    /// Click limit configured for the short URL, if any
    #[serde(rename = "max-clicks")]
    pub max_clicks: Option<u64>,
    /// Whether the URL is password protected
    #[serde(default)]
    pub password: Option<String>,
}

/// Summary of the most recent click on a short URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastClick {
    pub time: String,
    pub browser: String,
    pub platform: String,
}

/// Dense, date-ordered click series for chart rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickSeries {
    /// (date label, click count) pairs, oldest first
    pub points: Vec<(String, u64)>,
}

impl ClickSeries {
    /// Date labels in chronological order
    pub fn labels(&self) -> Vec<&str> {
        self.points.iter().map(|(label, _)| label.as_str()).collect()
    }

    /// Click counts in chronological order
    pub fn values(&self) -> Vec<u64> {
        self.points.iter().map(|(_, count)| *count).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl UrlStatistics {
    /// Clicks for the last `n` days, including today, zero-filled and
    /// ordered oldest first
    pub fn last_n_days(&self, n: u32) -> ClickSeries {
        Self::series_window(&self.daily_clicks, n, Utc::now().date_naive())
    }

    /// Unique clicks for the last `n` days, zero-filled, oldest first
    pub fn last_n_days_unique(&self, n: u32) -> ClickSeries {
        Self::series_window(&self.daily_unique_clicks, n, Utc::now().date_naive())
    }

    fn series_window(counter: &HashMap<String, u64>, n: u32, today: NaiveDate) -> ClickSeries {
        let mut points = Vec::with_capacity(n as usize);
        for offset in (0..n as i64).rev() {
            let day = today - Duration::days(offset);
            let label = day.format("%Y-%m-%d").to_string();
            let count = counter.get(&label).copied().unwrap_or(0);
            points.push((label, count));
        }
        ClickSeries { points }
    }

    /// The most recent click, if the URL has been clicked at all
    pub fn last_click(&self) -> Option<LastClick> {
        self.last_click_time.as_ref().map(|time| LastClick {
            time: time.clone(),
            browser: self
                .last_click_browser
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            platform: self
                .last_click_platform
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
        })
    }

    /// Average clicks per day since the URL was created
    pub fn average_daily_clicks(&self) -> f64 {
        let days = self.age_in_days().max(1) as f64;
        round2(self.total_clicks as f64 / days)
    }

    /// Average clicks per week since the URL was created
    pub fn average_weekly_clicks(&self) -> f64 {
        round2(self.average_daily_clicks() * 7.0)
    }

    /// Average clicks per month since the URL was created
    pub fn average_monthly_clicks(&self) -> f64 {
        round2(self.average_daily_clicks() * 30.0)
    }

    /// Whether the URL is password protected
    pub fn is_protected(&self) -> bool {
        self.password.is_some()
    }

    fn age_in_days(&self) -> i64 {
        parse_service_date(&self.created_at)
            .map(|created| (Utc::now().date_naive() - created).num_days())
            .unwrap_or(0)
    }
}

/// Parse a date in the formats the service emits (`YYYY-MM-DD` with or
/// without a time component)
fn parse_service_date(value: &str) -> Option<NaiveDate> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.date())
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .ok()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
