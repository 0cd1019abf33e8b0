//! Chart and export option enumerations and rendering request types

use serde::{Deserialize, Serialize};
use spoobot_common::UrlStatistics;
use std::collections::HashMap;
use std::path::PathBuf;

/// The chart options offered on a statistics report. Each may be rendered
/// at most once per report session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartKind {
    PlatformAnalysis,
    BrowserAnalysis,
    ReferrerAnalysis,
    CountriesHeatmap,
    UniqueCountriesHeatmap,
    ClicksOverTime,
}

impl ChartKind {
    /// All chart options, in menu order
    pub const ALL: [ChartKind; 6] = [
        ChartKind::PlatformAnalysis,
        ChartKind::BrowserAnalysis,
        ChartKind::ReferrerAnalysis,
        ChartKind::CountriesHeatmap,
        ChartKind::UniqueCountriesHeatmap,
        ChartKind::ClicksOverTime,
    ];

    /// Stable identifier used as the select menu option value
    pub fn value(&self) -> &'static str {
        match self {
            ChartKind::PlatformAnalysis => "platform_analysis",
            ChartKind::BrowserAnalysis => "browser_analysis",
            ChartKind::ReferrerAnalysis => "referrer_analysis",
            ChartKind::CountriesHeatmap => "countries_heatmap",
            ChartKind::UniqueCountriesHeatmap => "unique_countries_heatmap",
            ChartKind::ClicksOverTime => "clicks_over_time",
        }
    }

    /// Parse a select menu value back into a chart kind
    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.value() == value)
    }

    /// Human-readable menu label
    pub fn label(&self) -> &'static str {
        match self {
            ChartKind::PlatformAnalysis => "Platforms Analysis",
            ChartKind::BrowserAnalysis => "Browsers Analysis",
            ChartKind::ReferrerAnalysis => "Referrers Analysis",
            ChartKind::CountriesHeatmap => "Countries Heatmap",
            ChartKind::UniqueCountriesHeatmap => "Unique Countries Heatmap",
            ChartKind::ClicksOverTime => "Clicks Over Time",
        }
    }

    /// Emoji shown next to the menu label
    pub fn emoji(&self) -> &'static str {
        match self {
            ChartKind::PlatformAnalysis => "📱",
            ChartKind::BrowserAnalysis => "🌐",
            ChartKind::ReferrerAnalysis => "🔗",
            ChartKind::CountriesHeatmap => "🔥",
            ChartKind::UniqueCountriesHeatmap => "🌍",
            ChartKind::ClicksOverTime => "📈",
        }
    }

    /// Menu option description
    pub fn description(&self) -> &'static str {
        match self {
            ChartKind::PlatformAnalysis => "Generate a chart for platforms analysis trend",
            ChartKind::BrowserAnalysis => "Generate a chart for browsers analysis trend",
            ChartKind::ReferrerAnalysis => "Generate a chart for referrers analysis trend",
            ChartKind::CountriesHeatmap => "Generate a heatmap for countries analysis trend",
            ChartKind::UniqueCountriesHeatmap => {
                "Generate a heatmap for unique countries analysis trend"
            }
            ChartKind::ClicksOverTime => "Generate a chart for clicks over the last 30 days",
        }
    }

    /// Embed description shown above the rendered image
    pub fn summary(&self) -> &'static str {
        match self {
            ChartKind::PlatformAnalysis => {
                "This chart shows the trend of platforms used to access the URL"
            }
            ChartKind::BrowserAnalysis => {
                "This chart shows the trend of browsers used to access the URL"
            }
            ChartKind::ReferrerAnalysis => {
                "This chart shows the trend of referrers used to access the URL"
            }
            ChartKind::CountriesHeatmap => {
                "This heatmap shows the countries from where the URL was accessed"
            }
            ChartKind::UniqueCountriesHeatmap => {
                "This heatmap shows the unique clicks countries where the URL was accessed"
            }
            ChartKind::ClicksOverTime => {
                "This chart shows the trend of clicks over the last 30 days"
            }
        }
    }

    /// Whether this option renders locally as a heatmap instead of going
    /// through the hosted chart service
    pub fn is_heatmap(&self) -> bool {
        matches!(
            self,
            ChartKind::CountriesHeatmap | ChartKind::UniqueCountriesHeatmap
        )
    }
}

/// The export formats offered on a statistics report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExportFormat {
    Json,
    Csv,
    Xlsx,
}

impl ExportFormat {
    /// All export formats, in menu order
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Json, ExportFormat::Csv, ExportFormat::Xlsx];

    /// Stable identifier used as the select menu option value
    pub fn value(&self) -> &'static str {
        match self {
            ExportFormat::Json => "export_json",
            ExportFormat::Csv => "export_csv",
            ExportFormat::Xlsx => "export_xlsx",
        }
    }

    /// Parse a select menu value back into an export format
    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|format| format.value() == value)
    }

    /// Human-readable menu label
    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Json => "Export as JSON",
            ExportFormat::Csv => "Export as CSV",
            ExportFormat::Xlsx => "Export as Excel",
        }
    }

    /// Emoji shown next to the menu label
    pub fn emoji(&self) -> &'static str {
        match self {
            ExportFormat::Json => "🔑",
            ExportFormat::Csv => "📝",
            ExportFormat::Xlsx => "📊",
        }
    }

    /// Menu option description
    pub fn description(&self) -> &'static str {
        match self {
            ExportFormat::Json => "Export the statistics data as JSON",
            ExportFormat::Csv => "Export the statistics data as CSV",
            ExportFormat::Xlsx => "Export the statistics data as Excel",
        }
    }

    /// File extension for the exported file
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}

/// A rendered chart: either a hosted image URL or a local image file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartArtifact {
    /// Image hosted by the chart rendering service
    Url(String),
    /// Image written to a local file (heatmaps)
    File(PathBuf),
}

/// An exported statistics file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub path: PathBuf,
    pub file_name: String,
    pub size_bytes: u64,
}

/// Chart.js chart type for the hosted rendering service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartJsType {
    Bar,
    Line,
}

impl ChartJsType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartJsType::Bar => "bar",
            ChartJsType::Line => "line",
        }
    }
}

/// A fill/border color pair for one dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorPair {
    pub fill: String,
    pub border: String,
}

impl ColorPair {
    pub fn new(fill: impl Into<String>, border: impl Into<String>) -> Self {
        Self {
            fill: fill.into(),
            border: border.into(),
        }
    }
}

/// Dataset colors per chart family
#[derive(Debug, Clone)]
pub struct ChartPalette {
    pub platform: Vec<ColorPair>,
    pub browser: Vec<ColorPair>,
    pub referrer: Vec<ColorPair>,
    pub timeline: Vec<ColorPair>,
}

impl Default for ChartPalette {
    fn default() -> Self {
        Self {
            platform: vec![
                ColorPair::new("rgba(0, 0, 255, 0.15)", "rgb(0, 0, 255)"),
                ColorPair::new("rgba(255, 69, 0, 0.15)", "rgb(255, 69, 0)"),
            ],
            browser: vec![
                ColorPair::new("rgba(153, 102, 255, 0.15)", "rgb(153, 102, 255)"),
                ColorPair::new("rgba(255, 159, 64, 0.15)", "rgb(255, 159, 64)"),
            ],
            referrer: vec![
                ColorPair::new("rgba(255, 105, 180, 0.15)", "rgb(255, 105, 180)"),
                ColorPair::new("rgba(60, 179, 113, 0.15)", "rgb(60, 179, 113)"),
            ],
            timeline: vec![
                ColorPair::new("rgba(75, 192, 192, 0.15)", "rgb(75, 192, 192)"),
                ColorPair::new("rgba(85, 52, 235, 0.25)", "rgb(85, 52, 235)"),
            ],
        }
    }
}

impl ChartPalette {
    /// Colors for a given chart kind
    pub fn for_kind(&self, kind: ChartKind) -> &[ColorPair] {
        match kind {
            ChartKind::PlatformAnalysis => &self.platform,
            ChartKind::BrowserAnalysis => &self.browser,
            ChartKind::ReferrerAnalysis => &self.referrer,
            // Heatmaps don't go through the chart service; the timeline
            // palette is only a fallback here
            ChartKind::ClicksOverTime
            | ChartKind::CountriesHeatmap
            | ChartKind::UniqueCountriesHeatmap => &self.timeline,
        }
    }
}

/// One dataset in a chart request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartDataset {
    pub label: String,
    pub values: Vec<u64>,
}

/// A fully assembled chart rendering request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub title: String,
    pub chart_type: ChartJsType,
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
    pub colors: Vec<ColorPair>,
}

impl ChartRequest {
    /// Build the request for a non-heatmap chart kind from a statistics
    /// record. Heatmap kinds have no hosted-chart request.
    pub fn for_kind(
        kind: ChartKind,
        stats: &UrlStatistics,
        palette: &ChartPalette,
    ) -> Option<Self> {
        let colors = palette.for_kind(kind).to_vec();
        match kind {
            ChartKind::PlatformAnalysis => Some(Self::breakdown_chart(
                "Platforms Analysis Chart",
                &stats.platforms,
                &stats.unique_platforms,
                colors,
            )),
            ChartKind::BrowserAnalysis => Some(Self::breakdown_chart(
                "Browsers Analysis Chart",
                &stats.browsers,
                &stats.unique_browsers,
                colors,
            )),
            ChartKind::ReferrerAnalysis => Some(Self::breakdown_chart(
                "Referrers Analysis Chart",
                &stats.referrers,
                &stats.unique_referrers,
                colors,
            )),
            ChartKind::ClicksOverTime => {
                let clicks = stats.last_n_days(30);
                let unique = stats.last_n_days_unique(30);
                Some(Self {
                    title: "Clicks Over Time Chart".to_string(),
                    chart_type: ChartJsType::Line,
                    labels: clicks.labels().iter().map(|s| s.to_string()).collect(),
                    datasets: vec![
                        ChartDataset {
                            label: "Clicks".to_string(),
                            values: clicks.values(),
                        },
                        ChartDataset {
                            label: "Unique Clicks".to_string(),
                            values: unique.values(),
                        },
                    ],
                    colors,
                })
            }
            ChartKind::CountriesHeatmap | ChartKind::UniqueCountriesHeatmap => None,
        }
    }

    /// The seven-day clicks line chart embedded in the initial report
    pub fn summary(stats: &UrlStatistics, palette: &ChartPalette) -> Self {
        let clicks = stats.last_n_days(7);
        let unique = stats.last_n_days_unique(7);
        Self {
            title: "Clicks Over Time Chart".to_string(),
            chart_type: ChartJsType::Line,
            labels: clicks.labels().iter().map(|s| s.to_string()).collect(),
            datasets: vec![
                ChartDataset {
                    label: "Clicks".to_string(),
                    values: clicks.values(),
                },
                ChartDataset {
                    label: "Unique Clicks".to_string(),
                    values: unique.values(),
                },
            ],
            colors: palette.timeline.clone(),
        }
    }

    /// Bar chart of clicks and unique clicks across one breakdown map.
    /// Labels come from the clicks map, largest first; the unique dataset is
    /// aligned on the same labels.
    fn breakdown_chart(
        title: &str,
        clicks: &HashMap<String, u64>,
        unique: &HashMap<String, u64>,
        colors: Vec<ColorPair>,
    ) -> Self {
        let mut entries: Vec<(&String, &u64)> = clicks.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        let labels: Vec<String> = entries.iter().map(|(name, _)| (*name).clone()).collect();
        let click_values: Vec<u64> = entries.iter().map(|(_, count)| **count).collect();
        let unique_values: Vec<u64> = labels
            .iter()
            .map(|name| unique.get(name).copied().unwrap_or(0))
            .collect();

        Self {
            title: title.to_string(),
            chart_type: ChartJsType::Bar,
            labels,
            datasets: vec![
                ChartDataset {
                    label: "Clicks".to_string(),
                    values: click_values,
                },
                ChartDataset {
                    label: "Unique Clicks".to_string(),
                    values: unique_values,
                },
            ],
            colors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_stats() -> UrlStatistics {
        let json = r#"{
            "_id": "ga",
            "url": "https://example.com",
            "total-clicks": 42,
            "total_unique_clicks": 30,
            "creation-date": "2024-02-09",
            "os_name": {"Linux": 20, "Windows": 22},
            "unique_os_name": {"Linux": 15},
            "browser": {"Firefox": 25},
            "unique_browser": {"Firefox": 18},
            "referrer": {"direct": 40},
            "unique_referrer": {"direct": 28},
            "country": {"Germany": 12, "India": 30},
            "unique_country": {"Germany": 10},
            "counter": {},
            "unique_counter": {}
        }"#;
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_chart_kind_roundtrip() {
        for kind in ChartKind::ALL {
            assert_eq!(ChartKind::from_value(kind.value()), Some(kind));
        }
        assert_eq!(ChartKind::from_value("bogus"), None);
    }

    #[test]
    fn test_export_format_roundtrip() {
        for format in ExportFormat::ALL {
            assert_eq!(ExportFormat::from_value(format.value()), Some(format));
        }
        assert_eq!(ExportFormat::from_value("bogus"), None);
    }

    #[test]
    fn test_option_group_sizes() {
        assert_eq!(ChartKind::ALL.len(), 6);
        assert_eq!(ExportFormat::ALL.len(), 3);
    }

    #[test]
    fn test_heatmap_kinds() {
        assert!(ChartKind::CountriesHeatmap.is_heatmap());
        assert!(ChartKind::UniqueCountriesHeatmap.is_heatmap());
        assert!(!ChartKind::PlatformAnalysis.is_heatmap());
        assert!(!ChartKind::ClicksOverTime.is_heatmap());
    }

    #[test]
    fn test_breakdown_chart_aligns_datasets() {
        let stats = sample_stats();
        let request =
            ChartRequest::for_kind(ChartKind::PlatformAnalysis, &stats, &ChartPalette::default())
                .unwrap();

        assert_eq!(request.chart_type, ChartJsType::Bar);
        // Sorted by click count, largest first
        assert_eq!(request.labels, vec!["Windows", "Linux"]);
        assert_eq!(request.datasets[0].values, vec![22, 20]);
        // Missing unique entries are zero-filled on the same label order
        assert_eq!(request.datasets[1].values, vec![0, 15]);
    }

    #[test]
    fn test_clicks_over_time_request() {
        let stats = sample_stats();
        let request =
            ChartRequest::for_kind(ChartKind::ClicksOverTime, &stats, &ChartPalette::default())
                .unwrap();

        assert_eq!(request.chart_type, ChartJsType::Line);
        assert_eq!(request.labels.len(), 30);
        assert_eq!(request.datasets.len(), 2);
    }

    #[test]
    fn test_heatmap_kinds_have_no_hosted_request() {
        let stats = sample_stats();
        assert!(ChartRequest::for_kind(
            ChartKind::CountriesHeatmap,
            &stats,
            &ChartPalette::default()
        )
        .is_none());
    }
}
