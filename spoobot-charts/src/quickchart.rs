//! Hosted chart rendering client
//!
//! Builds Chart.js payloads and posts them to the chart-creation endpoint,
//! which responds with a hosted image URL the embeds can reference.

use crate::types::{ChartJsType, ChartRequest};
use serde::Deserialize;
use serde_json::{json, Value};
use spoobot_common::{Result, SpooBotError};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Styling applied to every rendered chart
#[derive(Debug, Clone)]
pub struct ChartStyle {
    pub background: String,
    pub grid_color: String,
    pub text_color: String,
    pub font_size: u32,
    pub border_width: u32,
    pub border_radius: u32,
    pub line_tension: f64,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            background: "rgb(32, 34, 37)".to_string(),
            grid_color: "rgb(46, 48, 53)".to_string(),
            text_color: "rgb(255, 255, 255)".to_string(),
            font_size: 20,
            border_width: 2,
            border_radius: 10,
            line_tension: 0.5,
        }
    }
}

/// Response from the chart-creation endpoint
#[derive(Debug, Deserialize)]
struct CreateChartResponse {
    #[serde(default)]
    success: bool,
    url: Option<String>,
}

/// Client for the hosted chart rendering service
#[derive(Debug, Clone)]
pub struct QuickChartClient {
    client: reqwest::Client,
    endpoint: String,
    style: ChartStyle,
}

impl QuickChartClient {
    /// Create a new client posting to the given chart-creation endpoint
    pub fn new(endpoint: impl Into<String>, style: ChartStyle) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SpooBotError::network_with_source("Failed to create HTTP client", e))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            style,
        })
    }

    /// Render a chart and return the hosted image URL
    #[instrument(skip(self, request), fields(title = %request.title))]
    pub async fn create_chart(&self, request: &ChartRequest) -> Result<String> {
        let payload = self.build_payload(request);
        debug!("Posting chart payload to {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({
                "chart": payload,
                "v": 4,
                "backgroundColor": self.style.background,
            }))
            .send()
            .await
            .map_err(|e| SpooBotError::chart_with_source("Chart service request failed", e))?;

        if !response.status().is_success() {
            return Err(SpooBotError::chart(format!(
                "Chart service returned {}",
                response.status()
            )));
        }

        let body: CreateChartResponse = response
            .json()
            .await
            .map_err(|e| SpooBotError::chart_with_source("Invalid chart service response", e))?;

        if !body.success {
            return Err(SpooBotError::chart("Chart service reported failure"));
        }

        let url = body
            .url
            .ok_or_else(|| SpooBotError::chart("Chart service response contained no URL"))?;

        info!("Chart rendered: {}", url);
        Ok(url)
    }

    /// Assemble the Chart.js configuration object
    fn build_payload(&self, request: &ChartRequest) -> Value {
        let datasets: Vec<Value> = request
            .datasets
            .iter()
            .enumerate()
            .map(|(index, dataset)| {
                // Reuse the last color pair if there are more datasets than colors
                let color = request
                    .colors
                    .get(index)
                    .or_else(|| request.colors.last());
                let (fill, border) = color
                    .map(|pair| (pair.fill.as_str(), pair.border.as_str()))
                    .unwrap_or(("rgba(75, 192, 192, 0.15)", "rgb(75, 192, 192)"));

                json!({
                    "label": dataset.label,
                    "data": dataset.values,
                    "fill": "origin",
                    "backgroundColor": fill,
                    "borderColor": border,
                    "borderWidth": self.style.border_width,
                    "borderRadius": self.style.border_radius,
                    "lineTension": self.style.line_tension,
                })
            })
            .collect();

        let mut scales = json!({
            "y": {
                "beginAtZero": true,
                "grid": { "color": self.style.grid_color },
                "ticks": { "color": self.style.text_color },
            },
            "x": {
                "grid": { "color": self.style.grid_color },
                "ticks": { "color": self.style.text_color },
            },
        });

        if request.chart_type == ChartJsType::Bar {
            scales["x"]["stacked"] = json!(true);
        }

        json!({
            "type": request.chart_type.as_str(),
            "data": {
                "labels": request.labels,
                "datasets": datasets,
            },
            "options": {
                "layout": {
                    "padding": { "left": 20, "right": 20, "top": 5, "bottom": 20 }
                },
                "scales": scales,
                "plugins": {
                    "title": {
                        "display": true,
                        "text": request.title,
                        "color": self.style.text_color,
                        "fontStyle": "bold",
                        "fontSize": self.style.font_size,
                    },
                    "legend": {
                        "display": true,
                        "labels": { "color": self.style.text_color },
                    },
                },
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChartDataset, ColorPair};

    fn sample_request(chart_type: ChartJsType) -> ChartRequest {
        ChartRequest {
            title: "Test Chart".to_string(),
            chart_type,
            labels: vec!["a".to_string(), "b".to_string()],
            datasets: vec![
                ChartDataset {
                    label: "Clicks".to_string(),
                    values: vec![3, 7],
                },
                ChartDataset {
                    label: "Unique Clicks".to_string(),
                    values: vec![2, 5],
                },
            ],
            colors: vec![
                ColorPair::new("rgba(0, 0, 255, 0.15)", "rgb(0, 0, 255)"),
                ColorPair::new("rgba(255, 69, 0, 0.15)", "rgb(255, 69, 0)"),
            ],
        }
    }

    fn test_client() -> QuickChartClient {
        QuickChartClient::new("https://quickchart.io/chart/create", ChartStyle::default()).unwrap()
    }

    #[test]
    fn test_payload_structure() {
        let payload = test_client().build_payload(&sample_request(ChartJsType::Line));

        assert_eq!(payload["type"], "line");
        assert_eq!(payload["data"]["labels"][0], "a");
        assert_eq!(payload["data"]["datasets"][0]["label"], "Clicks");
        assert_eq!(payload["data"]["datasets"][0]["data"][1], 7);
        assert_eq!(
            payload["data"]["datasets"][1]["borderColor"],
            "rgb(255, 69, 0)"
        );
        assert_eq!(payload["options"]["plugins"]["title"]["text"], "Test Chart");
    }

    #[test]
    fn test_bar_charts_are_stacked() {
        let client = test_client();

        let bar = client.build_payload(&sample_request(ChartJsType::Bar));
        assert_eq!(bar["options"]["scales"]["x"]["stacked"], true);

        let line = client.build_payload(&sample_request(ChartJsType::Line));
        assert!(line["options"]["scales"]["x"]["stacked"].is_null());
    }

    #[test]
    fn test_color_reuse_when_short() {
        let mut request = sample_request(ChartJsType::Bar);
        request.colors.truncate(1);

        let payload = test_client().build_payload(&request);
        // Second dataset falls back to the last configured pair
        assert_eq!(
            payload["data"]["datasets"][1]["borderColor"],
            "rgb(0, 0, 255)"
        );
    }
}
