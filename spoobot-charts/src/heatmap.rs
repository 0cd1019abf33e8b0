//! Country heatmap rendering
//!
//! Renders the per-country click breakdown as a color-graded bar map with a
//! dark theme matching the hosted charts. Output is a PNG on disk that the
//! stats embed attaches.

use plotters::prelude::*;
use spoobot_common::{Result, SpooBotError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

const BACKGROUND: RGBColor = RGBColor(32, 34, 37);
const GRID: RGBColor = RGBColor(46, 48, 53);

// YlOrRd-style ramp endpoints
const HEAT_LOW: (u8, u8, u8) = (255, 237, 160);
const HEAT_HIGH: (u8, u8, u8) = (189, 0, 38);

/// Renderer for country click heatmaps
#[derive(Debug, Clone)]
pub struct HeatmapRenderer {
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// Maximum number of countries drawn; the smallest are dropped beyond
    /// this
    pub max_countries: usize,
}

impl Default for HeatmapRenderer {
    fn default() -> Self {
        Self {
            width: 1500,
            height: 1000,
            max_countries: 25,
        }
    }
}

impl HeatmapRenderer {
    pub fn new(width: u32, height: u32, max_countries: usize) -> Self {
        Self {
            width,
            height,
            max_countries,
        }
    }

    /// Render the heatmap to a fresh temporary PNG and return its path
    #[instrument(skip(self, counts), fields(countries = counts.len()))]
    pub fn render(&self, title: &str, counts: &HashMap<String, u64>) -> Result<PathBuf> {
        let file = tempfile::Builder::new()
            .prefix("spoobot-heatmap-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| SpooBotError::chart_with_source("Failed to create heatmap file", e))?;
        let path = file
            .into_temp_path()
            .keep()
            .map_err(|e| SpooBotError::chart_with_source("Failed to keep heatmap file", e))?;

        self.render_to(title, counts, &path)?;
        info!("Heatmap rendered to {}", path.display());
        Ok(path)
    }

    /// Render the heatmap to a specific path
    pub fn render_to(&self, title: &str, counts: &HashMap<String, u64>, path: &Path) -> Result<()> {
        if counts.is_empty() {
            return Err(SpooBotError::chart("No country data to render"));
        }

        let mut entries: Vec<(&String, &u64)> = counts.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        if entries.len() > self.max_countries {
            debug!(
                "Dropping {} low-count countries from heatmap",
                entries.len() - self.max_countries
            );
            entries.truncate(self.max_countries);
        }

        let rows = entries.len();
        let max_value = entries.iter().map(|(_, count)| **count).max().unwrap_or(1);
        let x_max = max_value as f64 * 1.05;

        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&BACKGROUND)
            .map_err(|e| SpooBotError::chart(e.to_string()))?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 32).into_font().color(&WHITE))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(200)
            .build_cartesian_2d(0f64..x_max, 0f64..rows as f64)
            .map_err(|e| SpooBotError::chart(e.to_string()))?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(0)
            .x_desc("Clicks")
            .axis_style(&GRID)
            .light_line_style(&GRID)
            .label_style(("sans-serif", 18).into_font().color(&WHITE))
            .draw()
            .map_err(|e| SpooBotError::chart(e.to_string()))?;

        // Bars, hottest country on top
        chart
            .draw_series(entries.iter().enumerate().map(|(i, (_, count))| {
                let y = (rows - 1 - i) as f64;
                let color = heat_color(**count, max_value);
                Rectangle::new([(0.0, y + 0.15), (**count as f64, y + 0.85)], color.filled())
            }))
            .map_err(|e| SpooBotError::chart(e.to_string()))?;

        // Country names drawn inside the plot area next to their bars
        chart
            .draw_series(entries.iter().enumerate().map(|(i, (name, _))| {
                let y = (rows - 1 - i) as f64;
                Text::new(
                    (*name).clone(),
                    (x_max * 0.01, y + 0.35),
                    ("sans-serif", 18).into_font().color(&WHITE),
                )
            }))
            .map_err(|e| SpooBotError::chart(e.to_string()))?;

        root.present()
            .map_err(|e| SpooBotError::chart(e.to_string()))?;
        Ok(())
    }
}

/// Interpolate the heat ramp for a count relative to the maximum
fn heat_color(count: u64, max: u64) -> RGBColor {
    let t = if max == 0 {
        0.0
    } else {
        count as f64 / max as f64
    };
    let channel = |low: u8, high: u8| -> u8 {
        (low as f64 + t * (high as f64 - low as f64)).round() as u8
    };
    RGBColor(
        channel(HEAT_LOW.0, HEAT_HIGH.0),
        channel(HEAT_LOW.1, HEAT_HIGH.1),
        channel(HEAT_LOW.2, HEAT_HIGH.2),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_counts() -> HashMap<String, u64> {
        let mut counts = HashMap::new();
        counts.insert("India".to_string(), 30);
        counts.insert("Germany".to_string(), 12);
        counts.insert("Brazil".to_string(), 5);
        counts
    }

    #[test]
    fn test_render_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heatmap.png");

        let renderer = HeatmapRenderer::new(800, 600, 25);
        renderer
            .render_to("Countries Heatmap", &sample_counts(), &path)
            .unwrap();

        let metadata = std::fs::metadata(&path).unwrap();
        assert!(metadata.len() > 0);
    }

    #[test]
    fn test_empty_counts_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heatmap.png");

        let renderer = HeatmapRenderer::default();
        let result = renderer.render_to("Countries Heatmap", &HashMap::new(), &path);
        assert!(result.is_err());
    }

    #[test]
    fn test_max_countries_cap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heatmap.png");

        let mut counts = HashMap::new();
        for i in 0..40 {
            counts.insert(format!("Country {}", i), i as u64);
        }

        // Rendering more countries than the cap must not fail
        let renderer = HeatmapRenderer::new(800, 600, 10);
        renderer
            .render_to("Countries Heatmap", &counts, &path)
            .unwrap();
    }

    #[test]
    fn test_heat_color_endpoints() {
        assert_eq!(heat_color(0, 100), RGBColor(255, 237, 160));
        assert_eq!(heat_color(100, 100), RGBColor(189, 0, 38));
    }
}
