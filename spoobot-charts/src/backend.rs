//! Rendering and export seams used by the report session

use crate::export::StatsExporter;
use crate::heatmap::HeatmapRenderer;
use crate::quickchart::QuickChartClient;
use crate::types::{ChartArtifact, ChartKind, ChartPalette, ChartRequest, ExportFormat, ExportedFile};
use async_trait::async_trait;
use spoobot_common::{Result, SpooBotError, UrlStatistics};

/// Renders one chart option for a statistics record
#[async_trait]
pub trait ChartBackend: Send + Sync {
    async fn render(&self, kind: ChartKind, stats: &UrlStatistics) -> Result<ChartArtifact>;
}

/// Produces one export file for a statistics record
#[async_trait]
pub trait ExportBackend: Send + Sync {
    async fn export(&self, stats: &UrlStatistics, format: ExportFormat) -> Result<ExportedFile>;
}

/// Production rendering stack: hosted charts, local heatmaps, file exports
pub struct RenderStack {
    charts: QuickChartClient,
    heatmaps: HeatmapRenderer,
    exporter: StatsExporter,
    palette: ChartPalette,
}

impl RenderStack {
    pub fn new(
        charts: QuickChartClient,
        heatmaps: HeatmapRenderer,
        palette: ChartPalette,
    ) -> Self {
        Self {
            charts,
            heatmaps,
            exporter: StatsExporter::new(),
            palette,
        }
    }

    /// Render the seven-day clicks chart embedded in the initial report
    pub async fn render_summary(&self, stats: &UrlStatistics) -> Result<String> {
        let request = ChartRequest::summary(stats, &self.palette);
        self.charts.create_chart(&request).await
    }
}

#[async_trait]
impl ChartBackend for RenderStack {
    async fn render(&self, kind: ChartKind, stats: &UrlStatistics) -> Result<ChartArtifact> {
        match kind {
            ChartKind::CountriesHeatmap => {
                let path = self.heatmaps.render("Countries Heatmap", &stats.countries)?;
                Ok(ChartArtifact::File(path))
            }
            ChartKind::UniqueCountriesHeatmap => {
                let path = self
                    .heatmaps
                    .render("Unique Countries Heatmap", &stats.unique_countries)?;
                Ok(ChartArtifact::File(path))
            }
            _ => {
                let request = ChartRequest::for_kind(kind, stats, &self.palette)
                    .ok_or_else(|| SpooBotError::chart("No hosted chart for this option"))?;
                let url = self.charts.create_chart(&request).await?;
                Ok(ChartArtifact::Url(url))
            }
        }
    }
}

#[async_trait]
impl ExportBackend for RenderStack {
    async fn export(&self, stats: &UrlStatistics, format: ExportFormat) -> Result<ExportedFile> {
        // File writing is quick enough to run inline on the worker thread
        self.exporter.export(stats, format)
    }
}
