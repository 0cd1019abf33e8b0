//! Chart rendering, heatmaps and statistics export for SpooBot
//!
//! The report session renders through the [`ChartBackend`] and
//! [`ExportBackend`] traits; this crate provides the production
//! implementations (hosted chart service, local plotters heatmap, file
//! exports) and the chart/export option enumerations.

pub mod backend;
pub mod export;
pub mod heatmap;
pub mod quickchart;
pub mod types;

pub use backend::{ChartBackend, ExportBackend, RenderStack};
pub use export::StatsExporter;
pub use heatmap::HeatmapRenderer;
pub use quickchart::{ChartStyle, QuickChartClient};
pub use types::{
    ChartArtifact, ChartDataset, ChartKind, ChartPalette, ChartRequest, ChartJsType, ColorPair,
    ExportFormat, ExportedFile,
};
