//! Stateful statistics report session
//!
//! One session per rendered statistics report. It owns the two option
//! groups offered on the report (six chart kinds, three export formats),
//! tracks which options have already been produced, rejects repeats without
//! re-rendering, and retires a group permanently once all of its options
//! have been consumed. The rendering collaborators are injected; a failed
//! render leaves the option selectable.

use parking_lot::Mutex;
use spoobot_charts::{
    ChartArtifact, ChartBackend, ChartKind, ExportBackend, ExportFormat, ExportedFile,
};
use spoobot_common::{Result, UrlStatistics};
use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;
use tracing::debug;

/// Outcome of a chart selection
#[derive(Debug)]
pub enum ChartSelection {
    /// The chart was rendered and the option is now consumed
    Rendered(ChartArtifact),
    /// The option was already produced in this session; nothing was rendered
    AlreadyUsed,
    /// The whole chart group is exhausted; nothing was rendered
    Exhausted,
}

/// Outcome of an export selection
#[derive(Debug)]
pub enum ExportSelection {
    /// The file was produced and the format is now consumed
    Exported(ExportedFile),
    /// The format was already produced in this session
    AlreadyUsed,
    /// The whole export group is exhausted
    Exhausted,
}

/// Result of reserving an option before the rendering call
enum Reservation {
    Proceed,
    AlreadyUsed,
    Exhausted,
}

/// One option group: consumed and in-flight sets plus the disabled flag.
/// `Active` until all `size` options are consumed, then `Exhausted` with no
/// way back within the session.
#[derive(Debug)]
struct GroupState<T> {
    consumed: HashSet<T>,
    in_flight: HashSet<T>,
    disabled: bool,
    size: usize,
}

impl<T: Copy + Eq + Hash> GroupState<T> {
    fn new(size: usize) -> Self {
        Self {
            consumed: HashSet::new(),
            in_flight: HashSet::new(),
            disabled: false,
            size,
        }
    }

    /// Reserve an option for rendering. An in-flight option counts as used
    /// so a near-simultaneous duplicate cannot render twice.
    fn try_reserve(&mut self, option: T) -> Reservation {
        if self.disabled {
            return Reservation::Exhausted;
        }
        if self.consumed.contains(&option) || self.in_flight.contains(&option) {
            return Reservation::AlreadyUsed;
        }
        self.in_flight.insert(option);
        Reservation::Proceed
    }

    /// Mark a reserved option consumed after a successful render
    fn commit(&mut self, option: T) {
        self.in_flight.remove(&option);
        self.consumed.insert(option);
        if self.consumed.len() == self.size {
            self.disabled = true;
        }
    }

    /// Release a reserved option after a failed render; it stays selectable
    fn rollback(&mut self, option: T) {
        self.in_flight.remove(&option);
    }
}

/// Interactive statistics report session
pub struct ReportSession {
    stats: UrlStatistics,
    charts: Mutex<GroupState<ChartKind>>,
    exports: Mutex<GroupState<ExportFormat>>,
    chart_backend: Arc<dyn ChartBackend>,
    export_backend: Arc<dyn ExportBackend>,
}

impl ReportSession {
    /// Create a session for one rendered report. Sessions are independent:
    /// two reports on the same short code track their options separately.
    pub fn new(
        stats: UrlStatistics,
        chart_backend: Arc<dyn ChartBackend>,
        export_backend: Arc<dyn ExportBackend>,
    ) -> Self {
        Self {
            stats,
            charts: Mutex::new(GroupState::new(ChartKind::ALL.len())),
            exports: Mutex::new(GroupState::new(ExportFormat::ALL.len())),
            chart_backend,
            export_backend,
        }
    }

    /// The short code this report is about
    pub fn short_code(&self) -> &str {
        &self.stats.short_code
    }

    /// The statistics record backing the report
    pub fn statistics(&self) -> &UrlStatistics {
        &self.stats
    }

    /// Whether the chart menu has been retired
    pub fn chart_menu_disabled(&self) -> bool {
        self.charts.lock().disabled
    }

    /// Whether the export menu has been retired
    pub fn export_menu_disabled(&self) -> bool {
        self.exports.lock().disabled
    }

    /// Render one chart option. Each option renders at most once per
    /// session; repeats and selections on an exhausted group return without
    /// touching the renderer. A renderer failure is surfaced as an error
    /// and leaves the option selectable.
    pub async fn select_chart(&self, kind: ChartKind) -> Result<ChartSelection> {
        match self.charts.lock().try_reserve(kind) {
            Reservation::AlreadyUsed => return Ok(ChartSelection::AlreadyUsed),
            Reservation::Exhausted => return Ok(ChartSelection::Exhausted),
            Reservation::Proceed => {}
        }

        // Lock released: the render happens outside the critical section
        match self.chart_backend.render(kind, &self.stats).await {
            Ok(artifact) => {
                let mut charts = self.charts.lock();
                charts.commit(kind);
                debug!(
                    "Chart '{}' rendered for {} ({}/{} consumed)",
                    kind.value(),
                    self.stats.short_code,
                    charts.consumed.len(),
                    charts.size
                );
                Ok(ChartSelection::Rendered(artifact))
            }
            Err(e) => {
                self.charts.lock().rollback(kind);
                Err(e)
            }
        }
    }

    /// Produce one export format, with the same once-per-session rules as
    /// chart options
    pub async fn select_export(&self, format: ExportFormat) -> Result<ExportSelection> {
        match self.exports.lock().try_reserve(format) {
            Reservation::AlreadyUsed => return Ok(ExportSelection::AlreadyUsed),
            Reservation::Exhausted => return Ok(ExportSelection::Exhausted),
            Reservation::Proceed => {}
        }

        match self.export_backend.export(&self.stats, format).await {
            Ok(file) => {
                let mut exports = self.exports.lock();
                exports.commit(format);
                debug!(
                    "Export '{}' produced for {} ({}/{} consumed)",
                    format.value(),
                    self.stats.short_code,
                    exports.consumed.len(),
                    exports.size
                );
                Ok(ExportSelection::Exported(file))
            }
            Err(e) => {
                self.exports.lock().rollback(format);
                Err(e)
            }
        }
    }
}
