//! End-to-end tests for the cooldown limiter and report session

use async_trait::async_trait;
use spoobot_charts::{
    ChartArtifact, ChartBackend, ChartKind, ExportBackend, ExportFormat, ExportedFile,
};
use spoobot_commands::{
    ChartSelection, CooldownManager, ExportSelection, RateWindow, ReportSession,
};
use spoobot_common::{Result, UrlStatistics};
use spoobot_config::CooldownsConfig;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn sample_stats() -> UrlStatistics {
    let json = r#"{
        "_id": "exa",
        "url": "https://example.com",
        "total-clicks": 10,
        "total_unique_clicks": 8,
        "creation-date": "2024-02-09",
        "os_name": {"Linux": 10},
        "unique_os_name": {"Linux": 8},
        "browser": {"Firefox": 10},
        "unique_browser": {"Firefox": 8},
        "referrer": {"direct": 10},
        "unique_referrer": {"direct": 8},
        "country": {"Germany": 10},
        "unique_country": {"Germany": 8},
        "counter": {},
        "unique_counter": {}
    }"#;
    serde_json::from_str(json).unwrap()
}

#[derive(Default)]
struct FakeBackend {
    chart_calls: AtomicUsize,
    export_calls: AtomicUsize,
}

#[async_trait]
impl ChartBackend for FakeBackend {
    async fn render(&self, kind: ChartKind, _stats: &UrlStatistics) -> Result<ChartArtifact> {
        self.chart_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ChartArtifact::Url(format!("https://img/{}", kind.value())))
    }
}

#[async_trait]
impl ExportBackend for FakeBackend {
    async fn export(&self, stats: &UrlStatistics, format: ExportFormat) -> Result<ExportedFile> {
        self.export_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ExportedFile {
            path: PathBuf::from("/tmp/fake"),
            file_name: format!("{}_export.{}", stats.short_code, format.extension()),
            size_bytes: 64,
        })
    }
}

#[test]
fn cooldown_windows_from_default_config_enforce_the_documented_scenario() {
    let windows = RateWindow::from_config(&CooldownsConfig::default()).unwrap();
    let manager = CooldownManager::new();
    let base = Instant::now();

    assert!(manager
        .check_and_record_at("shorten", 42, &windows, base)
        .is_admitted());

    let rejected =
        manager.check_and_record_at("shorten", 42, &windows, base + Duration::from_secs(5));
    assert_eq!(rejected.retry_after(), Some(Duration::from_secs(5)));

    assert!(manager
        .check_and_record_at("shorten", 42, &windows, base + Duration::from_secs(11))
        .is_admitted());
}

#[tokio::test]
async fn full_report_session_lifecycle() {
    let backend = Arc::new(FakeBackend::default());
    let session = ReportSession::new(sample_stats(), backend.clone(), backend.clone());

    // Walk every chart option once, with a duplicate attempt in the middle
    for kind in ChartKind::ALL {
        let outcome = session.select_chart(kind).await.unwrap();
        assert!(matches!(outcome, ChartSelection::Rendered(_)));
    }
    assert!(matches!(
        session.select_chart(ChartKind::BrowserAnalysis).await.unwrap(),
        ChartSelection::Exhausted
    ));
    assert!(session.chart_menu_disabled());
    assert_eq!(backend.chart_calls.load(Ordering::SeqCst), 6);

    // The export group is unaffected and runs its own lifecycle
    assert!(!session.export_menu_disabled());
    for format in ExportFormat::ALL {
        let outcome = session.select_export(format).await.unwrap();
        assert!(matches!(outcome, ExportSelection::Exported(_)));
    }
    assert!(matches!(
        session.select_export(ExportFormat::Json).await.unwrap(),
        ExportSelection::Exhausted
    ));
    assert_eq!(backend.export_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn duplicate_selection_does_not_rerender() {
    let backend = Arc::new(FakeBackend::default());
    let session = ReportSession::new(sample_stats(), backend.clone(), backend.clone());

    session.select_chart(ChartKind::ClicksOverTime).await.unwrap();
    let duplicate = session.select_chart(ChartKind::ClicksOverTime).await.unwrap();

    assert!(matches!(duplicate, ChartSelection::AlreadyUsed));
    assert_eq!(backend.chart_calls.load(Ordering::SeqCst), 1);
}
