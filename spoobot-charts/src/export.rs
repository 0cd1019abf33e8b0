//! Statistics export to JSON, CSV and XLSX files

use crate::types::{ExportFormat, ExportedFile};
use rust_xlsxwriter::Workbook;
use spoobot_common::{Result, SpooBotError, UrlStatistics};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Exports a statistics record to a downloadable file
#[derive(Debug, Clone, Default)]
pub struct StatsExporter;

impl StatsExporter {
    pub fn new() -> Self {
        Self
    }

    /// Export the statistics in the requested format. The file lands in the
    /// system temp directory; `file_name` is the name to attach it under.
    #[instrument(skip(self, stats), fields(short_code = %stats.short_code, format = format.extension()))]
    pub fn export(&self, stats: &UrlStatistics, format: ExportFormat) -> Result<ExportedFile> {
        let path = self.temp_path(format)?;

        match format {
            ExportFormat::Json => self.write_json(stats, &path)?,
            ExportFormat::Csv => self.write_csv(stats, &path)?,
            ExportFormat::Xlsx => self.write_xlsx(stats, &path)?,
        }

        let size_bytes = std::fs::metadata(&path)
            .map_err(|e| SpooBotError::export_with_source("Failed to stat exported file", e))?
            .len();

        let file_name = format!("{}_export.{}", stats.short_code, format.extension());
        info!("Exported {} ({} bytes)", file_name, size_bytes);

        Ok(ExportedFile {
            path,
            file_name,
            size_bytes,
        })
    }

    fn temp_path(&self, format: ExportFormat) -> Result<PathBuf> {
        let file = tempfile::Builder::new()
            .prefix("spoobot-export-")
            .suffix(&format!(".{}", format.extension()))
            .tempfile()
            .map_err(|e| SpooBotError::export_with_source("Failed to create export file", e))?;
        file.into_temp_path()
            .keep()
            .map_err(|e| SpooBotError::export_with_source("Failed to keep export file", e))
    }

    fn write_json(&self, stats: &UrlStatistics, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(stats)?;
        std::fs::write(path, json)
            .map_err(|e| SpooBotError::export_with_source("Failed to write JSON export", e))
    }

    fn write_csv(&self, stats: &UrlStatistics, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .map_err(|e| SpooBotError::export_with_source("Failed to open CSV export", e))?;

        let write_err =
            |e: csv::Error| SpooBotError::export_with_source("Failed to write CSV export", e);

        writer
            .write_record(["section", "key", "value"])
            .map_err(write_err)?;

        for (key, value) in Self::summary_rows(stats) {
            writer
                .write_record(["summary", &key, &value])
                .map_err(write_err)?;
        }

        for (section, map) in Self::breakdown_sections(stats) {
            for (key, count) in Self::sorted(map) {
                writer
                    .write_record([section, key, &count.to_string()])
                    .map_err(write_err)?;
            }
        }

        writer.flush().map_err(|e| {
            SpooBotError::export_with_source("Failed to flush CSV export", e)
        })?;
        Ok(())
    }

    fn write_xlsx(&self, stats: &UrlStatistics, path: &Path) -> Result<()> {
        let xlsx_err = |e: rust_xlsxwriter::XlsxError| {
            SpooBotError::export_with_source("Failed to write XLSX export", e)
        };

        let mut workbook = Workbook::new();

        let summary = workbook.add_worksheet();
        summary.set_name("Summary").map_err(xlsx_err)?;
        summary.write_string(0, 0, "Field").map_err(xlsx_err)?;
        summary.write_string(0, 1, "Value").map_err(xlsx_err)?;
        for (row, (key, value)) in Self::summary_rows(stats).into_iter().enumerate() {
            let row = (row + 1) as u32;
            summary.write_string(row, 0, &key).map_err(xlsx_err)?;
            summary.write_string(row, 1, &value).map_err(xlsx_err)?;
        }

        for (section, map) in Self::breakdown_sections(stats) {
            let sheet = workbook.add_worksheet();
            sheet.set_name(section).map_err(xlsx_err)?;
            sheet.write_string(0, 0, "Key").map_err(xlsx_err)?;
            sheet.write_string(0, 1, "Count").map_err(xlsx_err)?;
            for (row, (key, count)) in Self::sorted(map).into_iter().enumerate() {
                let row = (row + 1) as u32;
                sheet.write_string(row, 0, key).map_err(xlsx_err)?;
                sheet
                    .write_number(row, 1, count as f64)
                    .map_err(xlsx_err)?;
            }
        }

        workbook.save(path).map_err(xlsx_err)?;
        Ok(())
    }

    fn summary_rows(stats: &UrlStatistics) -> Vec<(String, String)> {
        vec![
            ("short_code".to_string(), stats.short_code.clone()),
            ("long_url".to_string(), stats.long_url.clone()),
            ("total_clicks".to_string(), stats.total_clicks.to_string()),
            (
                "total_unique_clicks".to_string(),
                stats.total_unique_clicks.to_string(),
            ),
            ("created_at".to_string(), stats.created_at.clone()),
            (
                "last_click".to_string(),
                stats.last_click_time.clone().unwrap_or_default(),
            ),
            (
                "average_daily_clicks".to_string(),
                stats.average_daily_clicks().to_string(),
            ),
        ]
    }

    fn breakdown_sections(stats: &UrlStatistics) -> Vec<(&'static str, &HashMap<String, u64>)> {
        vec![
            ("Platforms", &stats.platforms),
            ("Unique Platforms", &stats.unique_platforms),
            ("Browsers", &stats.browsers),
            ("Unique Browsers", &stats.unique_browsers),
            ("Referrers", &stats.referrers),
            ("Unique Referrers", &stats.unique_referrers),
            ("Countries", &stats.countries),
            ("Unique Countries", &stats.unique_countries),
            ("Daily Clicks", &stats.daily_clicks),
            ("Daily Unique Clicks", &stats.daily_unique_clicks),
        ]
    }

    fn sorted(map: &HashMap<String, u64>) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> = map
            .iter()
            .map(|(key, count)| (key.as_str(), *count))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
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
            "counter": {"2024-02-10": 12},
            "unique_counter": {"2024-02-10": 10}
        }"#;
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_json_export() {
        let exported = StatsExporter::new()
            .export(&sample_stats(), ExportFormat::Json)
            .unwrap();

        assert_eq!(exported.file_name, "ga_export.json");
        let content = std::fs::read_to_string(&exported.path).unwrap();
        assert!(content.contains("https://example.com"));
        assert_eq!(exported.size_bytes, content.len() as u64);

        std::fs::remove_file(&exported.path).ok();
    }

    #[test]
    fn test_csv_export() {
        let exported = StatsExporter::new()
            .export(&sample_stats(), ExportFormat::Csv)
            .unwrap();

        assert_eq!(exported.file_name, "ga_export.csv");
        let content = std::fs::read_to_string(&exported.path).unwrap();
        assert!(content.starts_with("section,key,value"));
        assert!(content.contains("summary,short_code,ga"));
        assert!(content.contains("Countries,India,30"));

        std::fs::remove_file(&exported.path).ok();
    }

    #[test]
    fn test_xlsx_export() {
        let exported = StatsExporter::new()
            .export(&sample_stats(), ExportFormat::Xlsx)
            .unwrap();

        assert_eq!(exported.file_name, "ga_export.xlsx");
        // XLSX files are zip archives; just confirm something real landed
        assert!(exported.size_bytes > 0);
        let on_disk = std::fs::metadata(&exported.path).unwrap().len();
        assert_eq!(exported.size_bytes, on_disk);

        std::fs::remove_file(&exported.path).ok();
    }
}
