//! Structured logging infrastructure for SpooBot

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace")
    pub level: String,
    /// Whether to enable pretty formatting with colors
    pub pretty_format: bool,
    /// Optional file path for log output
    pub file_path: Option<String>,
    /// Whether to include spans in the output
    pub include_spans: bool,
    /// Whether to include target module information
    pub include_targets: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            pretty_format: true,
            file_path: None,
            include_spans: false,
            include_targets: true,
        }
    }
}

/// Initialize the tracing subscriber with the given configuration
pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_new(&config.level)
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();

    let span_events = if config.include_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.pretty_format {
        let layer = fmt::layer()
            .pretty()
            .with_span_events(span_events)
            .with_target(config.include_targets);

        if let Some(file_path) = config.file_path {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file_path)?;
            registry
                .with(layer.with_ansi(false).with_writer(file))
                .init();
        } else {
            registry.with(layer).init();
        }
    } else {
        let layer = fmt::layer()
            .compact()
            .with_span_events(span_events)
            .with_target(config.include_targets);

        if let Some(file_path) = config.file_path {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file_path)?;
            registry.with(layer.with_writer(file)).init();
        } else {
            registry.with(layer).init();
        }
    }

    Ok(())
}

/// Initialize logging with default configuration
pub fn init_default_logging() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_logging(LoggingConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(config.pretty_format);
        assert!(config.file_path.is_none());
        assert!(!config.include_spans);
        assert!(config.include_targets);
    }
}
