//! Common utilities and types for SpooBot

pub mod error;
pub mod logging;
pub mod spoo;
pub mod statistics;

// Re-export commonly used types
pub use error::{Result, SpooBotError};
pub use logging::{init_default_logging, init_logging, LoggingConfig};
pub use spoo::{
    EmojifyRequest, ServiceMetrics, ShortUrl, ShortenRequest, SpooClient, SpooClientConfig,
};
pub use statistics::{ClickSeries, LastClick, UrlStatistics};
