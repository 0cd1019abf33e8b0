//! Error types and utilities for SpooBot

use thiserror::Error;

/// Result type alias for SpooBot operations
pub type Result<T> = std::result::Result<T, SpooBotError>;

/// Main error type for SpooBot operations
#[derive(Error, Debug)]
pub enum SpooBotError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network related errors (HTTP requests, etc.)
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Discord API related errors
    #[error("Discord API error: {message}")]
    Discord {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// spoo.me API related errors
    #[error("spoo.me API error: {message}")]
    Spoo {
        message: String,
        status_code: Option<u16>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Chart rendering and heatmap errors
    #[error("Chart error: {message}")]
    Chart {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Statistics export errors
    #[error("Export error: {message}")]
    Export {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors for user input or data
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// Generic error with custom message
    #[error("{message}")]
    Generic {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl SpooBotError {
    /// Create a new generic error with a custom message
    pub fn new(msg: impl Into<String>) -> Self {
        Self::Generic {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new generic error with a custom message and source
    pub fn with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Generic {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new network error with source
    pub fn network_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Network {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new Discord API error
    pub fn discord(msg: impl Into<String>) -> Self {
        Self::Discord {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new spoo.me API error
    pub fn spoo(msg: impl Into<String>) -> Self {
        Self::Spoo {
            message: msg.into(),
            status_code: None,
            source: None,
        }
    }

    /// Create a new spoo.me API error with HTTP status code
    pub fn spoo_with_status(msg: impl Into<String>, status: u16) -> Self {
        Self::Spoo {
            message: msg.into(),
            status_code: Some(status),
            source: None,
        }
    }

    /// Create a new chart error
    pub fn chart(msg: impl Into<String>) -> Self {
        Self::Chart {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new chart error with source
    pub fn chart_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Chart {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new export error
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new export error with source
    pub fn export_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Export {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: None,
        }
    }

    /// Create a new validation error with field name
    pub fn validation_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }
}

// Error conversion implementations for external types

/// Convert from reqwest::Error to SpooBotError
impl From<reqwest::Error> for SpooBotError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network_with_source("Request timeout", err)
        } else if err.is_connect() {
            Self::network_with_source("Connection failed", err)
        } else if err.is_status() {
            let status_code = err.status().map(|s| s.as_u16()).unwrap_or(0);
            Self::network_with_source(format!("HTTP error: {}", status_code), err)
        } else {
            Self::network_with_source("Network request failed", err)
        }
    }
}

/// Convert from toml::de::Error to SpooBotError
impl From<toml::de::Error> for SpooBotError {
    fn from(err: toml::de::Error) -> Self {
        Self::config_with_source("TOML parsing error", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{error::Error, io};

    #[test]
    fn test_error_creation() {
        let error = SpooBotError::new("test message");
        assert!(error.to_string().contains("test message"));

        let config_error = SpooBotError::config("config issue");
        assert!(config_error.to_string().contains("Configuration error"));
        assert!(config_error.to_string().contains("config issue"));

        let spoo_error = SpooBotError::spoo_with_status("Server error", 500);
        assert!(spoo_error.to_string().contains("spoo.me API error"));
        assert!(spoo_error.to_string().contains("Server error"));

        let validation_error = SpooBotError::validation_field("Invalid input", "alias");
        assert!(validation_error.to_string().contains("Validation error"));
        assert!(validation_error.to_string().contains("Invalid input"));
    }

    #[test]
    fn test_error_with_source() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let wrapped_error = SpooBotError::with_source("Failed to read file", io_error);

        assert!(wrapped_error.to_string().contains("Failed to read file"));
        assert!(wrapped_error.source().is_some());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let bot_error: SpooBotError = io_error.into();

        assert!(bot_error.to_string().contains("I/O error"));
        assert!(bot_error.source().is_some());
    }

    #[test]
    fn test_error_display_formatting() {
        let error = SpooBotError::new("test error");
        assert_eq!(format!("{}", error), "test error");

        let config_error = SpooBotError::config("missing field");
        assert_eq!(
            format!("{}", config_error),
            "Configuration error: missing field"
        );
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<String> {
            Ok("success".to_string())
        }

        fn returns_error() -> Result<String> {
            Err(SpooBotError::new("failure"))
        }

        assert!(returns_result().is_ok());
        assert!(returns_error().is_err());
    }
}
