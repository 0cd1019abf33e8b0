//! Configuration loading utilities
//!
//! Loads the TOML configuration file, substitutes `${ENV_VAR}` placeholders
//! and validates the result. Any failure here aborts startup.

use crate::Config;
use once_cell::sync::Lazy;
use regex::Regex;
use spoobot_common::Result as SpooBotResult;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Pattern for `${ENV_VAR}` placeholders in the raw TOML text
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("Invalid env var pattern"));

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error
    #[error("Failed to parse TOML configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    /// Referenced environment variable is not set
    #[error("Required environment variable '{0}' is not set")]
    MissingEnvVar(String),

    /// Missing configuration file
    #[error("Configuration file not found: {0}")]
    MissingConfig(String),
}

impl From<ConfigError> for spoobot_common::SpooBotError {
    fn from(err: ConfigError) -> Self {
        spoobot_common::SpooBotError::config(err.to_string())
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file with `${ENV_VAR}` substitution
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let substituted = Self::substitute_env_vars(&content)?;
        let config: Config = toml::from_str(&substituted)?;

        config.validate_all()?;

        info!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Load configuration from the conventional locations
    pub fn load() -> SpooBotResult<Config> {
        let config = if let Ok(config_path) = env::var("SPOOBOT_CONFIG_PATH") {
            Self::load_config(&config_path)?
        } else if Path::new("config.toml").exists() {
            Self::load_config("config.toml")?
        } else if Path::new("config.template.toml").exists() {
            return Err(ConfigError::MissingConfig(
                "config.toml not found. Copy config.template.toml to config.toml \
                 and fill in the required values"
                    .to_string(),
            )
            .into());
        } else {
            return Err(ConfigError::MissingConfig(
                "Neither config.toml nor config.template.toml found".to_string(),
            )
            .into());
        };

        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> SpooBotResult<Config> {
        Ok(Self::load_config(path)?)
    }

    /// Replace every `${ENV_VAR}` placeholder with the variable's value
    fn substitute_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut missing: Option<String> = None;
        let substituted = ENV_VAR_PATTERN.replace_all(content, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            match env::var(name) {
                Ok(value) => value,
                Err(_) => {
                    if missing.is_none() {
                        missing = Some(name.to_string());
                    }
                    String::new()
                }
            }
        });

        match missing {
            Some(name) => Err(ConfigError::MissingEnvVar(name)),
            None => Ok(substituted.into_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file
    }

    fn minimal_config_toml(token_line: &str) -> String {
        let default = Config::default();
        let mut toml = toml::to_string(&default).unwrap();
        // Swap the placeholder token for the one under test
        toml = toml.replace(
            "token = \"bot-id.timestamp.signature\"",
            &format!("token = {}", token_line),
        );
        toml
    }

    #[test]
    fn test_load_valid_toml_config() {
        let content = minimal_config_toml("\"abc.def.ghi\"");
        let file = write_config_file(&content);

        let config = ConfigLoader::load_config(file.path()).expect("Failed to load config");
        assert_eq!(config.bot.token, "abc.def.ghi");
        assert_eq!(config.cooldowns.short_term.count, 1);
    }

    #[test]
    fn test_env_var_substitution() {
        env::set_var("SPOOBOT_TEST_TOKEN", "env.sourced.token");
        let content = minimal_config_toml("\"${SPOOBOT_TEST_TOKEN}\"");
        let file = write_config_file(&content);

        let config = ConfigLoader::load_config(file.path()).expect("Failed to load config");
        assert_eq!(config.bot.token, "env.sourced.token");

        env::remove_var("SPOOBOT_TEST_TOKEN");
    }

    #[test]
    fn test_missing_env_var_is_an_error() {
        env::remove_var("SPOOBOT_DEFINITELY_UNSET");
        let content = minimal_config_toml("\"${SPOOBOT_DEFINITELY_UNSET}\"");
        let file = write_config_file(&content);

        let result = ConfigLoader::load_config(file.path());
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(name)) if name == "SPOOBOT_DEFINITELY_UNSET"));
    }

    #[test]
    fn test_invalid_toml() {
        let file = write_config_file("[bot\ntoken = \"unclosed");
        let result = ConfigLoader::load_config(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_validation_failure() {
        let content =
            minimal_config_toml("\"abc.def.ghi\"").replace("count = 1", "count = 0");
        let file = write_config_file(&content);

        let result = ConfigLoader::load_config(file.path());
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_missing_config_file() {
        let result = ConfigLoader::load_config("/nonexistent/path/config.toml");
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }
}
