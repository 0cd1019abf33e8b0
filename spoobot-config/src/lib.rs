//! Configuration management for SpooBot

pub mod loader;
pub mod settings;
pub mod validation;

pub use loader::{ConfigError, ConfigLoader};
pub use settings::{
    BotConfig, ChartColorPair, ChartColorsConfig, ChartStyleConfig, ChartsConfig, Config,
    CooldownRule, CooldownsConfig, DiscordConfig, HeatmapConfig, LoggingSettings, ServerConfig,
    SpooServiceConfig, UiColors, UiConfig, UiMessages, UrlsConfig,
};
