//! Application configuration structures

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Config {
    /// Discord bot identity configuration
    pub bot: BotConfig,

    /// Discord server/channel wiring
    pub discord: DiscordConfig,

    /// spoo.me service client configuration
    pub spoo: SpooServiceConfig,

    /// External URLs used in embeds and buttons
    pub urls: UrlsConfig,

    /// Embed colors, gifs and message templates
    pub ui: UiConfig,

    /// Chart rendering configuration
    pub charts: ChartsConfig,

    /// Command cooldown windows
    pub cooldowns: CooldownsConfig,

    /// Background task configuration
    pub server: ServerConfig,

    /// Logging configuration
    pub logging: LoggingSettings,
}

impl Config {
    /// Validate the whole configuration tree. Any failure here is fatal at
    /// startup; nothing is re-checked at command time.
    pub fn validate_all(&self) -> Result<(), validator::ValidationErrors> {
        self.bot.validate()?;
        self.discord.validate()?;
        self.spoo.validate()?;
        self.urls.validate()?;
        self.ui.validate()?;
        self.charts.validate()?;
        self.cooldowns.validate()?;
        self.server.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Discord bot identity configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BotConfig {
    /// Discord bot token
    #[validate(length(min = 1, message = "Discord token cannot be empty"))]
    #[validate(custom(
        function = "crate::validation::validate_discord_token",
        message = "Invalid Discord token format"
    ))]
    pub token: String,

    /// Custom status line shown under the bot's name
    #[validate(length(max = 128, message = "Custom status cannot exceed 128 characters"))]
    pub custom_status: String,

    /// Prefix for legacy text commands
    #[validate(length(min = 1, max = 5, message = "Command prefix must be 1-5 characters"))]
    pub command_prefix: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: "bot-id.timestamp.signature".to_string(),
            custom_status: "Shortening URLs at spoo.me".to_string(),
            command_prefix: "$".to_string(),
        }
    }
}

/// Discord server and channel wiring
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DiscordConfig {
    /// The support server guild id
    #[validate(regex(
        path = "crate::validation::DISCORD_ID_REGEX",
        message = "Guild id must be a Discord snowflake"
    ))]
    pub parent_guild_id: String,

    /// Channel renamed with the service's total click count
    #[validate(regex(
        path = "crate::validation::DISCORD_ID_REGEX",
        message = "Channel id must be a Discord snowflake"
    ))]
    pub stats_clicks_channel_id: String,

    /// Channel renamed with the service's total short link count
    #[validate(regex(
        path = "crate::validation::DISCORD_ID_REGEX",
        message = "Channel id must be a Discord snowflake"
    ))]
    pub stats_shortlinks_channel_id: String,

    /// Channel for member-join welcome embeds
    #[validate(regex(
        path = "crate::validation::DISCORD_ID_REGEX",
        message = "Channel id must be a Discord snowflake"
    ))]
    pub welcome_channel_id: String,

    /// Request timeout in seconds for Discord API calls
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub request_timeout_seconds: u64,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            parent_guild_id: "12345678901234567".to_string(),
            stats_clicks_channel_id: "12345678901234567".to_string(),
            stats_shortlinks_channel_id: "12345678901234567".to_string(),
            welcome_channel_id: "12345678901234567".to_string(),
            request_timeout_seconds: 30,
        }
    }
}

/// spoo.me service client configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SpooServiceConfig {
    /// Service base URL
    #[validate(custom(
        function = "crate::validation::validate_https_url",
        message = "Service URL must use HTTPS"
    ))]
    pub base_url: String,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_seconds: u64,

    /// Maximum number of retries for failed requests
    #[validate(range(max = 10, message = "Max retries cannot exceed 10"))]
    pub max_retries: u32,

    /// Client-side request limit per second
    #[validate(range(min = 1, max = 50, message = "Rate limit must be between 1 and 50 per second"))]
    pub rate_limit_per_sec: u32,
}

impl Default for SpooServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://spoo.me".to_string(),
            timeout_seconds: 30,
            max_retries: 3,
            rate_limit_per_sec: 5,
        }
    }
}

/// External URLs used in embeds and link buttons
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UrlsConfig {
    #[validate(custom(function = "crate::validation::validate_https_url"))]
    pub website: String,

    #[validate(custom(function = "crate::validation::validate_https_url"))]
    pub github: String,

    #[validate(custom(function = "crate::validation::validate_https_url"))]
    pub bot_invite: String,

    #[validate(custom(function = "crate::validation::validate_https_url"))]
    pub support_invite: String,

    /// QR code endpoint used for short URL thumbnails
    #[validate(custom(function = "crate::validation::validate_https_url"))]
    pub qr_endpoint: String,
}

impl Default for UrlsConfig {
    fn default() -> Self {
        Self {
            website: "https://spoo.me".to_string(),
            github: "https://github.com/spoo-me/spoobot-rs".to_string(),
            bot_invite: "https://discord.com/oauth2/authorize?client_id=0".to_string(),
            support_invite: "https://discord.gg/spoo-me".to_string(),
            qr_endpoint: "https://qr.spoo.me/gradient".to_string(),
        }
    }
}

/// Embed colors in `0xRRGGBB` form
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UiColors {
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX"))]
    pub primary: String,
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX"))]
    pub success: String,
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX"))]
    pub error: String,
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX"))]
    pub warning: String,
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX"))]
    pub info: String,
}

impl UiColors {
    /// Parse one of the configured colors into the numeric form serenity
    /// embeds take
    pub fn parse(color: &str) -> u32 {
        u32::from_str_radix(color.trim_start_matches("0x"), 16).unwrap_or(0x5865F2)
    }
}

impl Default for UiColors {
    fn default() -> Self {
        Self {
            primary: "0x5865F2".to_string(),
            success: "0x57F287".to_string(),
            error: "0xED4245".to_string(),
            warning: "0xFEE75C".to_string(),
            info: "0xEB459E".to_string(),
        }
    }
}

/// User-facing message templates
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UiMessages {
    /// Reply when the bot is mentioned; `{help}` is replaced with the help
    /// command mention
    #[validate(length(min = 1))]
    pub bot_mention: String,

    /// Welcome message; `{mention}` is replaced with the new member
    #[validate(length(min = 1))]
    pub welcome: String,
}

impl Default for UiMessages {
    fn default() -> Self {
        Self {
            bot_mention: "Hi! I shorten URLs. Use {help} to see what I can do.".to_string(),
            welcome: "Welcome to the spoo.me support server, {mention}!".to_string(),
        }
    }
}

/// Embed colors, gifs and message templates
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UiConfig {
    #[validate]
    pub colors: UiColors,

    /// Gifs shown on the cooldown embed
    #[validate(length(min = 1, message = "At least one waiting gif is required"))]
    pub waiting_gifs: Vec<String>,

    /// Gifs shown on the welcome embed
    #[validate(length(min = 1, message = "At least one welcome gif is required"))]
    pub welcome_gifs: Vec<String>,

    #[validate]
    pub messages: UiMessages,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            colors: UiColors::default(),
            waiting_gifs: vec!["https://media.giphy.com/media/waiting/giphy.gif".to_string()],
            welcome_gifs: vec!["https://media.giphy.com/media/welcome/giphy.gif".to_string()],
            messages: UiMessages::default(),
        }
    }
}

/// A fill/border color pair for one chart dataset
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChartColorPair {
    #[validate(regex(path = "crate::validation::RGBA_COLOR_REGEX"))]
    pub fill: String,
    #[validate(regex(path = "crate::validation::RGBA_COLOR_REGEX"))]
    pub border: String,
}

/// Chart styling configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChartStyleConfig {
    #[validate(regex(path = "crate::validation::RGBA_COLOR_REGEX"))]
    pub background: String,

    #[validate(regex(path = "crate::validation::RGBA_COLOR_REGEX"))]
    pub grid_color: String,

    #[validate(regex(path = "crate::validation::RGBA_COLOR_REGEX"))]
    pub text_color: String,

    #[validate(range(min = 8, max = 72, message = "Font size must be between 8 and 72"))]
    pub font_size: u32,

    #[validate(range(max = 10, message = "Border width cannot exceed 10 pixels"))]
    pub border_width: u32,

    #[validate(range(max = 50, message = "Border radius cannot exceed 50 pixels"))]
    pub border_radius: u32,

    #[validate(range(min = 0.0, max = 1.0, message = "Line tension must be between 0 and 1"))]
    pub line_tension: f64,
}

impl Default for ChartStyleConfig {
    fn default() -> Self {
        Self {
            background: "rgb(32, 34, 37)".to_string(),
            grid_color: "rgb(46, 48, 53)".to_string(),
            text_color: "rgb(255, 255, 255)".to_string(),
            font_size: 20,
            border_width: 2,
            border_radius: 10,
            line_tension: 0.5,
        }
    }
}

/// Heatmap rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HeatmapConfig {
    #[validate(range(min = 400, max = 4000, message = "Width must be between 400 and 4000 pixels"))]
    pub width: u32,

    #[validate(range(min = 300, max = 4000, message = "Height must be between 300 and 4000 pixels"))]
    pub height: u32,

    /// Maximum number of countries shown before the tail is collapsed
    #[validate(range(min = 5, max = 50, message = "Max countries must be between 5 and 50"))]
    pub max_countries: u32,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            width: 1500,
            height: 1000,
            max_countries: 25,
        }
    }
}

/// Per-chart dataset colors
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChartColorsConfig {
    #[validate]
    pub platform: Vec<ChartColorPair>,
    #[validate]
    pub browser: Vec<ChartColorPair>,
    #[validate]
    pub referrer: Vec<ChartColorPair>,
    #[validate]
    pub timeline: Vec<ChartColorPair>,
}

impl Default for ChartColorsConfig {
    fn default() -> Self {
        let pair = |fill: &str, border: &str| ChartColorPair {
            fill: fill.to_string(),
            border: border.to_string(),
        };
        Self {
            platform: vec![
                pair("rgba(0, 0, 255, 0.15)", "rgb(0, 0, 255)"),
                pair("rgba(255, 69, 0, 0.15)", "rgb(255, 69, 0)"),
            ],
            browser: vec![
                pair("rgba(153, 102, 255, 0.15)", "rgb(153, 102, 255)"),
                pair("rgba(255, 159, 64, 0.15)", "rgb(255, 159, 64)"),
            ],
            referrer: vec![
                pair("rgba(255, 105, 180, 0.15)", "rgb(255, 105, 180)"),
                pair("rgba(60, 179, 113, 0.15)", "rgb(60, 179, 113)"),
            ],
            timeline: vec![
                pair("rgba(75, 192, 192, 0.15)", "rgb(75, 192, 192)"),
                pair("rgba(85, 52, 235, 0.25)", "rgb(85, 52, 235)"),
            ],
        }
    }
}

/// Chart rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChartsConfig {
    /// Chart-creation endpoint of the rendering service
    #[validate(custom(function = "crate::validation::validate_https_url"))]
    pub render_endpoint: String,

    #[validate]
    pub style: ChartStyleConfig,

    #[validate]
    pub heatmap: HeatmapConfig,

    #[validate]
    pub colors: ChartColorsConfig,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            render_endpoint: "https://quickchart.io/chart/create".to_string(),
            style: ChartStyleConfig::default(),
            heatmap: HeatmapConfig::default(),
            colors: ChartColorsConfig::default(),
        }
    }
}

/// One cooldown window rule
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
pub struct CooldownRule {
    /// Number of uses admitted inside the window
    #[validate(range(min = 1, message = "Cooldown count must be greater than 0"))]
    pub count: u32,

    /// Window length in seconds
    #[validate(range(
        min = 1,
        max = 604800,
        message = "Cooldown duration must be between 1 second and 7 days"
    ))]
    pub seconds: u64,
}

/// Cooldown windows applied to the rate-limited commands. All three windows
/// must admit a call for it to run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
pub struct CooldownsConfig {
    #[validate]
    pub short_term: CooldownRule,
    #[validate]
    pub medium_term: CooldownRule,
    #[validate]
    pub long_term: CooldownRule,
}

impl CooldownsConfig {
    /// The windows in ascending period order
    pub fn rules(&self) -> [CooldownRule; 3] {
        [self.short_term, self.medium_term, self.long_term]
    }
}

impl Default for CooldownsConfig {
    fn default() -> Self {
        Self {
            short_term: CooldownRule {
                count: 1,
                seconds: 10,
            },
            medium_term: CooldownRule {
                count: 5,
                seconds: 60,
            },
            long_term: CooldownRule {
                count: 200,
                seconds: 86400,
            },
        }
    }
}

/// Background task configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    /// Minutes between service-stats channel updates
    #[validate(range(
        min = 1,
        max = 1440,
        message = "Update interval must be between 1 minute and 1 day"
    ))]
    pub stats_update_minutes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            stats_update_minutes: 10,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoggingSettings {
    /// Log level filter
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub level: String,

    /// Optional log file path
    pub file: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig::default(),
            discord: DiscordConfig::default(),
            spoo: SpooServiceConfig::default(),
            urls: UrlsConfig::default(),
            ui: UiConfig::default(),
            charts: ChartsConfig::default(),
            cooldowns: CooldownsConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate_all().is_ok());
    }

    #[test]
    fn test_zero_cooldown_count_is_rejected() {
        let mut config = Config::default();
        config.cooldowns.short_term.count = 0;
        assert!(config.validate_all().is_err());
    }

    #[test]
    fn test_zero_cooldown_period_is_rejected() {
        let mut config = Config::default();
        config.cooldowns.medium_term.seconds = 0;
        assert!(config.validate_all().is_err());
    }

    #[test]
    fn test_overlong_cooldown_period_is_rejected() {
        let mut config = Config::default();
        config.cooldowns.long_term.seconds = 604801;
        assert!(config.validate_all().is_err());
    }

    #[test]
    fn test_invalid_embed_color_is_rejected() {
        let mut config = Config::default();
        config.ui.colors.primary = "#5865F2".to_string();
        assert!(config.validate_all().is_err());
    }

    #[test]
    fn test_http_service_url_is_rejected() {
        let mut config = Config::default();
        config.spoo.base_url = "http://spoo.me".to_string();
        assert!(config.validate_all().is_err());
    }

    #[test]
    fn test_color_parse() {
        assert_eq!(UiColors::parse("0x5865F2"), 0x5865F2);
        assert_eq!(UiColors::parse("garbage"), 0x5865F2); // falls back to blurple
    }

    #[test]
    fn test_cooldown_rules_order() {
        let cooldowns = CooldownsConfig::default();
        let rules = cooldowns.rules();
        assert_eq!(rules[0].seconds, 10);
        assert_eq!(rules[1].seconds, 60);
        assert_eq!(rules[2].seconds, 86400);
    }
}
