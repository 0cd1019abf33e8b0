//! Validation utilities and regex patterns

use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

/// Regex pattern for validating hex color codes in the `0xRRGGBB` form the
/// embeds use
pub static HEX_COLOR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[0-9A-Fa-f]{6}$").expect("Invalid hex color regex pattern"));

/// Regex pattern for `rgb(...)` / `rgba(...)` color strings used in chart
/// payloads
pub static RGBA_COLOR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^rgba?\((\d{1,3},\s*){2}\d{1,3}(,\s*(0|1|0?\.\d+))?\)$")
        .expect("Invalid rgba color regex pattern")
});

/// Regex pattern for Discord snowflake IDs (17-19 digits)
pub static DISCORD_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{17,19}$").expect("Invalid Discord ID regex pattern"));

/// Validate a Discord bot token (basic dot-separated structure check)
pub fn validate_discord_token(token: &str) -> Result<(), ValidationError> {
    if token.is_empty() {
        return Err(ValidationError::new("empty_discord_token"));
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() == 3 && parts.iter().all(|part| !part.is_empty()) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_discord_token_format"))
    }
}

/// Validate that a URL uses HTTPS
pub fn validate_https_url(url: &str) -> Result<(), ValidationError> {
    if url.starts_with("https://") {
        Ok(())
    } else {
        Err(ValidationError::new("url_must_use_https"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color_regex() {
        assert!(HEX_COLOR_REGEX.is_match("0x5865F2"));
        assert!(HEX_COLOR_REGEX.is_match("0xff0000"));

        assert!(!HEX_COLOR_REGEX.is_match("#FF0000")); // wrong prefix
        assert!(!HEX_COLOR_REGEX.is_match("0xFFF")); // too short
        assert!(!HEX_COLOR_REGEX.is_match("0xGGGGGG")); // invalid characters
        assert!(!HEX_COLOR_REGEX.is_match(""));
    }

    #[test]
    fn test_rgba_color_regex() {
        assert!(RGBA_COLOR_REGEX.is_match("rgb(32, 34, 37)"));
        assert!(RGBA_COLOR_REGEX.is_match("rgba(0, 0, 255, 0.15)"));
        assert!(RGBA_COLOR_REGEX.is_match("rgba(255, 159, 64, 1)"));

        assert!(!RGBA_COLOR_REGEX.is_match("rgb(32, 34)")); // missing component
        assert!(!RGBA_COLOR_REGEX.is_match("32, 34, 37"));
    }

    #[test]
    fn test_discord_id_regex() {
        assert!(DISCORD_ID_REGEX.is_match("1202754338272051252"));
        assert!(!DISCORD_ID_REGEX.is_match("12345"));
        assert!(!DISCORD_ID_REGEX.is_match("abc"));
    }

    #[test]
    fn test_validate_discord_token() {
        assert!(validate_discord_token("abc.def.ghi").is_ok());
        assert!(validate_discord_token("").is_err());
        assert!(validate_discord_token("no-dots-here").is_err());
        assert!(validate_discord_token("two..empty").is_err());
    }

    #[test]
    fn test_validate_https_url() {
        assert!(validate_https_url("https://spoo.me").is_ok());
        assert!(validate_https_url("http://spoo.me").is_err());
        assert!(validate_https_url("spoo.me").is_err());
    }
}
