//! spoo.me API client with connection pooling and client-side rate limiting
//!
//! HTTP client for the spoo.me URL shortening service: shorten/emojify
//! operations, per-URL statistics lookup and the service-wide metrics used
//! by the bot's status displays. Includes retry logic with exponential
//! backoff and a client-side request limiter so the bot stays inside the
//! service's published limits.

use crate::error::{Result, SpooBotError};
use crate::statistics::UrlStatistics;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::{num::NonZeroU32, sync::Arc, time::Duration};
use tokio_retry::{strategy::ExponentialBackoff, Retry};
use tracing::{debug, error, info, instrument, warn};

/// Configuration for the spoo.me API client
#[derive(Debug, Clone)]
pub struct SpooClientConfig {
    /// Base URL of the shortening service (e.g., "https://spoo.me")
    pub base_url: String,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Connection pool max idle connections per host (default: 10)
    pub max_idle_per_host: usize,
    /// Client-side rate limit: requests per second (default: 5)
    pub rate_limit_per_sec: u32,
    /// Maximum number of retry attempts (default: 3)
    pub max_retries: usize,
}

impl Default for SpooClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://spoo.me".to_string(),
            timeout_secs: 30,
            max_idle_per_host: 10,
            rate_limit_per_sec: 5,
            max_retries: 3,
        }
    }
}

impl SpooClientConfig {
    /// Create a new configuration for the given service base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set the client-side rate limit
    pub fn with_rate_limit(mut self, rate_limit_per_sec: u32) -> Self {
        self.rate_limit_per_sec = rate_limit_per_sec;
        self
    }

    /// Set the maximum retry attempts
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }
}

/// Parameters for a shorten request
#[derive(Debug, Clone, Default)]
pub struct ShortenRequest {
    pub url: String,
    pub alias: Option<String>,
    pub max_clicks: Option<u32>,
    pub password: Option<String>,
}

impl ShortenRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    fn form(&self) -> Vec<(&'static str, String)> {
        let mut form = vec![("url", self.url.clone())];
        if let Some(alias) = &self.alias {
            form.push(("alias", alias.clone()));
        }
        if let Some(max_clicks) = self.max_clicks {
            form.push(("max-clicks", max_clicks.to_string()));
        }
        if let Some(password) = &self.password {
            form.push(("password", password.clone()));
        }
        form
    }
}

/// Parameters for an emojify request
#[derive(Debug, Clone, Default)]
pub struct EmojifyRequest {
    pub url: String,
    pub emojis: Option<String>,
    pub max_clicks: Option<u32>,
    pub password: Option<String>,
}

impl EmojifyRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    fn form(&self) -> Vec<(&'static str, String)> {
        let mut form = vec![("url", self.url.clone())];
        if let Some(emojis) = &self.emojis {
            form.push(("emojies", emojis.clone()));
        }
        if let Some(max_clicks) = self.max_clicks {
            form.push(("max-clicks", max_clicks.to_string()));
        }
        if let Some(password) = &self.password {
            form.push(("password", password.clone()));
        }
        form
    }
}

/// A successfully created short URL
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShortUrl {
    #[serde(rename = "short_url")]
    pub url: String,
}

impl ShortUrl {
    /// The short code portion of the URL
    pub fn short_code(&self) -> &str {
        self.url.rsplit('/').next().unwrap_or(&self.url)
    }
}

/// Service-wide metrics (used by `/about`, `/bot-stats` and the stats
/// channel updater)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceMetrics {
    #[serde(rename = "total-shortlinks")]
    pub total_shortlinks: u64,
    #[serde(rename = "total-clicks")]
    pub total_clicks: u64,
}

/// Error payload returned by the service on 4xx responses
#[derive(Debug, Clone, Deserialize)]
struct ServiceError {
    #[serde(
        alias = "UrlError",
        alias = "AliasError",
        alias = "PasswordError",
        alias = "EmojiError",
        alias = "error"
    )]
    message: Option<String>,
}

/// spoo.me API client
#[derive(Debug, Clone)]
pub struct SpooClient {
    client: Client,
    config: SpooClientConfig,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
}

impl SpooClient {
    /// Create a new client with the given configuration
    pub fn new(config: SpooClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(config.max_idle_per_host)
            .build()
            .map_err(|e| SpooBotError::network_with_source("Failed to create HTTP client", e))?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.rate_limit_per_sec)
                .ok_or_else(|| SpooBotError::config("Rate limit must be greater than 0"))?,
        );
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Create a new client with default configuration
    pub fn with_defaults() -> Result<Self> {
        Self::new(SpooClientConfig::default())
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// POST a form to the service with retry logic
    #[instrument(skip(self, form), fields(path = %path))]
    async fn post_form(&self, path: &str, form: &[(&'static str, String)]) -> Result<Response> {
        self.rate_limiter.until_ready().await;

        let url = self.endpoint(path);
        debug!("Posting to: {}", url);

        let retry_strategy = ExponentialBackoff::from_millis(100)
            .max_delay(Duration::from_secs(10))
            .take(self.config.max_retries);

        let response = Retry::spawn(retry_strategy, || async {
            let request = self
                .client
                .post(&url)
                .header("Accept", "application/json")
                .form(form);

            match request.send().await {
                Ok(response) => {
                    if response.status().is_success() {
                        debug!("Request successful: {}", response.status());
                        Ok(response)
                    } else if response.status().is_client_error() {
                        // Don't retry client errors (4xx)
                        let status = response.status();
                        error!("Client error: {}", status);
                        Err(self.client_error(status, response).await)
                    } else {
                        // Retry server errors (5xx)
                        warn!("Server error, will retry: {}", response.status());
                        Err(SpooBotError::spoo_with_status(
                            format!("Service returned server error: {}", response.status()),
                            response.status().as_u16(),
                        ))
                    }
                }
                Err(e) if e.is_timeout() => {
                    warn!("Request timeout, will retry: {}", e);
                    Err(SpooBotError::network_with_source("Request timeout", e))
                }
                Err(e) if e.is_connect() => {
                    warn!("Connection error, will retry: {}", e);
                    Err(SpooBotError::network_with_source("Connection error", e))
                }
                Err(e) => {
                    error!("Request failed: {}", e);
                    Err(SpooBotError::network_with_source("Request failed", e))
                }
            }
        })
        .await?;

        info!("Completed request to {}", path);
        Ok(response)
    }

    /// GET a path with retry logic
    #[instrument(skip(self), fields(path = %path))]
    async fn get(&self, path: &str) -> Result<Response> {
        self.rate_limiter.until_ready().await;

        let url = self.endpoint(path);
        let retry_strategy = ExponentialBackoff::from_millis(100)
            .max_delay(Duration::from_secs(10))
            .take(self.config.max_retries);

        let response = Retry::spawn(retry_strategy, || async {
            match self
                .client
                .get(&url)
                .header("Accept", "application/json")
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => Ok(response),
                Ok(response) if response.status().is_client_error() => {
                    let status = response.status();
                    Err(self.client_error(status, response).await)
                }
                Ok(response) => Err(SpooBotError::spoo_with_status(
                    format!("Service returned server error: {}", response.status()),
                    response.status().as_u16(),
                )),
                Err(e) => Err(SpooBotError::network_with_source("Request failed", e)),
            }
        })
        .await?;

        Ok(response)
    }

    /// Translate a 4xx response into a typed error, surfacing the service's
    /// own message when it sends one
    async fn client_error(&self, status: StatusCode, response: Response) -> SpooBotError {
        let message = response
            .json::<ServiceError>()
            .await
            .ok()
            .and_then(|e| e.message)
            .unwrap_or_else(|| format!("Service returned client error: {}", status));
        SpooBotError::spoo_with_status(message, status.as_u16())
    }

    async fn parse_response<T>(&self, response: Response) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let text = response
            .text()
            .await
            .map_err(|e| SpooBotError::network_with_source("Failed to read response body", e))?;

        debug!("Response body: {}", text);

        serde_json::from_str(&text).map_err(SpooBotError::from)
    }

    // ============================================================================
    // Public API Methods
    // ============================================================================

    /// Shorten a long URL
    #[instrument(skip(self, request), fields(url = %request.url))]
    pub async fn shorten(&self, request: &ShortenRequest) -> Result<ShortUrl> {
        info!("Shortening URL");
        let response = self.post_form("/", &request.form()).await?;
        self.parse_response(response).await
    }

    /// Create an emoji short URL
    #[instrument(skip(self, request), fields(url = %request.url))]
    pub async fn emojify(&self, request: &EmojifyRequest) -> Result<ShortUrl> {
        info!("Emojifying URL");
        let response = self.post_form("/emoji", &request.form()).await?;
        self.parse_response(response).await
    }

    /// Fetch statistics for a short code
    #[instrument(skip(self, password), fields(short_code = %short_code))]
    pub async fn get_statistics(
        &self,
        short_code: &str,
        password: Option<&str>,
    ) -> Result<UrlStatistics> {
        info!("Fetching URL statistics");
        let mut form = Vec::new();
        if let Some(password) = password {
            form.push(("password", password.to_string()));
        }
        let response = self
            .post_form(&format!("/stats/{}", short_code), &form)
            .await?;
        self.parse_response(response).await
    }

    /// Fetch service-wide metrics (total short links and clicks)
    #[instrument(skip(self))]
    pub async fn get_service_metrics(&self) -> Result<ServiceMetrics> {
        info!("Fetching service metrics");
        let response = self.get("/metric").await?;
        self.parse_response(response).await
    }

    /// Simple health check against the metrics endpoint
    #[instrument(skip(self))]
    pub async fn test_connection(&self) -> bool {
        match self.get_service_metrics().await {
            Ok(_) => {
                info!("Connection test successful");
                true
            }
            Err(e) => {
                warn!("Connection test failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = SpooClientConfig::new("https://spoo.me");
        assert_eq!(config.base_url, "https://spoo.me");
        assert_eq!(config.timeout_secs, 30); // default
    }

    #[test]
    fn test_config_builder() {
        let config = SpooClientConfig::new("https://spoo.me")
            .with_timeout(60)
            .with_rate_limit(2)
            .with_max_retries(5);

        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.rate_limit_per_sec, 2);
        assert_eq!(config.max_retries, 5);
    }

    #[test]
    fn test_endpoint_building() {
        let client = SpooClient::new(SpooClientConfig::new("https://spoo.me/")).unwrap();
        assert_eq!(client.endpoint("/stats/abc"), "https://spoo.me/stats/abc");
        assert_eq!(client.endpoint("metric"), "https://spoo.me/metric");
    }

    #[test]
    fn test_rate_limit_validation() {
        let config = SpooClientConfig::new("https://spoo.me").with_rate_limit(0);
        let result = SpooClient::new(config);
        assert!(result.is_err());
        if let Err(e) = result {
            assert!(e.to_string().contains("Rate limit must be greater than 0"));
        }
    }

    #[tokio::test]
    async fn test_client_creation() {
        assert!(SpooClient::with_defaults().is_ok());
    }

    #[tokio::test]
    async fn test_rate_limiter_integration() {
        let client = SpooClient::new(SpooClientConfig::new("https://spoo.me").with_rate_limit(10))
            .unwrap();
        // First calls should pass immediately
        client.rate_limiter.until_ready().await;
        client.rate_limiter.until_ready().await;
    }

    #[test]
    fn test_shorten_request_form() {
        let mut request = ShortenRequest::new("https://example.com");
        request.alias = Some("mylink".to_string());
        request.max_clicks = Some(10);

        let form = request.form();
        assert!(form.contains(&("url", "https://example.com".to_string())));
        assert!(form.contains(&("alias", "mylink".to_string())));
        assert!(form.contains(&("max-clicks", "10".to_string())));
        assert!(!form.iter().any(|(k, _)| *k == "password"));
    }

    #[test]
    fn test_emojify_request_form() {
        let mut request = EmojifyRequest::new("https://example.com");
        request.emojis = Some("😀😀".to_string());

        let form = request.form();
        assert!(form.contains(&("emojies", "😀😀".to_string())));
    }

    #[test]
    fn test_short_url_code_extraction() {
        let short = ShortUrl {
            url: "https://spoo.me/ga".to_string(),
        };
        assert_eq!(short.short_code(), "ga");
    }

    #[test]
    fn test_service_metrics_deserialization() {
        let json = r#"{"total-shortlinks": 120000, "total-clicks": 4500000}"#;
        let metrics: ServiceMetrics = serde_json::from_str(json).unwrap();
        assert_eq!(metrics.total_shortlinks, 120_000);
        assert_eq!(metrics.total_clicks, 4_500_000);
    }

    #[test]
    fn test_service_error_aliases() {
        let json = r#"{"UrlError": "Invalid URL"}"#;
        let err: ServiceError = serde_json::from_str(json).unwrap();
        assert_eq!(err.message.as_deref(), Some("Invalid URL"));
    }
}
