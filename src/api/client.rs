//! Backend client construction and configuration discovery.
//!
//! The shared client is built lazily on first use so a missing or malformed
//! backend URL surfaces as a clear configuration error at the first call
//! site, not as a panic at startup.

use std::sync::OnceLock;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, Url};

use crate::error::{LineboardError, Result};

/// Retries after the initial attempt for transient failures.
const MAX_REQUEST_RETRIES: u32 = 3;
/// First retry delay; doubles per attempt.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);
/// Exponent cap, bounding the delay at base * 2^4 = 8s.
const MAX_BACKOFF_EXP: u32 = 4;

/// Exponential retry delay for one attempt.
pub(crate) fn retry_delay(attempt: u32) -> Duration {
    RETRY_BASE_DELAY * 2u32.pow(attempt.min(MAX_BACKOFF_EXP))
}

/// Recognized environment variable names for the backend URL, in
/// precedence order.
pub const URL_ENV_VARS: &[&str] = &["LINEBOARD_SUPABASE_URL", "SUPABASE_URL", "VITE_SUPABASE_URL"];

/// Recognized environment variable names for the backend access key.
pub const KEY_ENV_VARS: &[&str] = &[
    "LINEBOARD_SUPABASE_ANON_KEY",
    "SUPABASE_ANON_KEY",
    "VITE_SUPABASE_ANON_KEY",
];

/// Header carrying the originating session id, echoed back on the change
/// feed so a client can suppress its own events.
pub const ORIGIN_HEADER: &str = "x-lineboard-origin";

/// Validated backend endpoint configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub url: Url,
    pub key: String,
}

impl BackendConfig {
    /// Validate a URL/key pair.
    pub fn new(url: &str, key: &str) -> Result<Self> {
        let parsed = Url::parse(url)
            .map_err(|e| LineboardError::Config(format!("invalid backend URL '{}': {}", url, e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(LineboardError::Config(format!(
                "backend URL must be http(s), got '{}'",
                url
            )));
        }
        if key.trim().is_empty() {
            return Err(LineboardError::Config("backend access key is empty".to_string()));
        }
        Ok(Self {
            url: parsed,
            key: key.to_string(),
        })
    }

    /// Discover URL and key from the recognized environment variable sets.
    pub fn from_env() -> Result<Self> {
        let url = first_env(URL_ENV_VARS).ok_or_else(|| {
            LineboardError::Config(format!("backend URL not set (tried {})", URL_ENV_VARS.join(", ")))
        })?;
        let key = first_env(KEY_ENV_VARS).ok_or_else(|| {
            LineboardError::Config(format!(
                "backend access key not set (tried {})",
                KEY_ENV_VARS.join(", ")
            ))
        })?;
        Self::new(&url, &key)
    }
}

fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

/// HTTP client bound to one backend, carrying auth headers and a session
/// id for echo suppression.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: BackendConfig,
    session_id: String,
}

static SHARED: OnceLock<ApiClient> = OnceLock::new();

impl ApiClient {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            session_id: generate_session_id(),
        }
    }

    /// Build a client from environment configuration.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(BackendConfig::from_env()?))
    }

    /// Process-wide client, constructed on first use.
    ///
    /// Fails fast with a configuration error on that first use; later
    /// callers get the memoized instance.
    pub fn shared() -> Result<&'static ApiClient> {
        if let Some(client) = SHARED.get() {
            return Ok(client);
        }
        let client = Self::from_env()?;
        Ok(SHARED.get_or_init(|| client))
    }

    /// Session id attached to every mutation, echoed by the change feed.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// REST endpoint for one table.
    pub fn table_url(&self, table: &str) -> Url {
        let mut url = self.config.url.clone();
        {
            let mut segments = url.path_segments_mut().expect("backend URL is a valid base");
            segments.pop_if_empty().push("rest").push("v1").push(table);
        }
        url
    }

    /// Change-feed endpoint for one table.
    pub fn change_feed_url(&self, table: &str) -> Url {
        let mut url = self.config.url.clone();
        {
            let mut segments = url.path_segments_mut().expect("backend URL is a valid base");
            segments.pop_if_empty().push("realtime").push("v1").push("changes");
        }
        url.query_pairs_mut().append_pair("table", table);
        url
    }

    /// Request builder with auth and origin headers attached.
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http.request(method, url).headers(self.auth_headers())
    }

    /// Send with capped exponential retry on transient failures.
    ///
    /// 4xx responses come back immediately as [`LineboardError::Api`]; 5xx
    /// and network errors retry up to the cap. Every data-access path goes
    /// through here.
    pub(crate) async fn execute<F>(&self, build: F) -> Result<reqwest::Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt: u32 = 0;
        loop {
            let error = match build().send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }
                    let message = response.text().await.unwrap_or_default();
                    LineboardError::Api {
                        status: status.as_u16(),
                        message,
                    }
                }
                Err(err) => LineboardError::Network(err),
            };

            if !error.is_retryable() || attempt >= MAX_REQUEST_RETRIES {
                return Err(error);
            }

            let delay = retry_delay(attempt);
            tracing::warn!(attempt, delay_ms = delay.as_millis() as u64, error = %error, "retrying request");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&self.config.key) {
            headers.insert("apikey", value);
        }
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", self.config.key)) {
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }
        if let Ok(value) = HeaderValue::from_str(&self.session_id) {
            headers.insert(ORIGIN_HEADER, value);
        }
        headers
    }
}

/// Session id: `{timestamp_ms}-{pid}`, unique enough to tell two mounted
/// dashboards apart.
fn generate_session_id() -> String {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("{}-{}", timestamp, std::process::id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_config_valid() {
        let config = BackendConfig::new("https://example.supabase.co", "anon-key").unwrap();
        assert_eq!(config.url.as_str(), "https://example.supabase.co/");
        assert_eq!(config.key, "anon-key");
    }

    #[test]
    fn test_backend_config_rejects_malformed_url() {
        let err = BackendConfig::new("not a url", "key").unwrap_err();
        assert!(matches!(err, LineboardError::Config(_)));
    }

    #[test]
    fn test_backend_config_rejects_non_http_scheme() {
        let err = BackendConfig::new("ftp://example.com", "key").unwrap_err();
        assert!(matches!(err, LineboardError::Config(_)));
    }

    #[test]
    fn test_backend_config_rejects_empty_key() {
        let err = BackendConfig::new("https://example.com", "  ").unwrap_err();
        assert!(matches!(err, LineboardError::Config(_)));
    }

    #[test]
    fn test_table_url() {
        let config = BackendConfig::new("https://example.supabase.co", "key").unwrap();
        let client = ApiClient::new(config);
        assert_eq!(
            client.table_url("orders").as_str(),
            "https://example.supabase.co/rest/v1/orders"
        );
    }

    #[test]
    fn test_change_feed_url() {
        let config = BackendConfig::new("https://example.supabase.co", "key").unwrap();
        let client = ApiClient::new(config);
        assert_eq!(
            client.change_feed_url("orders").as_str(),
            "https://example.supabase.co/realtime/v1/changes?table=orders"
        );
    }

    #[test]
    fn test_retry_delay_doubles_and_caps() {
        assert_eq!(retry_delay(0), Duration::from_millis(500));
        assert_eq!(retry_delay(1), Duration::from_millis(1000));
        assert_eq!(retry_delay(2), Duration::from_millis(2000));
        // Capped at base * 2^4.
        assert_eq!(retry_delay(10), Duration::from_millis(8000));
    }

    #[test]
    fn test_session_ids_differ_between_clients() {
        let config = BackendConfig::new("https://example.supabase.co", "key").unwrap();
        let a = ApiClient::new(config.clone());
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = ApiClient::new(config);
        assert_ne!(a.session_id(), b.session_id());
    }
}
