//! Client configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! Every knob has a default so a bare `campus` invocation talks to a local
//! backend on port 8081. CLI flags override whatever is loaded here.
//! Parsing goes through a lookup closure so tests never touch the process
//! environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::chat::reconnect::ReconnectPolicy;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8081/api/";
pub const DEFAULT_DISPLAY_NAME: &str = "You";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RECONNECT_BASE_MS: u64 = 1000;
pub const DEFAULT_RECONNECT_MAX_MS: u64 = 10_000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL `{0}`: expected http:// or https://")]
    InvalidBaseUrl(String),
    #[error("invalid websocket URL `{0}`: expected ws:// or wss://")]
    InvalidWsUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// REST API root, always ending in `/`.
    pub base_url: String,
    /// Explicit realtime endpoint root. Derived from `base_url` when absent.
    pub ws_url: Option<String>,
    /// File holding the persisted session context, if any.
    pub session_file: Option<PathBuf>,
    /// Name stamped on optimistic chat entries.
    pub display_name: String,
    pub http_timeout: Duration,
    pub reconnect: ReconnectPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            ws_url: None,
            session_file: None,
            display_name: DEFAULT_DISPLAY_NAME.to_owned(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            reconnect: ReconnectPolicy::disabled(),
        }
    }
}

impl ClientConfig {
    /// Build config from the process environment.
    ///
    /// Optional:
    /// - `CAMPUS_BASE_URL`: REST root (default `http://localhost:8081/api/`)
    /// - `CAMPUS_WS_URL`: realtime root, e.g. `wss://chat.example.edu`
    /// - `CAMPUS_SESSION_FILE`: path of the persisted session
    /// - `CAMPUS_DISPLAY_NAME`: name for optimistic chat entries (default `You`)
    /// - `CAMPUS_HTTP_TIMEOUT_SECS`: default 30
    /// - `CAMPUS_RECONNECT_MAX_ATTEMPTS`: default 0 (no reconnect)
    /// - `CAMPUS_RECONNECT_BASE_MS`: default 1000
    /// - `CAMPUS_RECONNECT_MAX_MS`: default 10000
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url = normalize_base_url(&get("CAMPUS_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()))?;
        let ws_url = get("CAMPUS_WS_URL").map(|raw| normalize_ws_url(&raw)).transpose()?;
        let session_file = get("CAMPUS_SESSION_FILE").map(PathBuf::from);
        let display_name = get("CAMPUS_DISPLAY_NAME").unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_owned());
        let http_timeout = Duration::from_secs(parse_or(get("CAMPUS_HTTP_TIMEOUT_SECS"), DEFAULT_HTTP_TIMEOUT_SECS));

        let reconnect = ReconnectPolicy {
            max_attempts: parse_or(get("CAMPUS_RECONNECT_MAX_ATTEMPTS"), 0),
            base_delay: Duration::from_millis(parse_or(get("CAMPUS_RECONNECT_BASE_MS"), DEFAULT_RECONNECT_BASE_MS)),
            max_delay: Duration::from_millis(parse_or(get("CAMPUS_RECONNECT_MAX_MS"), DEFAULT_RECONNECT_MAX_MS)),
            jitter: true,
        };

        Ok(Self { base_url, ws_url, session_file, display_name, http_timeout, reconnect })
    }
}

fn parse_or<T>(raw: Option<String>, default: T) -> T
where
    T: std::str::FromStr,
{
    raw.and_then(|v| v.trim().parse::<T>().ok()).unwrap_or(default)
}

/// Require an http(s) scheme and a trailing slash so relative endpoint
/// paths join under the API root.
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidBaseUrl(raw.to_owned()));
    }
    if trimmed.ends_with('/') {
        Ok(trimmed.to_owned())
    } else {
        Ok(format!("{trimmed}/"))
    }
}

pub fn normalize_ws_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    if !(trimmed.starts_with("ws://") || trimmed.starts_with("wss://")) {
        return Err(ConfigError::InvalidWsUrl(raw.to_owned()));
    }
    Ok(trimmed.trim_end_matches('/').to_owned())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
