//! Client configuration.

use std::time::Duration;

use url::Url;

use crate::error::{ClientError, Result};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_REFRESH_PATH: &str = "/token/refresh/";
pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_USER_AGENT: &str = concat!("votenow-client/", env!("CARGO_PKG_VERSION"));

/// Configurable options for the API client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Origin every request path is appended to, e.g. `https://host/api`.
    pub base_url: String,

    /// Path of the token-refresh endpoint, relative to `base_url`.
    pub refresh_path: String,

    /// Login entry point announced when the session can no longer be refreshed.
    pub login_path: String,

    /// Overall timeout for a single HTTP request.
    pub timeout: Duration,

    /// Time allowed to establish the connection.
    pub connect_timeout: Duration,

    pub user_agent: String,

    /// Share one in-flight refresh between concurrent 401s instead of
    /// letting each request refresh on its own.
    pub single_flight_refresh: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            refresh_path: DEFAULT_REFRESH_PATH.to_owned(),
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            single_flight_refresh: true,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `VOTENOW_API_BASE_URL`: API origin (default: `http://127.0.0.1:8000/api`)
    /// - `VOTENOW_REFRESH_PATH`: token refresh path (default: `/token/refresh/`)
    /// - `VOTENOW_TIMEOUT_SECS`: request timeout in seconds (default: 30)
    /// - `VOTENOW_SINGLE_FLIGHT`: share concurrent refreshes (default: true)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(base_url) = std::env::var("VOTENOW_API_BASE_URL")
            && !base_url.trim().is_empty()
        {
            config.base_url = base_url.trim().to_string();
        }

        if let Ok(path) = std::env::var("VOTENOW_REFRESH_PATH")
            && !path.trim().is_empty()
        {
            config.refresh_path = path.trim().to_string();
        }

        if let Some(secs) = std::env::var("VOTENOW_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            config.timeout = Duration::from_secs(secs);
        }

        if let Ok(value) = std::env::var("VOTENOW_SINGLE_FLIGHT") {
            config.single_flight_refresh = parse_flag(&value).unwrap_or(true);
        }

        config
    }

    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_single_flight_refresh(mut self, enabled: bool) -> Self {
        self.single_flight_refresh = enabled;
        self
    }

    /// Check that the base URL is an absolute http(s) URL.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::config(format!("invalid base URL `{}`: {e}", self.base_url)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::config(format!(
                "unsupported scheme `{}` in base URL",
                url.scheme()
            )));
        }

        if self.refresh_path.trim().is_empty() {
            return Err(ClientError::config("refresh path must not be empty"));
        }

        Ok(())
    }

    /// Build the absolute URL for `path` by appending it to the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
