//! Client configuration.
//!
//! Built with the `with_*` methods or loaded from `CONFAB_*` environment
//! variables.
//!
//! # Example
//!
//! ```
//! use confab::config::ClientConfig;
//!
//! let config = ClientConfig::default()
//!     .with_base_url("http://chat.internal/api/")
//!     .with_bearer_token("secret")
//!     .with_streaming(false);
//!
//! assert_eq!(config.base_url, "http://chat.internal/api");
//! assert_eq!(
//!     config.endpoint("conversations/"),
//!     "http://chat.internal/api/conversations/"
//! );
//! ```

use std::time::Duration;

use crate::error::{ClientError, ClientResult};
use crate::traits::Headers;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

pub const ENV_API_URL: &str = "CONFAB_API_URL";
pub const ENV_TOKEN: &str = "CONFAB_TOKEN";
pub const ENV_SESSION_COOKIE: &str = "CONFAB_SESSION_COOKIE";
pub const ENV_CSRF_TOKEN: &str = "CONFAB_CSRF_TOKEN";
pub const ENV_NO_STREAM: &str = "CONFAB_NO_STREAM";
pub const ENV_TIMEOUT_SECS: &str = "CONFAB_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// API root without a trailing slash
    pub base_url: String,
    /// Sent as `Authorization: Bearer <token>`
    pub bearer_token: Option<String>,
    /// Raw `Cookie` header value
    pub session_cookie: Option<String>,
    /// Sent as `X-CSRFToken`
    pub csrf_token: Option<String>,
    /// Use the streaming endpoint for sends (default: true)
    pub streaming: bool,
    /// Whole-request timeout handed to the HTTP client; none by default
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            bearer_token: None,
            session_cookie: None,
            csrf_token: None,
            streaming: true,
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn with_session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.session_cookie = Some(cookie.into());
        self
    }

    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Load from the process environment.
    pub fn from_env() -> ClientResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Unset and empty values fall back to
    /// the defaults.
    pub fn from_lookup<F>(lookup: F) -> ClientResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_API_URL) {
            config = config.with_base_url(url);
        }
        config.bearer_token = get(ENV_TOKEN);
        config.session_cookie = get(ENV_SESSION_COOKIE);
        config.csrf_token = get(ENV_CSRF_TOKEN);

        if let Some(value) = get(ENV_NO_STREAM) {
            config.streaming = !parse_flag(&value);
        }

        if let Some(value) = get(ENV_TIMEOUT_SECS) {
            let secs: u64 = value.trim().parse().map_err(|_| ClientError::Config {
                message: format!("{} must be a whole number of seconds, got '{}'", ENV_TIMEOUT_SECS, value),
            })?;
            config.request_timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Absolute URL for a path under the API root.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Headers attached to every request.
    pub fn headers(&self) -> Headers {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        if let Some(token) = &self.bearer_token {
            headers.insert("Authorization".to_string(), format!("Bearer {}", token));
        }
        if let Some(cookie) = &self.session_cookie {
            headers.insert("Cookie".to_string(), cookie.clone());
        }
        if let Some(csrf) = &self.csrf_token {
            headers.insert("X-CSRFToken".to_string(), csrf.clone());
        }
        headers
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
