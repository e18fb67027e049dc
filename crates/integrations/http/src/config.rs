use std::collections::HashMap;
use std::time::Duration;

use courier_provider::ProviderError;
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Authentication method for the carrier API.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthMethod {
    /// HTTP Bearer token (`Authorization: Bearer <token>`).
    Bearer(String),

    /// HTTP Basic authentication (`Authorization: Basic <base64>`).
    Basic { username: String, password: String },

    /// API key sent in a custom header.
    ApiKey { header: String, value: String },
}

impl std::fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bearer(_) => f.debug_tuple("Bearer").field(&"[REDACTED]").finish(),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
            Self::ApiKey { header, .. } => f
                .debug_struct("ApiKey")
                .field("header", header)
                .field("value", &"[REDACTED]")
                .finish(),
        }
    }
}

/// Configuration for an [`HttpCarrier`](crate::HttpCarrier).
#[derive(Debug, Clone)]
pub struct HttpCarrierConfig {
    /// Base URL of the carrier API, without a trailing slash.
    pub base_url: String,

    /// Authentication method, if any.
    pub auth: Option<AuthMethod>,

    /// Static headers to include in every request.
    pub headers: HashMap<String, String>,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl HttpCarrierConfig {
    /// Create a new configuration for the carrier at `base_url`.
    ///
    /// Defaults to no authentication and a 10-second request timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            auth: None,
            headers: HashMap::new(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Set the authentication method.
    #[must_use]
    pub fn with_auth(mut self, auth: AuthMethod) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Add a static header.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn messages_url(&self) -> Result<Url, ProviderError> {
        self.endpoint(&["messages"])
    }

    /// The carrier id becomes one percent-encoded path segment.
    pub(crate) fn message_url(&self, id: &str) -> Result<Url, ProviderError> {
        self.endpoint(&["messages", id])
    }

    pub(crate) fn health_url(&self) -> Result<Url, ProviderError> {
        self.endpoint(&["health"])
    }

    /// Append `segments` to the base URL's path.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ProviderError::Configuration(format!("invalid base_url '{}': {e}", self.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                ProviderError::Configuration(format!(
                    "base_url '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}
