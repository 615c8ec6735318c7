//! Gateway configuration.

use std::time::Duration;

/// Public AOJ judge API.
pub const DEFAULT_BASE_URL: &str = "https://judgeapi.u-aizu.ac.jp";

/// Upper bound on every request, connect through body.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and how [`AojAuthGateway`](crate::AojAuthGateway) talks to the
/// judge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Base URL without a trailing path, e.g. `https://judgeapi.u-aizu.ac.jp`.
    pub base_url: String,

    /// Timeout applied to each request.
    pub request_timeout: Duration,
}

impl GatewayConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Joins `path` (which starts with `/`) onto the base URL.
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}
