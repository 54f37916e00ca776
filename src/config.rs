//! API endpoint configuration.
//!
//! Everything the HTTP clients need to reach the QuackWallet backend:
//! base URL and request timeout. Explicit construction is preferred;
//! `from_env` exists for tooling that wires itself from the environment.

use serde::{Deserialize, Serialize};

/// Default request timeout (seconds), matching the backend's own limit.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Connection configuration for the QuackWallet API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Server origin, e.g. `http://localhost:3000`. No trailing slash.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// Create a config for the given server origin.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Load from environment variables.
    ///
    /// Reads `QUACKWALLET_API_URL` (required) and
    /// `QUACKWALLET_TIMEOUT_SECS` (optional). Returns `None` when the URL
    /// is unset or empty.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("QUACKWALLET_API_URL").ok()?;
        if url.trim().is_empty() {
            return None;
        }

        let mut config = Self::new(url);
        if let Ok(timeout) = std::env::var("QUACKWALLET_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse::<u64>() {
                config.timeout_secs = secs;
            }
        }

        Some(config)
    }

    /// Build a full URL for an API path. `path` must start with `/`.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_construction() {
        let config = ApiConfig::new("http://localhost:3000");
        assert_eq!(
            config.endpoint("/auth/login"),
            "http://localhost:3000/api/auth/login"
        );
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let config = ApiConfig::new("http://localhost:3000/");
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(
            config.endpoint("/cards/user/7"),
            "http://localhost:3000/api/cards/user/7"
        );
    }

    #[test]
    fn default_timeout_applies() {
        let config = ApiConfig::new("http://localhost:3000");
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn config_round_trips_through_serde() {
        let config = ApiConfig::new("https://wallet.example.com");
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ApiConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.base_url, "https://wallet.example.com");
    }
}
