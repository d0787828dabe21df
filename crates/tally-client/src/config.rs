//! SDK configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Connection settings for the billing API.
///
/// Both credentials are customer-facing: the public key identifies the
/// business (`pk_` prefix), the customer token scopes every call to one
/// customer (`cat_` prefix). Neither is parsed beyond the prefix check.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub(crate) api_url: String,
    pub(crate) public_key: String,
    pub(crate) customer_token: String,
}

impl ClientConfig {
    /// Validate and build a config. A trailing `/` on `api_url` is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] if `api_url` is empty, the
    /// public key does not start with `pk_`, or the customer token does not
    /// start with `cat_`.
    pub fn new(
        api_url: impl Into<String>,
        public_key: impl Into<String>,
        customer_token: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        let public_key = public_key.into();
        let customer_token = customer_token.into();

        if api_url.is_empty() {
            return Err(ClientError::Configuration("api url is required".to_string()));
        }
        if !public_key.starts_with("pk_") {
            return Err(ClientError::Configuration(
                "public key must start with \"pk_\"".to_string(),
            ));
        }
        if !customer_token.starts_with("cat_") {
            return Err(ClientError::Configuration(
                "customer token must start with \"cat_\"".to_string(),
            ));
        }

        Ok(Self {
            api_url,
            public_key,
            customer_token,
        })
    }

    /// Base URL of the billing API.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

/// Freshness windows for the cached reads.
///
/// Check results and derived usage snapshots go stale quickly (they move
/// with every tracked event); customer records are stable enough for a
/// longer window.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long a check result stays fresh (default 5s).
    pub check_ttl: Duration,

    /// How long a derived usage snapshot stays fresh (default 5s).
    pub usage_ttl: Duration,

    /// How long a customer record stays fresh (default 30s).
    pub customer_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            check_ttl: Duration::from_secs(5),
            usage_ttl: Duration::from_secs(5),
            customer_ttl: Duration::from_secs(30),
        }
    }
}

/// Websocket settings a realtime transport implementation consumes.
///
/// The bridge itself only needs a transport object; these settings describe
/// how a concrete transport reaches the broadcast server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Application key issued by the broadcast server.
    pub key: String,

    /// Websocket host (default `localhost`).
    pub ws_host: String,

    /// Plain websocket port (default 8080).
    pub ws_port: u16,

    /// TLS websocket port (default 8080).
    pub wss_port: u16,

    /// Force TLS transport (default off).
    pub force_tls: bool,
}

impl RealtimeConfig {
    /// Create a config with default host and ports.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ws_host: "localhost".to_string(),
            ws_port: 8080,
            wss_port: 8080,
            force_tls: false,
        }
    }

    /// Set the websocket host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.ws_host = host.into();
        self
    }

    /// Set both websocket ports.
    #[must_use]
    pub fn with_ports(mut self, ws_port: u16, wss_port: u16) -> Self {
        self.ws_port = ws_port;
        self.wss_port = wss_port;
        self
    }

    /// Force TLS transport.
    #[must_use]
    pub fn with_force_tls(mut self, force_tls: bool) -> Self {
        self.force_tls = force_tls;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_trims_trailing_slash() {
        let config = ClientConfig::new("http://localhost:8080/", "pk_test", "cat_test").unwrap();
        assert_eq!(config.api_url(), "http://localhost:8080");
    }

    #[test]
    fn public_key_prefix_is_enforced() {
        let err = ClientConfig::new("http://localhost:8080", "sk_test", "cat_test").unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));
    }

    #[test]
    fn customer_token_prefix_is_enforced() {
        let err = ClientConfig::new("http://localhost:8080", "pk_test", "token").unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));
    }

    #[test]
    fn empty_api_url_is_rejected() {
        let err = ClientConfig::new("", "pk_test", "cat_test").unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));
    }

    #[test]
    fn cache_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.check_ttl, Duration::from_secs(5));
        assert_eq!(config.usage_ttl, Duration::from_secs(5));
        assert_eq!(config.customer_ttl, Duration::from_secs(30));
    }

    #[test]
    fn realtime_builder_pattern() {
        let config = RealtimeConfig::new("app-key")
            .with_host("reverb.example.com")
            .with_ports(80, 443)
            .with_force_tls(true);

        assert_eq!(config.ws_host, "reverb.example.com");
        assert_eq!(config.wss_port, 443);
        assert!(config.force_tls);
    }
}
