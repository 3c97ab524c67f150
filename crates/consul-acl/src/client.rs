//! Client configuration and the shared client handle

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::acl::Acl;
use crate::error::Result;
use crate::transport::{build_uri, HttpTransport, Transport};
use crate::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};

/// Configuration for the ACL client
#[derive(Clone)]
pub struct ClientConfig {
    /// Agent address including the API version, e.g. `http://127.0.0.1:8500/v1`
    pub base_url: String,
    /// ACL token sent with every request
    pub token: Option<String>,
    /// Datacenter to query instead of the agent's own
    pub datacenter: Option<String>,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            datacenter: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("datacenter", &self.datacenter)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for ClientConfig
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = Some(token.into());
        self
    }

    pub fn datacenter(mut self, datacenter: impl Into<String>) -> Self {
        self.config.datacenter = Some(datacenter.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// Consul API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a client for the agent at `base_url` with no token
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig {
            base_url: base_url.into(),
            ..Default::default()
        })
    }

    /// Create a client backed by `reqwest`
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.token.as_deref(), config.timeout)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client over any transport. The token in `config` is the
    /// transport's business; only the base URL and datacenter are used here.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(ClientInner { config, transport }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The ACL endpoints
    pub fn acl(&self) -> Acl {
        Acl::new(self.clone())
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.inner.transport.as_ref()
    }

    /// URI for `segments` under `{base_url}/{endpoint}`
    pub(crate) fn endpoint_uri(&self, endpoint: &str, segments: &[&str]) -> Result<String> {
        let mut path = Vec::with_capacity(segments.len() + 1);
        path.push(endpoint);
        path.extend_from_slice(segments);

        let query: Vec<(&str, &str)> = self
            .inner
            .config
            .datacenter
            .as_deref()
            .map(|dc| ("dc", dc))
            .into_iter()
            .collect();

        build_uri(&self.inner.config.base_url, &path, &query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client() {
        let client = Client::new("http://consul.service:8500/v1").unwrap();
        assert_eq!(client.config().base_url, "http://consul.service:8500/v1");
        assert!(client.config().token.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::builder()
            .base_url("https://consul.example.com/v1")
            .token("b1gs33cr3t")
            .datacenter("dc2")
            .timeout(Duration::from_secs(5))
            .build();

        assert_eq!(config.base_url, "https://consul.example.com/v1");
        assert_eq!(config.token.as_deref(), Some("b1gs33cr3t"));
        assert_eq!(config.datacenter.as_deref(), Some("dc2"));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ClientConfig::builder().token("b1gs33cr3t").build();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("b1gs33cr3t"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_endpoint_uri_with_datacenter() {
        let client = Client::with_config(
            ClientConfig::builder()
                .base_url("http://127.0.0.1:8500/v1")
                .datacenter("dc2")
                .build(),
        )
        .unwrap();

        assert_eq!(
            client.endpoint_uri("acl", &["info", "abc"]).unwrap(),
            "http://127.0.0.1:8500/v1/acl/info/abc?dc=dc2"
        );
    }

    #[test]
    fn test_invalid_token_rejected() {
        let err = Client::with_config(ClientConfig::builder().token("bad\ntoken").build())
            .unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }
}
