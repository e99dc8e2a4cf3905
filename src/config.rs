//! Configuration for the proxy pool.

use crate::proxy::ProxyProtocol;

use std::fmt;
use std::time::Duration;

/// Default provisioning endpoint; the provider key is appended as a path segment.
pub const DEFAULT_ENDPOINT: &str = "https://actproxy.com/proxy-api";

/// Strategy for selecting a proxy from the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionStrategy {
    /// Select proxies in round-robin order.
    #[default]
    RoundRobin,
    /// Select a uniformly random proxy.
    Random,
}

/// Body format requested from the provisioning source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// JSON array of record strings.
    #[default]
    Json,
    /// Newline-delimited record strings.
    Raw,
}

/// Configuration for the proxy pool.
#[derive(Clone)]
pub struct ProxyPoolConfig {
    /// Provider keys, fetched in order.
    pub api_keys: Vec<String>,
    /// Provisioning endpoint the key is appended to.
    pub endpoint: String,
    /// Body format requested from the provider.
    pub output_format: OutputFormat,
    /// Ask the provider to include usernames and passwords.
    pub include_credentials: bool,
    /// Protocol used when formatting proxy URLs.
    pub protocol: ProxyProtocol,
    /// Strategy used by `get_proxy` and the middleware.
    pub selection_strategy: SelectionStrategy,
    /// Treat a fetch cycle yielding no proxies as an error.
    pub require_proxies: bool,
    /// Timeout for provider requests and for proxied clients.
    pub request_timeout: Duration,
}

impl ProxyPoolConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ProxyPoolConfigBuilder {
        ProxyPoolConfigBuilder::new()
    }
}

impl Default for ProxyPoolConfig {
    fn default() -> Self {
        ProxyPoolConfigBuilder::new().build()
    }
}

// Provider keys are credentials, keep them out of debug output.
impl fmt::Debug for ProxyPoolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyPoolConfig")
            .field("api_keys", &format_args!("[{} redacted]", self.api_keys.len()))
            .field("endpoint", &self.endpoint)
            .field("output_format", &self.output_format)
            .field("include_credentials", &self.include_credentials)
            .field("protocol", &self.protocol)
            .field("selection_strategy", &self.selection_strategy)
            .field("require_proxies", &self.require_proxies)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Builder for `ProxyPoolConfig`.
pub struct ProxyPoolConfigBuilder {
    api_keys: Vec<String>,
    endpoint: Option<String>,
    output_format: Option<OutputFormat>,
    include_credentials: Option<bool>,
    protocol: Option<ProxyProtocol>,
    selection_strategy: Option<SelectionStrategy>,
    require_proxies: Option<bool>,
    request_timeout: Option<Duration>,
}

impl ProxyPoolConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self {
            api_keys: Vec::new(),
            endpoint: None,
            output_format: None,
            include_credentials: None,
            protocol: None,
            selection_strategy: None,
            require_proxies: None,
            request_timeout: None,
        }
    }

    /// Set the provider keys.
    pub fn api_keys(mut self, keys: Vec<impl Into<String>>) -> Self {
        self.api_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Append one provider key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_keys.push(key.into());
        self
    }

    /// Set the provisioning endpoint.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the body format requested from the provider.
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    /// Ask the provider to include credentials.
    pub fn include_credentials(mut self, include: bool) -> Self {
        self.include_credentials = Some(include);
        self
    }

    /// Set the protocol used to format proxy URLs.
    pub fn protocol(mut self, protocol: ProxyProtocol) -> Self {
        self.protocol = Some(protocol);
        self
    }

    /// Set the strategy for selecting proxies.
    pub fn selection_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.selection_strategy = Some(strategy);
        self
    }

    /// Fail fetch cycles that yield no proxies.
    pub fn require_proxies(mut self, require: bool) -> Self {
        self.require_proxies = Some(require);
        self
    }

    /// Set the request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ProxyPoolConfig {
        ProxyPoolConfig {
            api_keys: self.api_keys,
            endpoint: self.endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            output_format: self.output_format.unwrap_or_default(),
            include_credentials: self.include_credentials.unwrap_or(true),
            protocol: self.protocol.unwrap_or_default(),
            selection_strategy: self.selection_strategy.unwrap_or_default(),
            require_proxies: self.require_proxies.unwrap_or(false),
            request_timeout: self.request_timeout.unwrap_or(Duration::from_secs(30)),
        }
    }
}

impl Default for ProxyPoolConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProxyPoolConfig::default();
        assert!(config.api_keys.is_empty());
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.output_format, OutputFormat::Json);
        assert!(config.include_credentials);
        assert_eq!(config.protocol, ProxyProtocol::Socks5);
        assert_eq!(config.selection_strategy, SelectionStrategy::RoundRobin);
        assert!(!config.require_proxies);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_builder_keys_keep_order() {
        let config = ProxyPoolConfig::builder()
            .api_keys(vec!["first", "second"])
            .api_key("third")
            .protocol(ProxyProtocol::Http)
            .build();
        assert_eq!(config.api_keys, vec!["first", "second", "third"]);
        assert_eq!(config.protocol, ProxyProtocol::Http);
    }

    #[test]
    fn test_debug_redacts_keys() {
        let config = ProxyPoolConfig::builder().api_key("super-secret").build();
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[1 redacted]"));
    }
}
