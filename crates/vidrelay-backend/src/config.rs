//! Configuration for the shared HTTP client.

use std::time::Duration;

use vidrelay_core::config::DEFAULT_REQUEST_TIMEOUT;

/// Configuration for the backend HTTP client.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use vidrelay_backend::HttpClientConfig;
///
/// let config = HttpClientConfig::new()
///     .with_timeout(Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// User agent string for HTTP requests
    pub(crate) user_agent: String,
    /// Budget for connecting and for each read while a response streams in
    pub(crate) timeout: Duration,
    /// Idle connections kept per backend host
    pub(crate) pool_max_idle_per_host: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("vidrelay/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            pool_max_idle_per_host: 10,
        }
    }
}

impl HttpClientConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connect and per-read timeout.
    ///
    /// Defaults to 30 seconds. A transfer may take longer in total as long as
    /// data keeps arriving.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpClientConfig::new();
        assert!(config.user_agent.starts_with("vidrelay/"));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.pool_max_idle_per_host, 10);
    }

    #[test]
    fn test_builder_pattern() {
        let config = HttpClientConfig::new().with_timeout(Duration::from_secs(5));

        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.user_agent.starts_with("vidrelay/"));
    }
}
