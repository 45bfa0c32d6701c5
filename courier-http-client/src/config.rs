//! HTTP client configuration.

use crate::redirect::{DEFAULT_MAX_REDIRECTS, RedirectConfig};
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Prefix for environment overrides read by [`HttpClientConfig::from_env`].
pub const ENV_PREFIX: &str = "COURIER";

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable held a value that could not be parsed.
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        /// Full variable name.
        key: String,
        /// Raw value.
        value: String,
        /// Parse failure.
        reason: String,
    },
}

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL that relative request URLs are joined onto.
    pub base_url: Option<String>,
    /// Default request timeout, applied per hop by the transport.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// How long idle pooled connections are kept.
    pub pool_idle_timeout: Duration,
    /// Maximum idle connections per host.
    pub pool_max_idle_per_host: usize,
    /// Default headers for all requests.
    pub default_headers: Vec<(String, String)>,
    /// User agent string.
    pub user_agent: String,
    /// Enable gzip compression.
    pub gzip: bool,
    /// Enable brotli compression.
    pub brotli: bool,
    /// Follow redirects.
    pub follow_redirects: bool,
    /// Maximum redirects to follow.
    pub max_redirects: u32,
    /// Forward `Set-Cookie` values across redirect hops.
    pub carry_cookies: bool,
    /// Log each exchange through `tracing`.
    pub log_requests: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 32,
            default_headers: Vec::new(),
            user_agent: format!("courier-http-client/{}", env!("CARGO_PKG_VERSION")),
            gzip: true,
            brotli: true,
            follow_redirects: true,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            carry_cookies: false,
            log_requests: true,
        }
    }
}

impl HttpClientConfig {
    /// Create a new configuration builder.
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }

    /// Defaults overridden by `COURIER_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with_prefix(ENV_PREFIX)
    }

    /// Defaults overridden by `<PREFIX>_*` environment variables.
    ///
    /// Recognized keys: `MAX_REDIRECTS`, `FOLLOW_REDIRECTS`, `CARRY_COOKIES`,
    /// `TIMEOUT_SECS`, `CONNECT_TIMEOUT_SECS`, `USER_AGENT`, `BASE_URL`.
    pub fn from_env_with_prefix(prefix: &str) -> Result<Self, ConfigError> {
        let vars = EnvVars { prefix };
        let mut config = Self::default();

        if let Some(max) = vars.parse::<u32>("MAX_REDIRECTS")? {
            config.max_redirects = max;
        }
        if let Some(follow) = vars.flag("FOLLOW_REDIRECTS")? {
            config.follow_redirects = follow;
        }
        if let Some(carry) = vars.flag("CARRY_COOKIES")? {
            config.carry_cookies = carry;
        }
        if let Some(secs) = vars.parse::<u64>("TIMEOUT_SECS")? {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = vars.parse::<u64>("CONNECT_TIMEOUT_SECS")? {
            config.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(user_agent) = vars.get("USER_AGENT") {
            config.user_agent = user_agent;
        }
        if let Some(base_url) = vars.get("BASE_URL") {
            config.base_url = Some(base_url);
        }

        Ok(config)
    }

    /// Redirect settings for the redirect decorator.
    pub fn redirect_config(&self) -> RedirectConfig {
        RedirectConfig {
            max_redirects: self.max_redirects,
            carry_cookies: self.carry_cookies,
        }
    }
}

struct EnvVars<'a> {
    prefix: &'a str,
}

impl EnvVars<'_> {
    fn key(&self, name: &str) -> String {
        format!("{}_{}", self.prefix, name)
    }

    fn get(&self, name: &str) -> Option<String> {
        env::var(self.key(name)).ok()
    }

    fn parse<T>(&self, name: &str) -> Result<Option<T>, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(name) {
            None => Ok(None),
            Some(value) => value
                .trim()
                .parse()
                .map(Some)
                .map_err(|e: T::Err| ConfigError::InvalidValue {
                    key: self.key(name),
                    value,
                    reason: e.to_string(),
                }),
        }
    }

    fn flag(&self, name: &str) -> Result<Option<bool>, ConfigError> {
        match self.get(name) {
            None => Ok(None),
            Some(value) => match value.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(Some(true)),
                "0" | "false" | "no" | "off" => Ok(Some(false)),
                _ => Err(ConfigError::InvalidValue {
                    key: self.key(name),
                    value,
                    reason: "expected a boolean".to_string(),
                }),
            },
        }
    }
}

/// Builder for HTTP client configuration.
#[derive(Debug, Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL for all requests.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the default request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the connection pool idle timeout.
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.pool_idle_timeout = timeout;
        self
    }

    /// Set the maximum idle connections per host.
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.config.pool_max_idle_per_host = max;
        self
    }

    /// Add a default header for all requests.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.push((name.into(), value.into()));
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Enable or disable gzip compression.
    pub fn gzip(mut self, enable: bool) -> Self {
        self.config.gzip = enable;
        self
    }

    /// Enable or disable brotli compression.
    pub fn brotli(mut self, enable: bool) -> Self {
        self.config.brotli = enable;
        self
    }

    /// Enable or disable following redirects.
    pub fn follow_redirects(mut self, enable: bool) -> Self {
        self.config.follow_redirects = enable;
        self
    }

    /// Set the maximum number of redirects to follow.
    pub fn max_redirects(mut self, max: u32) -> Self {
        self.config.max_redirects = max;
        self
    }

    /// Enable or disable cookie carry-over between redirect hops.
    pub fn carry_cookies(mut self, enable: bool) -> Self {
        self.config.carry_cookies = enable;
        self
    }

    /// Enable or disable request logging.
    pub fn log_requests(mut self, enable: bool) -> Self {
        self.config.log_requests = enable;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}
