//! Configuration management for the Webex client.
//!
//! Supports configuration via:
//! - Explicit values
//! - An injected environment lookup (`from_lookup`) or the process
//!   environment (`from_env`)
//! - Builder pattern
//!
//! Every argument is validated as it is set, so a built [`WebexConfig`]
//! never carries a malformed base URL, timeout or proxy.

use crate::auth::{CredentialSources, OAuthCredentials, OAuthParameters};
use crate::errors::{ConfigurationError, WebexResult};
use secrecy::SecretString;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Environment variable holding the default access token
pub const ACCESS_TOKEN_ENV: &str = "WEBEX_TEAMS_ACCESS_TOKEN";

/// Environment variable overriding the base URL
pub const BASE_URL_ENV: &str = "WEBEX_TEAMS_BASE_URL";

/// Environment variable overriding the single request timeout (seconds)
pub const SINGLE_REQUEST_TIMEOUT_ENV: &str = "WEBEX_TEAMS_SINGLE_REQUEST_TIMEOUT";

/// Environment variable overriding the wait-on-rate-limit flag
pub const WAIT_ON_RATE_LIMIT_ENV: &str = "WEBEX_TEAMS_WAIT_ON_RATE_LIMIT";

/// URL scheme a proxy applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProxyScheme {
    /// Plain HTTP requests
    Http,
    /// HTTPS requests
    Https,
    /// Every request
    All,
}

impl ProxyScheme {
    /// The mapping key for this scheme
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyScheme::Http => "http",
            ProxyScheme::Https => "https",
            ProxyScheme::All => "all",
        }
    }
}

impl FromStr for ProxyScheme {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(ProxyScheme::Http),
            "https" => Ok(ProxyScheme::Https),
            "all" => Ok(ProxyScheme::All),
            other => Err(ConfigurationError::invalid(
                "proxies",
                format!("unsupported proxy scheme '{}', expected http, https or all", other),
            )),
        }
    }
}

impl fmt::Display for ProxyScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings shared by every request made through a client.
///
/// Immutable once the client is constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    base_url: Url,
    single_request_timeout: u64,
    wait_on_rate_limit: bool,
    max_rate_limit_waits: Option<u32>,
    proxies: BTreeMap<ProxyScheme, Url>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            single_request_timeout: crate::DEFAULT_SINGLE_REQUEST_TIMEOUT,
            wait_on_rate_limit: crate::DEFAULT_WAIT_ON_RATE_LIMIT,
            max_rate_limit_waits: None,
            proxies: BTreeMap::new(),
        }
    }
}

impl SessionConfig {
    /// Base URL prefixed to every endpoint
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Timeout in seconds for a single HTTP request
    pub fn single_request_timeout(&self) -> u64 {
        self.single_request_timeout
    }

    /// The single request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.single_request_timeout)
    }

    /// Whether requests wait out HTTP 429 responses
    pub fn wait_on_rate_limit(&self) -> bool {
        self.wait_on_rate_limit
    }

    /// How many 429 responses one request may wait out before the rate
    /// limit is returned as an error. `None` waits indefinitely.
    pub fn max_rate_limit_waits(&self) -> Option<u32> {
        self.max_rate_limit_waits
    }

    /// Configured proxies keyed by scheme
    pub fn proxies(&self) -> &BTreeMap<ProxyScheme, Url> {
        &self.proxies
    }

    /// Build the full URL for an endpoint
    pub fn build_url(&self, endpoint: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = endpoint.trim_start_matches('/');
        format!("{}/{}", base, path)
    }
}

fn default_base_url() -> Url {
    Url::parse(crate::DEFAULT_BASE_URL).expect("DEFAULT_BASE_URL is a valid URL")
}

/// Configuration for the Webex client: credential sources plus the
/// session settings.
#[derive(Clone, Default)]
pub struct WebexConfig {
    pub(crate) credentials: CredentialSources,
    pub(crate) session: SessionConfig,
}

impl fmt::Debug for WebexConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebexConfig")
            .field("credentials", &self.credentials)
            .field("session", &self.session)
            .finish()
    }
}

impl WebexConfig {
    /// Create a new configuration builder
    pub fn builder() -> WebexConfigBuilder {
        WebexConfigBuilder::new()
    }

    /// Create configuration from the process environment
    pub fn from_env() -> WebexResult<Self> {
        Ok(WebexConfigBuilder::from_env()?.build())
    }

    /// Credential sources, in their unresolved form
    pub fn credentials(&self) -> &CredentialSources {
        &self.credentials
    }

    /// Session settings
    pub fn session(&self) -> &SessionConfig {
        &self.session
    }
}

/// Builder for [`WebexConfig`]
#[derive(Default)]
pub struct WebexConfigBuilder {
    config: WebexConfig,
}

impl WebexConfigBuilder {
    /// Create a new builder with default session settings and no credentials
    pub fn new() -> Self {
        Self {
            config: WebexConfig::default(),
        }
    }

    /// Create a builder seeded from the process environment
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create a builder seeded through an environment lookup function.
    ///
    /// The token found under [`ACCESS_TOKEN_ENV`] becomes the environment
    /// token, which ranks below an explicit access token. Empty or
    /// whitespace-only values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut builder = Self::new();

        if let Some(token) = read(ACCESS_TOKEN_ENV) {
            builder = builder.environment_token(&token);
        }

        if let Some(url) = read(BASE_URL_ENV) {
            builder = builder.base_url(&url)?;
        }

        if let Some(timeout) = read(SINGLE_REQUEST_TIMEOUT_ENV) {
            let secs = timeout.trim().parse::<u64>().map_err(|_| {
                ConfigurationError::invalid(
                    "single_request_timeout",
                    format!("'{}' is not a positive integer", timeout),
                )
            })?;
            builder = builder.single_request_timeout(secs)?;
        }

        if let Some(flag) = read(WAIT_ON_RATE_LIMIT_ENV) {
            builder = builder.wait_on_rate_limit(parse_flag(&flag)?);
        }

        Ok(builder)
    }

    /// Set the explicit access token. Empty strings count as absent.
    pub fn access_token(mut self, token: &str) -> Self {
        self.config.credentials.access_token = non_empty_secret(token);
        self
    }

    /// Set the token obtained from the environment. Empty strings count as
    /// absent.
    pub fn environment_token(mut self, token: &str) -> Self {
        self.config.credentials.environment_token = non_empty_secret(token);
        self
    }

    /// Set the OAuth parameters as one composite value
    pub fn oauth(mut self, credentials: OAuthCredentials) -> Self {
        self.config.credentials.oauth = Some(OAuthParameters::Complete(credentials));
        self
    }

    /// Set the OAuth parameters from four independently optional parts.
    ///
    /// An all-absent set clears OAuth. A partial set is recorded as
    /// incomplete and only reported if resolution gets as far as the OAuth
    /// step.
    pub fn oauth_parts(
        mut self,
        client_id: Option<&str>,
        client_secret: Option<&str>,
        oauth_code: Option<&str>,
        redirect_uri: Option<&str>,
    ) -> Result<Self, ConfigurationError> {
        self.config.credentials.oauth =
            OAuthParameters::from_parts(client_id, client_secret, oauth_code, redirect_uri)?;
        Ok(self)
    }

    /// Set the base URL
    pub fn base_url(mut self, url: &str) -> Result<Self, ConfigurationError> {
        let parsed = Url::parse(url)
            .map_err(|e| ConfigurationError::invalid("base_url", format!("invalid URL: {}", e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigurationError::invalid(
                "base_url",
                format!("unsupported scheme '{}'", parsed.scheme()),
            ));
        }
        self.config.session.base_url = parsed;
        Ok(self)
    }

    /// Set the single request timeout in seconds. Must be positive.
    pub fn single_request_timeout(mut self, secs: u64) -> Result<Self, ConfigurationError> {
        if secs == 0 {
            return Err(ConfigurationError::invalid(
                "single_request_timeout",
                "must be a positive number of seconds",
            ));
        }
        self.config.session.single_request_timeout = secs;
        Ok(self)
    }

    /// Enable or disable waiting out rate limits
    pub fn wait_on_rate_limit(mut self, wait: bool) -> Self {
        self.config.session.wait_on_rate_limit = wait;
        self
    }

    /// Cap the number of rate-limit waits per request. Only applies while
    /// `wait_on_rate_limit` is enabled.
    pub fn max_rate_limit_waits(mut self, waits: u32) -> Self {
        self.config.session.max_rate_limit_waits = Some(waits);
        self
    }

    /// Add a proxy for a scheme (`http`, `https` or `all`)
    pub fn proxy(mut self, scheme: &str, url: &str) -> Result<Self, ConfigurationError> {
        let scheme = scheme.parse::<ProxyScheme>()?;
        let url = Url::parse(url).map_err(|e| {
            ConfigurationError::invalid("proxies", format!("invalid {} proxy URL: {}", scheme, e))
        })?;
        self.config.session.proxies.insert(scheme, url);
        Ok(self)
    }

    /// Add every proxy in a scheme-to-URL mapping
    pub fn proxies<I, K, V>(self, proxies: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        proxies
            .into_iter()
            .try_fold(self, |builder, (scheme, url)| {
                builder.proxy(scheme.as_ref(), url.as_ref())
            })
    }

    /// Build the configuration
    pub fn build(self) -> WebexConfig {
        self.config
    }
}

fn non_empty_secret(value: &str) -> Option<SecretString> {
    if value.is_empty() {
        None
    } else {
        Some(SecretString::new(value.to_string()))
    }
}

fn parse_flag(value: &str) -> Result<bool, ConfigurationError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigurationError::invalid(
            "wait_on_rate_limit",
            format!("'{}' is not a boolean", other),
        )),
    }
}
