//! Client configuration for talking to an Okta org.
//!
//! A [`ClientConfig`] is assembled with [`ClientConfigBuilder`] or read from the
//! environment with [`ClientConfig::from_env`]. Either way it is validated once,
//! when it is built, so the HTTP client never sees a half-formed configuration.
//!
//! # Example
//!
//! ```rust
//! use okta_provider::config::ClientConfig;
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::builder()
//!     .org_name("dev-123456")
//!     .api_token("00abc")
//!     .request_timeout(Duration::from_secs(10))
//!     .page_limit(100)
//!     .build()?;
//!
//! assert_eq!(config.endpoint().as_str(), "https://dev-123456.okta.com/");
//! assert_eq!(config.page_limit(), 100);
//! # Ok(())
//! # }
//! ```

use crate::error::{ConfigError, ConfigResult};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Default Okta domain appended to the org name.
pub const DEFAULT_BASE_URL: &str = "okta.com";

/// Default request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of members requested per page.
pub const DEFAULT_PAGE_LIMIT: u32 = 200;

/// Largest page Okta will serve for group member listings.
pub const MAX_PAGE_LIMIT: u32 = 1000;

const ENV_ORG_NAME: &str = "OKTA_ORG_NAME";
const ENV_BASE_URL: &str = "OKTA_BASE_URL";
const ENV_API_TOKEN: &str = "OKTA_API_TOKEN";
const ENV_HTTP_ENDPOINT: &str = "OKTA_HTTP_ENDPOINT";
const ENV_REQUEST_TIMEOUT: &str = "OKTA_REQUEST_TIMEOUT";

/// Validated settings for [`OktaClient`](crate::client::OktaClient).
#[derive(Clone)]
pub struct ClientConfig {
    endpoint: Url,
    api_token: String,
    request_timeout: Duration,
    page_limit: u32,
    user_agent: String,
}

impl ClientConfig {
    /// Start building a configuration.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Read configuration from `OKTA_*` environment variables.
    ///
    /// `OKTA_HTTP_ENDPOINT` overrides the URL derived from `OKTA_ORG_NAME` and
    /// `OKTA_BASE_URL`. `OKTA_REQUEST_TIMEOUT` is given in whole seconds.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let mut builder = ClientConfigBuilder::new();
        if let Some(org_name) = present(ENV_ORG_NAME) {
            builder = builder.org_name(org_name);
        }
        if let Some(base_url) = present(ENV_BASE_URL) {
            builder = builder.base_url(base_url);
        }
        if let Some(endpoint) = present(ENV_HTTP_ENDPOINT) {
            builder = builder.endpoint(endpoint);
        }
        if let Some(token) = present(ENV_API_TOKEN) {
            builder = builder.api_token(token);
        }
        if let Some(raw) = present(ENV_REQUEST_TIMEOUT) {
            let seconds: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnvironment {
                    name: ENV_REQUEST_TIMEOUT.to_string(),
                    reason: format!("expected a number of seconds, got '{}'", raw),
                })?;
            builder = builder.request_timeout(Duration::from_secs(seconds));
        }
        builder.build()
    }

    /// Root URL of the org, always ending in `/`.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The `SSWS` API token.
    pub fn api_token(&self) -> &str {
        &self.api_token
    }

    /// Upper bound for a single HTTP request.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Members requested per listing page.
    pub fn page_limit(&self) -> u32 {
        self.page_limit
    }

    /// `User-Agent` sent with every request.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_token", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .field("page_limit", &self.page_limit)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Builder for [`ClientConfig`].
///
/// Either `org_name` or `endpoint` must be set. When both are present the
/// explicit endpoint wins.
#[derive(Default)]
pub struct ClientConfigBuilder {
    org_name: Option<String>,
    base_url: Option<String>,
    endpoint: Option<String>,
    api_token: Option<String>,
    request_timeout: Option<Duration>,
    page_limit: Option<u32>,
    user_agent: Option<String>,
}

impl ClientConfigBuilder {
    /// Create an empty builder; same as [`ClientConfig::builder`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Org subdomain, e.g. `dev-123456`.
    pub fn org_name(mut self, org_name: impl Into<String>) -> Self {
        self.org_name = Some(org_name.into());
        self
    }

    /// Okta domain, e.g. `oktapreview.com`. Defaults to `okta.com`.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Full org URL, overriding `org_name` and `base_url`.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// API token, without the `SSWS` prefix. Surrounding whitespace is ignored.
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Per-request timeout. Defaults to [`DEFAULT_REQUEST_TIMEOUT`].
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Members requested per page, between 1 and [`MAX_PAGE_LIMIT`].
    pub fn page_limit(mut self, limit: u32) -> Self {
        self.page_limit = Some(limit);
        self
    }

    /// Override the default `okta-provider/<version>` user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Validate and produce the configuration.
    ///
    /// # Returns
    ///
    /// * `Ok(ClientConfig)` - If every setting is valid
    /// * `Err(ConfigError)` - If the token is blank, neither an org name nor an
    ///   endpoint was given, the endpoint is not an http(s) URL, or the page
    ///   limit is out of range
    ///
    /// # Examples
    ///
    /// ```rust
    /// use okta_provider::ClientConfig;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = ClientConfig::builder()
    ///     .org_name("dev-123456")
    ///     .api_token("00abc")
    ///     .build()?;
    /// assert_eq!(config.endpoint().as_str(), "https://dev-123456.okta.com/");
    ///
    /// assert!(ClientConfig::builder().org_name("dev-123456").build().is_err());
    /// # Ok(())
    /// # }
    /// ```
    pub fn build(self) -> ConfigResult<ClientConfig> {
        let api_token = self
            .api_token
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::MissingApiToken)?;

        let raw_endpoint = match (self.endpoint, self.org_name) {
            (Some(endpoint), _) => endpoint,
            (None, Some(org_name)) => {
                let base_url = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
                format!("https://{}.{}", org_name.trim(), base_url.trim())
            }
            (None, None) => return Err(ConfigError::MissingEndpoint),
        };
        let endpoint = parse_endpoint(&raw_endpoint)?;

        let page_limit = self.page_limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if page_limit == 0 || page_limit > MAX_PAGE_LIMIT {
            return Err(ConfigError::InvalidPageLimit {
                limit: page_limit,
                max: MAX_PAGE_LIMIT,
            });
        }

        Ok(ClientConfig {
            endpoint,
            api_token,
            request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            page_limit,
            user_agent: self.user_agent.unwrap_or_else(|| {
                format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
            }),
        })
    }
}

fn parse_endpoint(raw: &str) -> ConfigResult<Url> {
    let invalid = |reason: String| ConfigError::InvalidEndpoint {
        url: raw.to_string(),
        reason,
    };

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("must not carry a query or fragment".to_string()));
    }

    // Request paths are joined onto the endpoint, which needs a trailing slash.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
