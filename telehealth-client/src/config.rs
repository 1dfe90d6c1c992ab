//! Client configuration for NCBI E-utilities and the PMC OA service

use std::time::Duration;

use crate::rate_limit::RateLimiter;
use crate::retry::RetryConfig;

/// Default E-utilities endpoint
pub const DEFAULT_EUTILS_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// Default PMC Open Access web service endpoint
pub const DEFAULT_OA_BASE_URL: &str = "https://www.ncbi.nlm.nih.gov/pmc/utils/oa/oa.fcgi";

const DEFAULT_TOOL: &str = "telehealth-client";

/// Configuration shared by [`PubMedClient`](crate::PubMedClient) and
/// [`PmcClient`](crate::PmcClient)
///
/// # Example
///
/// ```
/// use telehealth_client::ClientConfig;
///
/// let config = ClientConfig::new()
///     .with_email("researcher@university.edu")
///     .with_tool("telehealth-downloader");
///
/// assert_eq!(config.effective_rate_limit(), 3.0);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// NCBI API key (raises the rate limit to 10 requests/second)
    pub api_key: Option<String>,
    /// Contact email sent with every request
    pub email: Option<String>,
    /// Tool name sent with every request
    pub tool: Option<String>,
    /// Requests per second; overrides the key-dependent default
    pub rate_limit: Option<f64>,
    /// E-utilities base URL
    pub base_url: Option<String>,
    /// PMC OA web service URL
    pub oa_base_url: Option<String>,
    /// HTTP timeout per request
    pub timeout: Duration,
    /// Custom User-Agent header
    pub user_agent: Option<String>,
    /// Retry policy for transient failures
    pub retry_config: RetryConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            email: None,
            tool: None,
            rate_limit: None,
            base_url: None,
            oa_base_url: None,
            timeout: Duration::from_secs(30),
            user_agent: None,
            retry_config: RetryConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_email<S: Into<String>>(mut self, email: S) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_tool<S: Into<String>>(mut self, tool: S) -> Self {
        self.tool = Some(tool.into());
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: f64) -> Self {
        self.rate_limit = Some(rate_limit);
        self
    }

    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_oa_base_url<S: Into<String>>(mut self, oa_base_url: S) -> Self {
        self.oa_base_url = Some(oa_base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_timeout_seconds(self, seconds: u64) -> Self {
        self.with_timeout(Duration::from_secs(seconds))
    }

    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// Requests per second: explicit value, else 10 with an API key, else 3
    pub fn effective_rate_limit(&self) -> f64 {
        self.rate_limit.unwrap_or(if self.api_key.is_some() {
            10.0
        } else {
            3.0
        })
    }

    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_EUTILS_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn effective_oa_base_url(&self) -> &str {
        self.oa_base_url.as_deref().unwrap_or(DEFAULT_OA_BASE_URL)
    }

    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("telehealth-client/{}", env!("CARGO_PKG_VERSION")))
    }

    pub fn effective_tool(&self) -> &str {
        self.tool.as_deref().unwrap_or(DEFAULT_TOOL)
    }

    /// `api_key`, `email` and `tool` query parameters for E-utilities requests
    pub fn build_api_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if let Some(api_key) = &self.api_key {
            params.push(("api_key".to_string(), api_key.clone()));
        }
        if let Some(email) = &self.email {
            params.push(("email".to_string(), email.clone()));
        }
        params.push(("tool".to_string(), self.effective_tool().to_string()));

        params
    }

    pub fn create_rate_limiter(&self) -> RateLimiter {
        RateLimiter::new(self.effective_rate_limit())
    }
}
