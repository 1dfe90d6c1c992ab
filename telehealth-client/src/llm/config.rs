use std::time::Duration;

use crate::retry::RetryConfig;

/// Default chat-completions endpoint root
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model
pub const DEFAULT_LLM_MODEL: &str = "gpt-3.5-turbo";

/// Configuration of the chat-completions client
///
/// # Example
///
/// ```
/// use telehealth_client::llm::LlmConfig;
///
/// let config = LlmConfig::new("sk-test").with_model("gpt-4o-mini");
/// assert_eq!(config.model, "gpt-4o-mini");
/// assert_eq!(config.max_tokens, 1000);
/// ```
#[derive(Clone)]
pub struct LlmConfig {
    /// Bearer token; must be non-empty
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub retry_config: RetryConfig,
}

impl LlmConfig {
    pub fn new<S: Into<String>>(api_key: S) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_LLM_MODEL.to_string(),
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            temperature: 0.3,
            max_tokens: 1000,
            timeout: Duration::from_secs(60),
            retry_config: RetryConfig::default(),
        }
    }

    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// `<base_url>/chat/completions`
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

// Keeps the key out of logs
impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}
