use reqwest::Client;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, TelehealthError};
use crate::http::is_transient_status;
use crate::llm::config::LlmConfig;
use crate::llm::response::{ChatCompletionResponse, LlmMeasure, first_choice_content, parse_measures};
use crate::retry::with_retry;

const SYSTEM_PROMPT: &str = "You are a healthcare research assistant specializing in telehealth.";

/// Build the user message for one text chunk
pub fn build_prompt(text: &str) -> String {
    format!(
        "Analyze the following text from a telehealth research article and extract any \
telehealth utilization measures mentioned.

Telehealth utilization measures are metrics that quantify how telehealth is being used, \
such as:
- Binary: whether telehealth was used (yes/no)
- Count: number of telehealth visits or sessions
- Rate: telehealth usage per patient, provider or period
- Percentage: share of visits conducted via telehealth

Text:
{text}

Format your response as a JSON object:
{{\"measures\": [{{\"description\": \"brief description of the measure\", \
\"category\": \"Binary|Count|Rate|Percentage\", \"value\": \"the reported value, if any\"}}]}}

If no measures are found, return {{\"measures\": []}}."
    )
}

/// Chat-completions client that classifies text chunks
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    config: LlmConfig,
}

impl LlmClient {
    /// Create a client
    ///
    /// Fails with [`TelehealthError::Config`] when the API key is empty.
    ///
    /// # Example
    ///
    /// ```
    /// use telehealth_client::llm::{LlmClient, LlmConfig};
    ///
    /// assert!(LlmClient::new(LlmConfig::new("")).is_err());
    /// assert!(LlmClient::new(LlmConfig::new("sk-test")).is_ok());
    /// ```
    pub fn new(config: LlmConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(TelehealthError::Config(
                "an API key for the language model is required".to_string(),
            ));
        }

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Ask the model for the telehealth measures of one chunk
    #[instrument(skip(self, text), fields(model = %self.config.model, chars = text.chars().count()))]
    pub async fn classify_chunk(&self, text: &str) -> Result<Vec<LlmMeasure>> {
        let payload = json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": build_prompt(text)}
            ],
            "response_format": {"type": "json_object"},
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
        });
        let url = self.config.completions_url();

        let response = with_retry(
            || async {
                debug!("Sending chat completion request to {}", url);
                let response = self
                    .client
                    .post(&url)
                    .bearer_auth(&self.config.api_key)
                    .json(&payload)
                    .send()
                    .await
                    .map_err(TelehealthError::from)?;

                let status = response.status();
                if is_transient_status(status) {
                    let message = response.text().await.unwrap_or_default();
                    return Err(TelehealthError::ApiError {
                        status: status.as_u16(),
                        message,
                    });
                }

                Ok(response)
            },
            &self.config.retry_config,
            "LLM request",
        )
        .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await?;
            warn!(status = status.as_u16(), "Chat completion request failed");
            return Err(TelehealthError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatCompletionResponse = response.json().await?;
        let content = first_choice_content(body)?;
        let measures = parse_measures(&content)?;

        info!(count = measures.len(), "Chunk classified");
        Ok(measures)
    }
}
