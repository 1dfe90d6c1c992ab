//! Chat-completions payloads and parsing of the model's JSON answer

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::analysis::MeasureCategory;
use crate::error::{Result, TelehealthError};

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
}

/// Entries stay untyped so one malformed measure cannot reject the answer
#[derive(Debug, Deserialize)]
struct RawAnswer {
    measures: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct RawMeasure {
    description: Option<String>,
    category: Option<String>,
    #[serde(default)]
    value: Value,
}

/// One measure reported by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmMeasure {
    pub description: String,
    pub category: MeasureCategory,
    pub value: String,
}

fn value_to_string(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

/// Parse the `{"measures": [...]}` answer of the model
///
/// Categories are matched case-insensitively; measures with any other
/// category, a null field of the wrong type or no description are dropped
/// with a warning. A null or missing `measures` list means no measures. Numeric
/// and string values are both accepted.
pub fn parse_measures(content: &str) -> Result<Vec<LlmMeasure>> {
    let answer: RawAnswer = serde_json::from_str(content.trim()).map_err(|e| {
        TelehealthError::LlmResponse(format!("answer is not the expected JSON object: {e}"))
    })?;

    let measures = answer
        .measures
        .unwrap_or_default()
        .into_iter()
        .filter_map(|entry| {
            let raw: RawMeasure = match serde_json::from_value(entry) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(error = %e, "Dropping malformed measure");
                    return None;
                }
            };

            let description = raw.description.unwrap_or_default().trim().to_string();
            if description.is_empty() {
                warn!("Dropping measure without description");
                return None;
            }
            let category = raw.category.unwrap_or_default();
            match category.parse::<MeasureCategory>() {
                Ok(category) => Some(LlmMeasure {
                    description,
                    category,
                    value: value_to_string(raw.value),
                }),
                Err(_) => {
                    warn!(category = %category, description = %description, "Dropping measure with unknown category");
                    None
                }
            }
        })
        .collect();

    Ok(measures)
}

/// Content of the first choice of a chat-completions body
pub(crate) fn first_choice_content(response: ChatCompletionResponse) -> Result<String> {
    if let Some(error) = response.error {
        return Err(TelehealthError::LlmResponse(format!(
            "API returned an error: {}",
            error.message
        )));
    }

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| TelehealthError::LlmResponse("response has no message content".to_string()))
}
