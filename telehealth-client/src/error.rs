use std::result;

use crate::retry::RetryableError;
use thiserror::Error;

/// Error types for telehealth client operations
#[derive(Error, Debug)]
pub enum TelehealthError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    /// XML parsing failed
    #[error("XML parsing failed: {0}")]
    XmlError(String),

    /// CSV reading or writing failed
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// IO error for file operations
    #[error("IO error: {message}")]
    IoError { message: String },

    /// Requested article is missing from the EFetch response
    #[error("Article not found: PMID {pmid}")]
    ArticleNotFound { pmid: String },

    /// Invalid PMID format
    #[error("Invalid PMID format: {pmid}")]
    InvalidPmid { pmid: String },

    /// Invalid PMC ID format
    #[error("Invalid PMC ID format: {pmcid}")]
    InvalidPmcid { pmcid: String },

    /// API rate limit exceeded
    #[error("API rate limit exceeded")]
    RateLimitExceeded,

    /// Generic API error with HTTP status code
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    /// Search limit exceeded
    /// This error is returned when a search query requests more results than the maximum retrievable limit.
    #[error("Search limit exceeded: requested {requested}, maximum is {maximum}")]
    SearchLimitExceeded { requested: usize, maximum: usize },

    /// No open-access PDF could be located for the article
    #[error("No open access PDF available for {id}")]
    PdfNotAvailable { id: String },

    /// File exists but does not carry a PDF signature
    #[error("Not a PDF file: {path}")]
    InvalidPdf { path: String },

    /// The PDF could not be turned into text
    #[error("Failed to extract text from {path}: {message}")]
    PdfExtraction { path: String, message: String },

    /// The language model answered with something unusable
    #[error("LLM response error: {0}")]
    LlmResponse(String),

    /// Unrecoverable configuration problem (missing API key, zero chunk size, ...)
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = result::Result<T, TelehealthError>;

impl From<std::io::Error> for TelehealthError {
    fn from(err: std::io::Error) -> Self {
        TelehealthError::IoError {
            message: err.to_string(),
        }
    }
}

impl RetryableError for TelehealthError {
    fn is_retryable(&self) -> bool {
        match self {
            // Network errors are typically transient
            TelehealthError::RequestError(err) => {
                if err.is_timeout() || err.is_connect() {
                    return true;
                }

                // Check for server errors (5xx)
                if let Some(status) = err.status() {
                    return status.is_server_error() || status.as_u16() == 429;
                }

                // DNS and other network errors
                !err.is_builder() && !err.is_redirect() && !err.is_decode()
            }

            // Rate limiting should be retried after delay
            TelehealthError::RateLimitExceeded => true,

            // Server errors (5xx) and rate limiting (429) are retryable
            TelehealthError::ApiError { status, message } => {
                (*status >= 500 && *status < 600) || *status == 429 || {
                    let lower_msg = message.to_lowercase();
                    lower_msg.contains("temporarily unavailable")
                        || lower_msg.contains("timeout")
                        || lower_msg.contains("connection")
                }
            }

            TelehealthError::JsonError(_)
            | TelehealthError::XmlError(_)
            | TelehealthError::CsvError(_)
            | TelehealthError::IoError { .. }
            | TelehealthError::ArticleNotFound { .. }
            | TelehealthError::InvalidPmid { .. }
            | TelehealthError::InvalidPmcid { .. }
            | TelehealthError::SearchLimitExceeded { .. }
            | TelehealthError::PdfNotAvailable { .. }
            | TelehealthError::InvalidPdf { .. }
            | TelehealthError::PdfExtraction { .. }
            | TelehealthError::LlmResponse(_)
            | TelehealthError::Config(_) => false,
        }
    }

    fn retry_reason(&self) -> &str {
        if self.is_retryable() {
            match self {
                TelehealthError::RequestError(err) if err.is_timeout() => "Request timeout",
                TelehealthError::RequestError(err) if err.is_connect() => "Connection error",
                TelehealthError::RequestError(_) => "Network error",
                TelehealthError::RateLimitExceeded => "Rate limit exceeded",
                TelehealthError::ApiError { status, .. } => match status {
                    429 => "Rate limit exceeded",
                    500..=599 => "Server error",
                    _ => "Temporary API error",
                },
                _ => "Transient error",
            }
        } else {
            match self {
                TelehealthError::JsonError(_) => "Invalid JSON response",
                TelehealthError::XmlError(_) => "Invalid XML response",
                TelehealthError::CsvError(_) | TelehealthError::IoError { .. } => {
                    "File system error"
                }
                TelehealthError::InvalidPmid { .. } | TelehealthError::InvalidPmcid { .. } => {
                    "Invalid input"
                }
                TelehealthError::ArticleNotFound { .. }
                | TelehealthError::PdfNotAvailable { .. } => "Content not available",
                TelehealthError::InvalidPdf { .. } | TelehealthError::PdfExtraction { .. } => {
                    "Unreadable PDF"
                }
                TelehealthError::LlmResponse(_) => "Invalid LLM response",
                TelehealthError::Config(_) => "Configuration error",
                _ => "Non-transient error",
            }
        }
    }
}
