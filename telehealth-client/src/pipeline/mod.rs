//! Batch jobs: download, analyze and combine
//!
//! Every job walks its items one at a time. A failing item is logged and
//! recorded in the [`BatchReport`]; only configuration problems abort a job.

pub mod analyze;
pub mod combine;
pub mod download;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analysis::extract_measures;
use crate::error::{Result, TelehealthError};
use crate::llm::LlmClient;
use crate::records::{ExtractionMethod, MeasureRecord};

pub use analyze::{AnalysisOutcome, AnalyzeInput, AnalyzeOptions, analyze_articles};
pub use combine::{CombineSummary, combine_measures};
pub use download::{DownloadOptions, DownloadOutcome, build_article_record, download_articles};

/// An item a batch could not fully process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedItem {
    pub id: String,
    pub reason: String,
}

/// Outcome counters of one batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub processed: usize,
    pub skipped: Vec<SkippedItem>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self) {
        self.processed += 1;
    }

    /// Log the failure and remember it
    pub fn record_skip<I: Into<String>, R: Into<String>>(&mut self, id: I, reason: R) {
        let item = SkippedItem {
            id: id.into(),
            reason: reason.into(),
        };
        warn!(id = %item.id, reason = %item.reason, "Skipping item");
        self.skipped.push(item);
    }

    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Hooks a caller can use to follow a batch
///
/// All methods default to doing nothing, so `&()` is a valid observer.
pub trait BatchProgress: Send + Sync {
    fn start(&self, _total: usize) {}
    fn item_started(&self, _id: &str) {}
    fn item_finished(&self, _id: &str) {}
    fn finish(&self) {}
}

impl BatchProgress for () {}

/// Turns the text chunks of one article into measures
#[async_trait]
pub trait MeasureExtractor: Send + Sync {
    fn method(&self) -> ExtractionMethod;

    async fn extract(&self, article_id: &str, chunks: &[String]) -> Result<Vec<MeasureRecord>>;
}

/// Keyword and regex classifier
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleExtractor;

#[async_trait]
impl MeasureExtractor for RuleExtractor {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Rules
    }

    async fn extract(&self, article_id: &str, chunks: &[String]) -> Result<Vec<MeasureRecord>> {
        Ok(extract_measures(article_id, chunks))
    }
}

#[async_trait]
impl MeasureExtractor for LlmClient {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Llm
    }

    /// A failing chunk is logged and skipped; the article fails only when
    /// every chunk failed.
    async fn extract(&self, article_id: &str, chunks: &[String]) -> Result<Vec<MeasureRecord>> {
        let mut records = Vec::new();
        let mut last_error: Option<TelehealthError> = None;
        let mut succeeded = 0usize;

        for (index, chunk) in chunks.iter().enumerate() {
            match self.classify_chunk(chunk).await {
                Ok(measures) => {
                    succeeded += 1;
                    debug!(article_id, chunk = index, count = measures.len(), "Chunk analyzed");
                    records.extend(measures.into_iter().map(|m| MeasureRecord {
                        article_id: article_id.to_string(),
                        measure: m.description,
                        category: m.category,
                        value: m.value,
                        context: String::new(),
                        method: ExtractionMethod::Llm,
                    }));
                }
                Err(e) => {
                    warn!(article_id, chunk = index, error = %e, "LLM analysis of chunk failed");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if succeeded == 0 => Err(e),
            _ => Ok(records),
        }
    }
}
