//! # Telehealth Client
//!
//! Collects telehealth literature from PubMed and classifies the telehealth
//! utilization measures it reports.
//!
//! ## Features
//!
//! - **PubMed Search**: ESearch/EFetch metadata with NCBI rate limiting and retries
//! - **Open Access PDFs**: PMC OA service lookup and streaming downloads
//! - **Rule Classifier**: keyword and regex detection of Binary, Count, Rate and
//!   Percentage measures, plus study design and data source heuristics
//! - **LLM Classifier**: the same classification through a chat-completions API
//! - **CSV Outputs**: fixed-header records for metadata, measures and summaries
//!
//! ## Quick Start
//!
//! ### Downloading Articles
//!
//! ```no_run
//! use telehealth_client::{Client, ClientConfig};
//! use telehealth_client::pipeline::{DownloadOptions, download_articles};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::with_config(ClientConfig::new().with_email("you@example.org"))?;
//!
//!     let options = DownloadOptions::new()
//!         .with_search_term("telehealth utilization measures")
//!         .with_num_articles(20);
//!     let outcome = download_articles(&client.pubmed, &client.pmc, &options, &()).await?;
//!
//!     println!("{} articles, {} PDFs", outcome.records.len(), outcome.pdf_count());
//!     Ok(())
//! }
//! ```
//!
//! ### Classifying Text
//!
//! ```
//! use telehealth_client::MeasureCategory;
//!
//! let category = MeasureCategory::classify("45% of visits were conducted by video");
//! assert_eq!(category, Some(MeasureCategory::Percentage));
//! ```

pub mod analysis;
pub mod common;
pub mod config;
pub mod error;
mod http;
pub mod llm;
pub mod pdf;
pub mod pipeline;
pub mod pmc;
pub mod pubmed;
pub mod rate_limit;
pub mod records;
pub mod retry;

// Re-export main types for convenience
pub use analysis::MeasureCategory;
pub use config::ClientConfig;
pub use error::{Result, TelehealthError};
pub use llm::{LlmClient, LlmConfig};
pub use pipeline::{BatchReport, MeasureExtractor, RuleExtractor, SkippedItem};
pub use pmc::{PdfLink, PmcClient};
pub use pubmed::{PubMedArticle, PubMedClient, SortOrder};
pub use rate_limit::RateLimiter;
pub use records::{ArticleRecord, CategoryCount, ExtractionMethod, MeasureRecord, StudyProfile};
pub use retry::RetryConfig;

/// PubMed and PMC clients sharing one configuration and one rate limiter
#[derive(Clone)]
pub struct Client {
    /// PubMed client for search and metadata
    pub pubmed: PubMedClient,
    /// PMC client for open-access PDFs
    pub pmc: PmcClient,
}

impl Client {
    /// Create a combined client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::new())
    }

    /// Create a combined client
    ///
    /// Both clients draw from the same token bucket, so NCBI sees at most
    /// the configured request rate.
    ///
    /// # Example
    ///
    /// ```
    /// use telehealth_client::{Client, ClientConfig};
    ///
    /// let client = Client::with_config(ClientConfig::new().with_api_key("key"))?;
    /// assert_eq!(client.pubmed.rate_limiter().rate(), 10.0);
    /// # Ok::<(), telehealth_client::TelehealthError>(())
    /// ```
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let pubmed = PubMedClient::with_config(config.clone())?;
        let pmc = PmcClient::with_config(config)?.with_rate_limiter(pubmed.rate_limiter().clone());

        Ok(Self { pubmed, pmc })
    }
}
