use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use telehealth_client::SortOrder;
use telehealth_client::pipeline::{DownloadOptions, download_articles};
use tracing::info;

use super::{ProgressReporter, create_client, report_failures};

#[derive(Args, Debug)]
pub struct Download {
    /// PubMed search term
    #[arg(long, default_value = "telehealth utilization measures")]
    pub search_term: String,

    /// Maximum number of articles to download
    #[arg(short, long, default_value = "20")]
    pub num_articles: usize,

    /// Directory for downloaded PDFs
    #[arg(short, long, default_value = "articles")]
    pub output_dir: PathBuf,

    /// Metadata CSV file
    #[arg(long, default_value = "data/article_metadata.csv")]
    pub csv_path: PathBuf,

    /// Sort order (relevance, pub_date, author, journal)
    #[arg(long, default_value = "relevance", value_parser = parse_sort)]
    pub sort: SortOrder,

    /// Only save metadata, do not look for PDFs
    #[arg(long)]
    pub skip_pdf: bool,

    /// Download PDFs again even if the file exists
    #[arg(long)]
    pub overwrite: bool,

    /// Path to save articles whose PDF could not be downloaded (if not specified, failures are logged only)
    #[arg(short, long)]
    pub failed_output: Option<PathBuf>,
}

fn parse_sort(value: &str) -> Result<SortOrder, String> {
    value.parse().map_err(|e: telehealth_client::TelehealthError| e.to_string())
}

impl Download {
    pub async fn execute_with_config(
        &self,
        api_key: Option<&str>,
        email: Option<&str>,
        tool: &str,
    ) -> Result<()> {
        let client = create_client(api_key, email, tool)?;

        let options = DownloadOptions::new()
            .with_search_term(self.search_term.clone())
            .with_num_articles(self.num_articles)
            .with_sort(Some(self.sort))
            .with_output_dir(self.output_dir.clone())
            .with_csv_path(self.csv_path.clone())
            .with_pdf_downloads(!self.skip_pdf)
            .with_overwrite(self.overwrite);

        info!(search_term = %self.search_term, limit = self.num_articles, "Downloading articles");

        let progress = ProgressReporter::new("Downloading articles")?;
        let outcome = download_articles(&client.pubmed, &client.pmc, &options, &progress)
            .await
            .context("Download failed")?;

        info!(
            articles = outcome.records.len(),
            pdfs = outcome.pdf_count(),
            path = %self.csv_path.display(),
            "Download finished"
        );

        report_failures(&outcome.report, self.failed_output.as_deref()).await;

        Ok(())
    }
}
