use std::path::PathBuf;

use anyhow::{Context as _, Result, anyhow};
use clap::Args;
use telehealth_client::RuleExtractor;
use telehealth_client::pipeline::{AnalyzeOptions, analyze_articles};
use tracing::info;

use super::{InputArgs, ProgressReporter, current_year, report_failures};

#[derive(Args, Debug)]
pub struct Analyze {
    #[command(flatten)]
    pub source: InputArgs,

    /// Measures CSV file
    #[arg(short, long, default_value = "data/telehealth_measures.csv")]
    pub output: PathBuf,

    /// Also write one study profile row per article to this CSV
    #[arg(long)]
    pub study_output: Option<PathBuf>,

    /// Maximum characters per text chunk
    #[arg(long, default_value = "4000")]
    pub chunk_size: usize,

    /// Path to save PDFs that could not be analyzed (if not specified, failures are logged only)
    #[arg(short, long)]
    pub failed_output: Option<PathBuf>,
}

impl Analyze {
    pub async fn execute(&self) -> Result<()> {
        let input = self
            .source
            .to_analyze_input()
            .ok_or_else(|| anyhow!("Either --input or --pdf-dir is required"))?;

        let options = AnalyzeOptions::new(input)
            .with_output(self.output.clone())
            .with_study_output(self.study_output.clone())
            .with_chunk_size(self.chunk_size)
            .with_reference_year(current_year());

        let progress = ProgressReporter::new("Analyzing articles")?;
        let outcome = analyze_articles(&RuleExtractor, &options, &progress)
            .await
            .context("Analysis failed")?;

        info!(
            articles = outcome.report.processed,
            measures = outcome.measures.len(),
            path = %self.output.display(),
            "Saved measures to CSV file"
        );

        report_failures(&outcome.report, self.failed_output.as_deref()).await;

        Ok(())
    }
}
