use std::path::PathBuf;

use anyhow::{Context as _, Result, anyhow};
use clap::Args;
use telehealth_client::llm::{DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MODEL, LlmClient, LlmConfig};
use telehealth_client::pipeline::{AnalyzeInput, AnalyzeOptions, analyze_articles};
use tracing::info;

use super::{ProgressReporter, current_year, report_failures};

#[derive(Args, Debug)]
pub struct AnalyzeLlm {
    /// Metadata CSV written by `download`; its pdf_path column is analyzed
    #[arg(long, conflicts_with_all = ["pdf_dir", "single_file"])]
    pub input: Option<PathBuf>,

    /// Directory of PDF files
    #[arg(long, conflicts_with = "single_file")]
    pub pdf_dir: Option<PathBuf>,

    /// A single PDF file
    #[arg(long)]
    pub single_file: Option<PathBuf>,

    /// Measures CSV file
    #[arg(short, long, default_value = "data/llm_measures.csv")]
    pub output: PathBuf,

    /// API key for the chat completions service
    #[arg(long = "llm-api-key", env = "OPENAI_API_KEY", hide_env_values = true)]
    pub llm_api_key: Option<String>,

    /// Base URL of an OpenAI compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_LLM_BASE_URL)]
    pub base_url: String,

    /// Model name
    #[arg(short, long, default_value = DEFAULT_LLM_MODEL)]
    pub model: String,

    /// Maximum characters per text chunk
    #[arg(long, default_value = "4000")]
    pub chunk_size: usize,

    /// Number of chunks per article sent to the model (0 sends all of them)
    #[arg(long, default_value = "1")]
    pub max_chunks: usize,

    /// Directory for per-article JSON and CSV results
    #[arg(long)]
    pub json_dir: Option<PathBuf>,

    /// Path to save PDFs that could not be analyzed (if not specified, failures are logged only)
    #[arg(short, long)]
    pub failed_output: Option<PathBuf>,
}

impl AnalyzeLlm {
    fn analyze_input(&self) -> Result<AnalyzeInput> {
        match (&self.input, &self.pdf_dir, &self.single_file) {
            (Some(csv), _, _) => Ok(AnalyzeInput::MetadataCsv(csv.clone())),
            (None, Some(dir), _) => Ok(AnalyzeInput::PdfDir(dir.clone())),
            (None, None, Some(file)) => Ok(AnalyzeInput::SingleFile(file.clone())),
            (None, None, None) => Err(anyhow!(
                "One of --input, --pdf-dir or --single-file is required"
            )),
        }
    }

    fn max_chunks(&self) -> Option<usize> {
        (self.max_chunks > 0).then_some(self.max_chunks)
    }

    pub async fn execute(&self) -> Result<()> {
        let input = self.analyze_input()?;

        let api_key = self
            .llm_api_key
            .as_deref()
            .ok_or_else(|| anyhow!("An LLM API key is required (--llm-api-key or OPENAI_API_KEY)"))?;

        let config = LlmConfig::new(api_key)
            .with_base_url(self.base_url.clone())
            .with_model(self.model.clone());
        let client = LlmClient::new(config).context("Failed to create LLM client")?;

        let options = AnalyzeOptions::new(input)
            .with_output(self.output.clone())
            .with_json_dir(self.json_dir.clone())
            .with_chunk_size(self.chunk_size)
            .with_max_chunks(self.max_chunks())
            .with_reference_year(current_year());

        info!(model = %self.model, max_chunks = ?options.max_chunks, "Starting LLM analysis");

        let progress = ProgressReporter::new("Analyzing articles")?;
        let outcome = analyze_articles(&client, &options, &progress)
            .await
            .context("LLM analysis failed")?;

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
