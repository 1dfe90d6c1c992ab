pub mod analyze;
pub mod analyze_llm;
pub mod combine;
pub mod download;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use chrono::Datelike;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use telehealth_client::pipeline::{AnalyzeInput, BatchProgress};
use telehealth_client::{BatchReport, Client, ClientConfig};
use tracing::{error, info};

pub fn create_client(api_key: Option<&str>, email: Option<&str>, tool: &str) -> Result<Client> {
    let mut config = ClientConfig::new().with_tool(tool);

    if let Some(key) = api_key {
        config = config.with_api_key(key);
    }

    if let Some(email) = email {
        config = config.with_email(email);
    }

    Client::with_config(config).context("Failed to create NCBI clients")
}

/// Input selection shared by the analysis commands
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct InputArgs {
    /// Metadata CSV written by `download`; its pdf_path column is analyzed
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Directory of PDF files
    #[arg(long)]
    pub pdf_dir: Option<PathBuf>,
}

impl InputArgs {
    pub fn to_analyze_input(&self) -> Option<AnalyzeInput> {
        match (&self.input, &self.pdf_dir) {
            (Some(csv), _) => Some(AnalyzeInput::MetadataCsv(csv.clone())),
            (None, Some(dir)) => Some(AnalyzeInput::PdfDir(dir.clone())),
            (None, None) => None,
        }
    }
}

/// Progress bar driven by a pipeline batch
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn new(message: &str) -> Result<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} articles ({msg})")
                .context("Failed to set progress bar style")?
                .progress_chars("#>-"),
        );
        bar.set_message(message.to_string());
        Ok(Self { bar })
    }
}

impl BatchProgress for ProgressReporter {
    fn start(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn item_started(&self, id: &str) {
        self.bar.set_message(format!("Processing {}", id));
    }

    fn item_finished(&self, _id: &str) {
        self.bar.inc(1);
    }

    fn finish(&self) {
        self.bar.finish_with_message("done");
    }
}

/// Save skipped items as pretty JSON when a path is given, otherwise log them
pub async fn report_failures(report: &BatchReport, failed_output: Option<&Path>) {
    if report.is_clean() {
        return;
    }

    match failed_output {
        Some(path) => match save_failed_items_json(report, path).await {
            Ok(()) => info!(
                path = %path.display(),
                count = report.skipped.len(),
                "Saved failed items to JSON file"
            ),
            Err(e) => error!(
                path = %path.display(),
                error = %e,
                "Failed to save failed items to JSON file"
            ),
        },
        None => error!(
            failed_count = report.skipped.len(),
            failed_items = ?report.skipped,
            "Failed to process some items"
        ),
    }
}

async fn save_failed_items_json(report: &BatchReport, path: &Path) -> Result<()> {
    let json_content = serde_json::to_string_pretty(&report.skipped)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .context("Failed to create directory for failed items")?;
    }

    tokio::fs::write(path, json_content)
        .await
        .context("Failed to write failed items to file")?;

    Ok(())
}

/// Latest year accepted as a publication year
pub fn current_year() -> u16 {
    u16::try_from(chrono::Utc::now().year()).unwrap_or(u16::MAX)
}
