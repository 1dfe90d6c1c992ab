use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use telehealth_client::pipeline::combine_measures;
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct Combine {
    /// Directory holding `<id>_measures.csv` files
    #[arg(short, long, default_value = "data/llm_analysis")]
    pub input_dir: PathBuf,

    /// Combined CSV file
    #[arg(short, long, default_value = "data/telehealth_measures_summary.csv")]
    pub output_file: PathBuf,
}

impl Combine {
    pub fn execute(&self) -> Result<()> {
        let summary = combine_measures(&self.input_dir, &self.output_file)
            .context("Failed to combine measure files")?;

        if summary.files == 0 {
            return Ok(());
        }

        for (category, count) in &summary.totals {
            info!(category = %category, count, "Measures by category");
        }

        if let Some(counts_path) = &summary.counts_path {
            info!(path = %counts_path.display(), "Saved category counts");
        }

        if !summary.report.is_clean() {
            warn!(skipped = summary.report.skipped.len(), "Some files were not combined");
        }

        Ok(())
    }
}
