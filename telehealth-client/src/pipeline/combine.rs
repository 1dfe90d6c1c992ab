//! Merge per-article measure files into one CSV plus category counts

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use crate::analysis::MeasureCategory;
use crate::error::{Result, TelehealthError};
use crate::pipeline::BatchReport;
use crate::records::{
    CategoryCount, MeasureRecord, append_records, read_records, write_records,
};

const MEASURE_FILE_SUFFIX: &str = "_measures.csv";

/// Result of a combine run
#[derive(Debug, Clone, Default)]
pub struct CombineSummary {
    /// Number of input files read
    pub files: usize,
    /// Number of measure rows written to the combined CSV
    pub rows: usize,
    /// Measures per category over every article
    pub totals: BTreeMap<MeasureCategory, usize>,
    /// Path of the per-article category counts, when written
    pub counts_path: Option<PathBuf>,
    pub report: BatchReport,
}

/// `<dir>/<stem>_by_category.csv` next to `output`
pub fn category_counts_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "measures".to_string());
    output.with_file_name(format!("{stem}_by_category.csv"))
}

/// Combine every `*_measures.csv` in `input_dir` into `output`
///
/// Also writes `<stem>_by_category.csv` with one row per (article,
/// category). Files that cannot be read are skipped. When no measure file
/// can be read nothing is written.
#[instrument(fields(input_dir = %input_dir.as_ref().display(), output = %output.as_ref().display()), skip_all)]
pub fn combine_measures<P: AsRef<Path>, Q: AsRef<Path>>(input_dir: P, output: Q) -> Result<CombineSummary> {
    let input_dir = input_dir.as_ref();
    let output = output.as_ref();

    let files = measure_files(input_dir, output)?;
    let mut summary = CombineSummary::default();

    if files.is_empty() {
        warn!("No measure files found");
        return Ok(summary);
    }

    // Rows are streamed into `output`; the first parsed file truncates it
    let mut per_article: BTreeMap<(String, MeasureCategory), usize> = BTreeMap::new();
    for file in &files {
        let rows = match read_records::<MeasureRecord, _>(file) {
            Ok(rows) => rows,
            Err(e) => {
                summary
                    .report
                    .record_skip(file.display().to_string(), e.to_string());
                continue;
            }
        };

        if summary.files == 0 {
            write_records(output, &rows)?;
        } else {
            append_records(output, &rows)?;
        }

        for record in &rows {
            *per_article
                .entry((record.article_id.clone(), record.category))
                .or_default() += 1;
            *summary.totals.entry(record.category).or_default() += 1;
        }

        summary.files += 1;
        summary.rows += rows.len();
        summary.report.record_success();
    }

    if summary.files == 0 {
        warn!(skipped = summary.report.skipped.len(), "No readable measure files");
        return Ok(summary);
    }

    let counts: Vec<CategoryCount> = per_article
        .into_iter()
        .map(|((article_id, category), count)| CategoryCount {
            article_id,
            category,
            count,
        })
        .collect();

    let counts_path = category_counts_path(output);
    write_records(&counts_path, &counts)?;

    summary.counts_path = Some(counts_path);

    info!(files = summary.files, rows = summary.rows, "Combined measure files");
    Ok(summary)
}

fn measure_files(input_dir: &Path, output: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(input_dir).map_err(|e| TelehealthError::IoError {
        message: format!("Failed to read directory {}: {}", input_dir.display(), e),
    })?;

    let output = fs::canonicalize(output).ok();

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && (output.is_none() || fs::canonicalize(path).ok() != output)
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(MEASURE_FILE_SUFFIX))
        })
        .collect();
    files.sort();

    Ok(files)
}
