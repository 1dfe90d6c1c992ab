//! Extract telehealth measures and study profiles from downloaded PDFs

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, info, instrument};

use crate::analysis::profile_study;
use crate::error::{Result, TelehealthError};
use crate::pdf::{chunk_text, extract_text};
use crate::pipeline::{BatchProgress, BatchReport, MeasureExtractor};
use crate::records::{
    ArticleRecord, ExtractionMethod, MeasureRecord, StudyProfile, read_records, write_records,
};

/// Where the PDFs to analyze come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyzeInput {
    /// The `pdf_path` column of a metadata CSV; the article ID is the PMID
    MetadataCsv(PathBuf),
    /// Every `*.pdf` file of a directory; the article ID is the file stem
    PdfDir(PathBuf),
    /// One PDF; the article ID is the file stem
    SingleFile(PathBuf),
}

/// Settings of an analysis run
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub input: AnalyzeInput,
    /// Measures CSV
    pub output: PathBuf,
    /// Study profile CSV, written only when set
    pub study_output: Option<PathBuf>,
    /// Directory for `<id>_measures.json` and `<id>_measures.csv`
    pub json_dir: Option<PathBuf>,
    /// Maximum characters per chunk handed to the extractor
    pub chunk_size: usize,
    /// Only the first chunks of each article are analyzed when set
    pub max_chunks: Option<usize>,
    /// Latest year accepted as a publication year
    pub reference_year: u16,
}

impl AnalyzeOptions {
    pub fn new(input: AnalyzeInput) -> Self {
        let reference_year = u16::try_from(OffsetDateTime::now_utc().year()).unwrap_or(u16::MAX);

        Self {
            input,
            output: PathBuf::from("data/telehealth_measures.csv"),
            study_output: None,
            json_dir: None,
            chunk_size: 4000,
            max_chunks: None,
            reference_year,
        }
    }

    pub fn with_output<P: Into<PathBuf>>(mut self, output: P) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_study_output(mut self, study_output: Option<PathBuf>) -> Self {
        self.study_output = study_output;
        self
    }

    pub fn with_json_dir(mut self, json_dir: Option<PathBuf>) -> Self {
        self.json_dir = json_dir;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_max_chunks(mut self, max_chunks: Option<usize>) -> Self {
        self.max_chunks = max_chunks;
        self
    }

    pub fn with_reference_year(mut self, reference_year: u16) -> Self {
        self.reference_year = reference_year;
        self
    }
}

/// Everything an analysis run produced
#[derive(Debug, Clone, Default)]
pub struct AnalysisOutcome {
    pub measures: Vec<MeasureRecord>,
    pub profiles: Vec<StudyProfile>,
    pub report: BatchReport,
}

/// Per-article JSON result
#[derive(Debug, Serialize)]
struct ArticleAnalysis<'a> {
    article_id: &'a str,
    source_file: String,
    method: ExtractionMethod,
    chunks_analyzed: usize,
    measures: &'a [MeasureRecord],
}

/// Analyze every input PDF with `extractor`
///
/// Unreadable or malformed PDFs and extractor failures skip the article.
/// A zero chunk size, or an input CSV or directory that cannot be read,
/// aborts the run before any article is touched.
#[instrument(skip_all, fields(method = %extractor.method(), input = ?options.input))]
pub async fn analyze_articles(
    extractor: &dyn MeasureExtractor,
    options: &AnalyzeOptions,
    progress: &dyn BatchProgress,
) -> Result<AnalysisOutcome> {
    if options.chunk_size == 0 {
        return Err(TelehealthError::Config(
            "chunk size must be greater than zero".to_string(),
        ));
    }

    let mut outcome = AnalysisOutcome::default();
    let inputs = collect_inputs(&options.input, &mut outcome.report)?;
    info!(count = inputs.len(), "Articles to analyze");

    progress.start(inputs.len());

    for (article_id, path) in &inputs {
        progress.item_started(article_id);

        match analyze_one(extractor, options, article_id, path).await {
            Ok((measures, profile)) => {
                debug!(article_id = %article_id, measures = measures.len(), "Article analyzed");
                outcome.measures.extend(measures);
                outcome.profiles.extend(profile);
                outcome.report.record_success();
            }
            Err(e) => outcome.report.record_skip(article_id.as_str(), e.to_string()),
        }

        progress.item_finished(article_id);
    }

    write_records(&options.output, &outcome.measures)?;
    if let Some(study_output) = &options.study_output {
        write_records(study_output, &outcome.profiles)?;
    }
    progress.finish();

    info!(
        processed = outcome.report.processed,
        skipped = outcome.report.skipped.len(),
        measures = outcome.measures.len(),
        path = %options.output.display(),
        "Analysis finished"
    );

    Ok(outcome)
}

async fn analyze_one(
    extractor: &dyn MeasureExtractor,
    options: &AnalyzeOptions,
    article_id: &str,
    path: &Path,
) -> Result<(Vec<MeasureRecord>, Option<StudyProfile>)> {
    let text = extract_text(path).await?;

    let mut chunks = chunk_text(&text, options.chunk_size)?;
    if let Some(max) = options.max_chunks {
        chunks.truncate(max);
    }

    let measures = extractor.extract(article_id, &chunks).await?;

    if let Some(dir) = &options.json_dir {
        write_article_results(dir, article_id, path, extractor.method(), chunks.len(), &measures)?;
    }

    let profile = options
        .study_output
        .as_ref()
        .map(|_| profile_study(article_id, &text, path, options.reference_year));

    Ok((measures, profile))
}

fn write_article_results(
    dir: &Path,
    article_id: &str,
    source: &Path,
    method: ExtractionMethod,
    chunks_analyzed: usize,
    measures: &[MeasureRecord],
) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| TelehealthError::IoError {
        message: format!("Failed to create directory {}: {}", dir.display(), e),
    })?;

    let result = ArticleAnalysis {
        article_id,
        source_file: source.display().to_string(),
        method,
        chunks_analyzed,
        measures,
    };
    let json_path = dir.join(format!("{article_id}_measures.json"));
    fs::write(&json_path, serde_json::to_string_pretty(&result)?)?;

    write_records(dir.join(format!("{article_id}_measures.csv")), measures)?;

    debug!(path = %json_path.display(), "Saved article results");
    Ok(())
}

/// `(article_id, pdf_path)` pairs of the input
fn collect_inputs(input: &AnalyzeInput, report: &mut BatchReport) -> Result<Vec<(String, PathBuf)>> {
    match input {
        AnalyzeInput::MetadataCsv(csv_path) => {
            let rows: Vec<ArticleRecord> = read_records(csv_path)?;
            let mut inputs = Vec::with_capacity(rows.len());
            for row in rows {
                if row.pdf_path.trim().is_empty() {
                    report.record_skip(row.pmid, "No PDF downloaded");
                } else {
                    inputs.push((row.pmid, PathBuf::from(row.pdf_path.trim())));
                }
            }
            Ok(inputs)
        }
        AnalyzeInput::PdfDir(dir) => {
            let entries = fs::read_dir(dir).map_err(|e| TelehealthError::IoError {
                message: format!("Failed to read directory {}: {}", dir.display(), e),
            })?;

            let mut paths: Vec<PathBuf> = entries
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.is_file() && is_pdf_path(path))
                .collect();
            paths.sort();

            Ok(paths.into_iter().map(|p| (article_id_for(&p), p)).collect())
        }
        AnalyzeInput::SingleFile(path) => Ok(vec![(article_id_for(path), path.clone())]),
    }
}

fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

fn article_id_for(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
