//! CSV record types shared by the batch jobs
//!
//! Every record type knows its fixed column order, so an output file always
//! carries a header row even when a batch produced nothing.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::MeasureCategory;
use crate::error::{Result, TelehealthError};

/// A row type with a fixed CSV header
pub trait CsvRecord: Serialize + DeserializeOwned {
    const HEADERS: &'static [&'static str];
}

/// Metadata of one fetched article
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub pmid: String,
    pub title: String,
    pub authors: String,
    pub publication_year: Option<u16>,
    pub journal: String,
    pub publication_date: String,
    pub doi: String,
    pub article_type: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub mesh_terms: String,
    pub pdf_path: String,
    pub study_type: String,
    pub data_source: String,
    pub telehealth_measure_type: String,
    pub telehealth_measures: String,
    pub notes: String,
}

impl CsvRecord for ArticleRecord {
    const HEADERS: &'static [&'static str] = &[
        "pmid",
        "title",
        "authors",
        "publication_year",
        "journal",
        "publication_date",
        "doi",
        "article_type",
        "abstract",
        "mesh_terms",
        "pdf_path",
        "study_type",
        "data_source",
        "telehealth_measure_type",
        "telehealth_measures",
        "notes",
    ];
}

/// Which classifier produced a measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    Rules,
    Llm,
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionMethod::Rules => f.write_str("rules"),
            ExtractionMethod::Llm => f.write_str("llm"),
        }
    }
}

/// One telehealth utilization measure found in an article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureRecord {
    pub article_id: String,
    pub measure: String,
    pub category: MeasureCategory,
    pub value: String,
    pub context: String,
    pub method: ExtractionMethod,
}

impl CsvRecord for MeasureRecord {
    const HEADERS: &'static [&'static str] =
        &["article_id", "measure", "category", "value", "context", "method"];
}

/// Study characteristics guessed from the full text of one PDF
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudyProfile {
    pub article_id: String,
    pub title: String,
    pub authors: String,
    pub publication_year: Option<u16>,
    pub study_design: String,
    pub data_source: String,
    pub population: String,
    pub sample_size: Option<u64>,
    pub study_duration: String,
}

impl CsvRecord for StudyProfile {
    const HEADERS: &'static [&'static str] = &[
        "article_id",
        "title",
        "authors",
        "publication_year",
        "study_design",
        "data_source",
        "population",
        "sample_size",
        "study_duration",
    ];
}

/// Number of measures of one category in one article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub article_id: String,
    pub category: MeasureCategory,
    pub count: usize,
}

impl CsvRecord for CategoryCount {
    const HEADERS: &'static [&'static str] = &["article_id", "category", "count"];
}

fn create_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| TelehealthError::IoError {
            message: format!("Failed to create directory {}: {}", parent.display(), e),
        })?;
    }
    Ok(())
}

fn write_rows<R: CsvRecord, W: std::io::Write>(
    writer: &mut csv::Writer<W>,
    rows: &[R],
) -> Result<()> {
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `rows` to `path`, replacing any existing file
///
/// Parent directories are created and the header is written even when
/// `rows` is empty.
pub fn write_records<R: CsvRecord, P: AsRef<Path>>(path: P, rows: &[R]) -> Result<()> {
    let path = path.as_ref();
    create_parent_dirs(path)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(R::HEADERS)?;
    write_rows(&mut writer, rows)?;

    debug!(path = %path.display(), rows = rows.len(), "Wrote CSV");
    Ok(())
}

/// Append `rows` to `path`
///
/// The header is only written when the file is missing or empty.
pub fn append_records<R: CsvRecord, P: AsRef<Path>>(path: P, rows: &[R]) -> Result<()> {
    let path = path.as_ref();
    create_parent_dirs(path)?;

    let needs_header = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    if needs_header {
        writer.write_record(R::HEADERS)?;
    }
    write_rows(&mut writer, rows)?;

    debug!(path = %path.display(), rows = rows.len(), "Appended CSV");
    Ok(())
}

/// Read every row of a CSV file written with [`write_records`]
pub fn read_records<R: CsvRecord, P: AsRef<Path>>(path: P) -> Result<Vec<R>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)?;

    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<R>, csv::Error>>()?;

    debug!(path = %path.display(), rows = rows.len(), "Read CSV");
    Ok(rows)
}
