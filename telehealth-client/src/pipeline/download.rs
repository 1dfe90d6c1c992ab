//! Search PubMed, record article metadata and fetch open-access PDFs

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::analysis::{
    categorize_measures, classify_article_design, find_measure_sentences, identify_data_source,
};
use crate::error::{Result, TelehealthError};
use crate::pipeline::{BatchProgress, BatchReport};
use crate::pmc::PmcClient;
use crate::pubmed::{PubMedArticle, PubMedClient, SortOrder};
use crate::records::{ArticleRecord, write_records};

const UNKNOWN_AUTHORS: &str = "Unknown authors";

/// Settings of a download run
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub search_term: String,
    pub num_articles: usize,
    pub sort: Option<SortOrder>,
    /// Directory receiving `<pmid>.pdf` files
    pub output_dir: PathBuf,
    /// Metadata CSV
    pub csv_path: PathBuf,
    pub download_pdfs: bool,
    /// Download again even when `<pmid>.pdf` already exists
    pub overwrite: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            search_term: "telehealth utilization measures".to_string(),
            num_articles: 20,
            sort: Some(SortOrder::Relevance),
            output_dir: PathBuf::from("articles"),
            csv_path: PathBuf::from("data/article_metadata.csv"),
            download_pdfs: true,
            overwrite: false,
        }
    }
}

impl DownloadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_term<S: Into<String>>(mut self, search_term: S) -> Self {
        self.search_term = search_term.into();
        self
    }

    pub fn with_num_articles(mut self, num_articles: usize) -> Self {
        self.num_articles = num_articles;
        self
    }

    pub fn with_sort(mut self, sort: Option<SortOrder>) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_output_dir<P: Into<PathBuf>>(mut self, output_dir: P) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_csv_path<P: Into<PathBuf>>(mut self, csv_path: P) -> Self {
        self.csv_path = csv_path.into();
        self
    }

    pub fn with_pdf_downloads(mut self, download_pdfs: bool) -> Self {
        self.download_pdfs = download_pdfs;
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// Records written by a download run and what was skipped
///
/// `report.skipped` lists search hits whose metadata could not be parsed
/// and articles whose PDF could not be retrieved. The latter still have a
/// metadata row, with the reason in `notes`.
#[derive(Debug, Clone, Default)]
pub struct DownloadOutcome {
    pub records: Vec<ArticleRecord>,
    pub report: BatchReport,
}

impl DownloadOutcome {
    pub fn pdf_count(&self) -> usize {
        self.records.iter().filter(|r| !r.pdf_path.is_empty()).count()
    }
}

/// Metadata row of one article, with the rule-based guesses filled in
pub fn build_article_record(article: &PubMedArticle) -> ArticleRecord {
    let abstract_text = article.abstract_text.clone().unwrap_or_default();
    let article_type = article.article_types.join(", ");
    let mesh_terms = article.mesh_terms.join(", ");
    let measures = find_measure_sentences(&abstract_text);

    ArticleRecord {
        pmid: article.pmid.clone(),
        title: article.title.clone(),
        authors: article
            .author_list()
            .unwrap_or_else(|| UNKNOWN_AUTHORS.to_string()),
        publication_year: article.pub_date.year_number(),
        journal: article.journal.clone(),
        publication_date: article.pub_date.display(),
        doi: article.doi.clone().unwrap_or_default(),
        study_type: classify_article_design(&article_type, &abstract_text).to_string(),
        data_source: identify_data_source(&format!("{abstract_text} {mesh_terms}")).to_string(),
        telehealth_measure_type: categorize_measures(&measures),
        telehealth_measures: measures.join("; "),
        article_type,
        abstract_text,
        mesh_terms,
        pdf_path: String::new(),
        notes: String::new(),
    }
}

/// Run a full download: search, fetch metadata, fetch PDFs, write the CSV
///
/// Search and fetch failures abort the run. PDF failures only mark the
/// article in the report and in its `notes` column.
#[instrument(skip_all, fields(search_term = %options.search_term, limit = options.num_articles))]
pub async fn download_articles(
    pubmed: &PubMedClient,
    pmc: &PmcClient,
    options: &DownloadOptions,
    progress: &dyn BatchProgress,
) -> Result<DownloadOutcome> {
    let pmids = pubmed
        .search_articles(&options.search_term, options.num_articles, options.sort.as_ref())
        .await?;
    info!(count = pmids.len(), "Search finished");

    let mut outcome = DownloadOutcome::default();

    if pmids.is_empty() {
        info!("No articles found");
        write_records(&options.csv_path, &outcome.records)?;
        return Ok(outcome);
    }

    let pmid_refs: Vec<&str> = pmids.iter().map(String::as_str).collect();
    let articles = pubmed.fetch_articles(&pmid_refs).await?;

    let fetched: HashSet<&str> = articles.iter().map(|a| a.pmid.as_str()).collect();
    for pmid in pmids.iter().filter(|p| !fetched.contains(p.as_str())) {
        outcome
            .report
            .record_skip(pmid.as_str(), "Article metadata could not be parsed");
    }

    progress.start(articles.len());

    for article in &articles {
        progress.item_started(&article.pmid);
        let mut record = build_article_record(article);

        if options.download_pdfs {
            match fetch_pdf(pubmed, pmc, article, options).await {
                Ok(path) => record.pdf_path = path.display().to_string(),
                Err(e) => {
                    record.notes = e.to_string();
                    outcome.report.record_skip(article.pmid.as_str(), e.to_string());
                }
            }
        }

        outcome.records.push(record);
        outcome.report.record_success();
        progress.item_finished(&article.pmid);
    }

    write_records(&options.csv_path, &outcome.records)?;
    progress.finish();

    info!(
        articles = outcome.records.len(),
        pdfs = outcome.pdf_count(),
        path = %options.csv_path.display(),
        "Metadata saved"
    );

    Ok(outcome)
}

async fn fetch_pdf(
    pubmed: &PubMedClient,
    pmc: &PmcClient,
    article: &PubMedArticle,
    options: &DownloadOptions,
) -> Result<PathBuf> {
    let dest = pdf_path_for(&options.output_dir, &article.pmid);
    if !options.overwrite && dest.exists() {
        debug!(path = %dest.display(), "PDF already present");
        return Ok(dest);
    }

    let pmcid = match &article.pmc_id {
        Some(pmcid) => pmcid.clone(),
        None => pubmed
            .check_pmc_availability(&article.pmid)
            .await?
            .map(|id| id.to_string())
            .ok_or_else(|| TelehealthError::PdfNotAvailable {
                id: article.pmid.clone(),
            })?,
    };

    let link = pmc
        .find_pdf_link(&pmcid)
        .await?
        .ok_or(TelehealthError::PdfNotAvailable { id: pmcid })?;

    pmc.download_pdf(&link.url, &dest).await?;
    Ok(dest)
}

/// `<dir>/<pmid>.pdf`
pub fn pdf_path_for(dir: &Path, pmid: &str) -> PathBuf {
    dir.join(format!("{pmid}.pdf"))
}
