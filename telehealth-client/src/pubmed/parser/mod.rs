//! PubMed XML parser module
//!
//! Parses PubMed EFetch XML responses into [`PubMedArticle`] metadata:
//! title, authors, journal, publication date, DOI, PMC ID, abstract,
//! publication types, MeSH descriptors and keywords.
//!
//! # Module Organization
//!
//! - `preprocessing` - XML cleaning and preparation
//! - `deserializers` - Custom serde deserializers for structured abstracts
//! - `xml_types` - Internal XML schema types and their conversion
//! - `batch` - Parsing of multi-article responses

mod batch;
mod deserializers;
mod preprocessing;
mod xml_types;

pub use batch::parse_articles_from_xml;

use crate::error::{Result, TelehealthError};
use crate::pubmed::models::PubMedArticle;
use quick_xml::de::from_str;
use tracing::instrument;
use xml_types::PubmedArticleSet;

/// Parse article from EFetch XML response
///
/// # Errors
///
/// Returns an error if:
/// - The XML is malformed or doesn't match the expected schema
/// - The specified PMID is not found in the XML
/// - The matching record has no `Article` element
///
/// # Example
///
/// ```
/// use telehealth_client::pubmed::parse_article_from_xml;
///
/// let xml = r#"<?xml version="1.0"?>
/// <PubmedArticleSet>
///   <PubmedArticle>
///     <MedlineCitation>
///       <PMID>12345678</PMID>
///       <Article>
///         <ArticleTitle>Example Article</ArticleTitle>
///         <Journal><Title>Example Journal</Title></Journal>
///       </Article>
///     </MedlineCitation>
///   </PubmedArticle>
/// </PubmedArticleSet>"#;
///
/// let article = parse_article_from_xml(xml, "12345678")?;
/// assert_eq!(article.title, "Example Article");
/// # Ok::<(), telehealth_client::TelehealthError>(())
/// ```
#[instrument(skip(xml), fields(pmid = %pmid, xml_size = xml.len()))]
pub fn parse_article_from_xml(xml: &str, pmid: &str) -> Result<PubMedArticle> {
    let cleaned_xml = preprocessing::strip_inline_html_tags(xml);

    let article_set: PubmedArticleSet = from_str(&cleaned_xml)
        .map_err(|e| TelehealthError::XmlError(format!("Failed to deserialize XML: {}", e)))?;

    let article_xml = article_set
        .articles
        .into_iter()
        .find(|a| {
            a.medline_citation
                .pmid
                .as_ref()
                .is_some_and(|p| p.value.trim() == pmid)
        })
        .ok_or_else(|| TelehealthError::ArticleNotFound {
            pmid: pmid.to_string(),
        })?;

    article_xml.into_article(pmid)
}
