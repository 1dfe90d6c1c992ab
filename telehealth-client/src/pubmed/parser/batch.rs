//! Batch parsing for multiple PubMed articles in one EFetch response

use super::preprocessing::strip_inline_html_tags;
use super::xml_types::PubmedArticleSet;
use crate::error::{Result, TelehealthError};
use crate::pubmed::models::PubMedArticle;
use quick_xml::de::from_str;
use tracing::{instrument, warn};

/// Parse every `<PubmedArticle>` of an EFetch batch response
///
/// Records without a PMID or without an `Article` element are logged and
/// skipped; only a malformed document is an error.
#[instrument(skip(xml), fields(xml_size = xml.len()))]
pub fn parse_articles_from_xml(xml: &str) -> Result<Vec<PubMedArticle>> {
    let cleaned_xml = strip_inline_html_tags(xml);

    let article_set: PubmedArticleSet = from_str(&cleaned_xml)
        .map_err(|e| TelehealthError::XmlError(format!("Failed to deserialize XML: {}", e)))?;

    let articles: Vec<PubMedArticle> = article_set
        .articles
        .into_iter()
        .filter_map(|article_xml| {
            let pmid = article_xml
                .medline_citation
                .pmid
                .as_ref()
                .map(|p| p.value.trim().to_string())?;

            match article_xml.into_article(&pmid) {
                Ok(article) => Some(article),
                Err(e) => {
                    warn!(pmid = %pmid, error = %e, "Failed to parse article, skipping");
                    None
                }
            }
        })
        .collect();

    Ok(articles)
}
