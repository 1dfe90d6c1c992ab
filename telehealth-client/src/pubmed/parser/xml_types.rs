//! Internal EFetch XML schema types and their conversion to [`PubMedArticle`]

use serde::Deserialize;

use super::deserializers::AbstractTextElement;
use crate::error::{Result, TelehealthError};
use crate::pubmed::models::{Author, PubDate, PubMedArticle};

const NO_TITLE: &str = "No title available";
const UNKNOWN_JOURNAL: &str = "Unknown Journal";

#[derive(Debug, Deserialize)]
pub(super) struct PubmedArticleSet {
    #[serde(rename = "PubmedArticle", default)]
    pub articles: Vec<PubmedArticleXml>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PubmedArticleXml {
    #[serde(rename = "MedlineCitation")]
    pub medline_citation: MedlineCitation,
    #[serde(rename = "PubmedData")]
    pub pubmed_data: Option<PubmedData>,
}

#[derive(Debug, Deserialize)]
pub(super) struct MedlineCitation {
    #[serde(rename = "PMID")]
    pub pmid: Option<TextElement>,
    #[serde(rename = "Article")]
    pub article: Option<ArticleXml>,
    #[serde(rename = "MeshHeadingList")]
    pub mesh_heading_list: Option<MeshHeadingList>,
    #[serde(rename = "KeywordList", default)]
    pub keyword_lists: Vec<KeywordList>,
}

/// Element whose attributes are irrelevant and whose text is the value
#[derive(Debug, Deserialize)]
pub(super) struct TextElement {
    #[serde(rename = "$text", default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ArticleXml {
    #[serde(rename = "Journal")]
    pub journal: Option<JournalXml>,
    #[serde(rename = "ArticleTitle")]
    pub article_title: Option<String>,
    #[serde(rename = "ELocationID", default)]
    pub elocation_ids: Vec<ELocationIdXml>,
    #[serde(rename = "Abstract")]
    pub abstract_xml: Option<AbstractXml>,
    #[serde(rename = "AuthorList")]
    pub author_list: Option<AuthorListXml>,
    #[serde(rename = "PublicationTypeList")]
    pub publication_type_list: Option<PublicationTypeList>,
}

#[derive(Debug, Deserialize)]
pub(super) struct JournalXml {
    #[serde(rename = "JournalIssue")]
    pub journal_issue: Option<JournalIssueXml>,
    #[serde(rename = "Title")]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct JournalIssueXml {
    #[serde(rename = "PubDate")]
    pub pub_date: Option<PubDateXml>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PubDateXml {
    #[serde(rename = "Year")]
    pub year: Option<String>,
    #[serde(rename = "Month")]
    pub month: Option<String>,
    #[serde(rename = "Day")]
    pub day: Option<String>,
    #[serde(rename = "MedlineDate")]
    pub medline_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ELocationIdXml {
    #[serde(rename = "@EIdType")]
    pub eid_type: Option<String>,
    #[serde(rename = "$text", default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct AbstractXml {
    #[serde(rename = "AbstractText", default)]
    pub texts: Vec<AbstractTextElement>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AuthorListXml {
    #[serde(rename = "Author", default)]
    pub authors: Vec<AuthorXml>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AuthorXml {
    #[serde(rename = "LastName")]
    pub last_name: Option<String>,
    #[serde(rename = "ForeName")]
    pub fore_name: Option<String>,
    #[serde(rename = "Initials")]
    pub initials: Option<String>,
    #[serde(rename = "CollectiveName")]
    pub collective_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PublicationTypeList {
    #[serde(rename = "PublicationType", default)]
    pub types: Vec<TextElement>,
}

#[derive(Debug, Deserialize)]
pub(super) struct MeshHeadingList {
    #[serde(rename = "MeshHeading", default)]
    pub headings: Vec<MeshHeadingXml>,
}

#[derive(Debug, Deserialize)]
pub(super) struct MeshHeadingXml {
    #[serde(rename = "DescriptorName")]
    pub descriptor_name: Option<TextElement>,
}

#[derive(Debug, Deserialize)]
pub(super) struct KeywordList {
    #[serde(rename = "Keyword", default)]
    pub keywords: Vec<TextElement>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PubmedData {
    #[serde(rename = "ArticleIdList")]
    pub article_id_list: Option<ArticleIdList>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ArticleIdList {
    #[serde(rename = "ArticleId", default)]
    pub ids: Vec<ArticleIdXml>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ArticleIdXml {
    #[serde(rename = "@IdType")]
    pub id_type: Option<String>,
    #[serde(rename = "$text", default)]
    pub value: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl PubmedArticleXml {
    pub(super) fn into_article(self, pmid: &str) -> Result<PubMedArticle> {
        let citation = self.medline_citation;
        let article = citation.article.ok_or_else(|| {
            TelehealthError::XmlError(format!("PMID {pmid}: MedlineCitation has no Article"))
        })?;

        let title = non_empty(article.article_title).unwrap_or_else(|| NO_TITLE.to_string());

        let (journal, pub_date) = match article.journal {
            Some(journal) => {
                let pub_date = journal
                    .journal_issue
                    .and_then(|issue| issue.pub_date)
                    .map(|date| PubDate {
                        year: non_empty(date.year),
                        month: non_empty(date.month),
                        day: non_empty(date.day),
                        medline_date: non_empty(date.medline_date),
                    })
                    .unwrap_or_default();
                (
                    non_empty(journal.title).unwrap_or_else(|| UNKNOWN_JOURNAL.to_string()),
                    pub_date,
                )
            }
            None => (UNKNOWN_JOURNAL.to_string(), PubDate::default()),
        };

        let authors = article
            .author_list
            .map(|list| {
                list.authors
                    .into_iter()
                    .map(|a| Author {
                        last_name: non_empty(a.last_name),
                        fore_name: non_empty(a.fore_name),
                        initials: non_empty(a.initials),
                        collective_name: non_empty(a.collective_name),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let abstract_text = article.abstract_xml.and_then(|abs| {
            let parts: Vec<String> = abs
                .texts
                .into_iter()
                .filter(|t| !t.text.trim().is_empty())
                .map(|t| match t.label {
                    Some(label) if !label.is_empty() => format!("{}: {}", label, t.text.trim()),
                    _ => t.text.trim().to_string(),
                })
                .collect();
            non_empty(Some(parts.join(" ")))
        });

        let article_ids = self
            .pubmed_data
            .and_then(|data| data.article_id_list)
            .map(|list| list.ids)
            .unwrap_or_default();

        let doi = article
            .elocation_ids
            .iter()
            .find(|e| e.eid_type.as_deref() == Some("doi"))
            .map(|e| e.value.trim().to_string())
            .or_else(|| {
                article_ids
                    .iter()
                    .find(|id| id.id_type.as_deref() == Some("doi"))
                    .map(|id| id.value.trim().to_string())
            })
            .filter(|doi| !doi.is_empty());

        let pmc_id = article_ids
            .iter()
            .find(|id| id.id_type.as_deref() == Some("pmc"))
            .map(|id| id.value.trim().to_string())
            .filter(|id| !id.is_empty());

        let article_types = article
            .publication_type_list
            .map(|list| {
                list.types
                    .into_iter()
                    .filter_map(|t| non_empty(Some(t.value)))
                    .collect()
            })
            .unwrap_or_default();

        let mesh_terms = citation
            .mesh_heading_list
            .map(|list| {
                list.headings
                    .into_iter()
                    .filter_map(|h| h.descriptor_name)
                    .filter_map(|d| non_empty(Some(d.value)))
                    .collect()
            })
            .unwrap_or_default();

        let keywords = citation
            .keyword_lists
            .into_iter()
            .flat_map(|list| list.keywords)
            .filter_map(|k| non_empty(Some(k.value)))
            .collect();

        Ok(PubMedArticle {
            pmid: pmid.to_string(),
            title,
            authors,
            journal,
            pub_date,
            doi,
            pmc_id,
            abstract_text,
            article_types,
            mesh_terms,
            keywords,
        })
    }
}
