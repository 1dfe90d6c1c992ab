//! Article metadata returned by PubMed EFetch

use serde::{Deserialize, Serialize};

/// Represents a PubMed article with metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PubMedArticle {
    /// PubMed ID
    pub pmid: String,
    /// Article title
    pub title: String,
    /// Authors in citation order
    pub authors: Vec<Author>,
    /// Journal name
    pub journal: String,
    /// Publication date of the journal issue
    pub pub_date: PubDate,
    /// DOI (Digital Object Identifier)
    pub doi: Option<String>,
    /// PMC ID if available (with PMC prefix, e.g., "PMC7092803")
    pub pmc_id: Option<String>,
    /// Abstract text (if available)
    ///
    /// Labeled sections of structured abstracts are rendered as
    /// `"LABEL: text"` and joined with a space.
    pub abstract_text: Option<String>,
    /// Article types (e.g., "Clinical Trial", "Review", etc.)
    pub article_types: Vec<String>,
    /// MeSH descriptor names
    pub mesh_terms: Vec<String>,
    /// Author-provided keywords
    pub keywords: Vec<String>,
}

impl PubMedArticle {
    /// `"LastName ForeName"` (or collective names) joined with `", "`
    ///
    /// Returns `None` when the article has no usable author.
    pub fn author_list(&self) -> Option<String> {
        let names: Vec<String> = self
            .authors
            .iter()
            .filter_map(Author::display_name)
            .collect();

        if names.is_empty() {
            None
        } else {
            Some(names.join(", "))
        }
    }
}

/// Article author
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub last_name: Option<String>,
    pub fore_name: Option<String>,
    pub initials: Option<String>,
    /// Group authorship, e.g. "COVID-19 Telehealth Study Group"
    pub collective_name: Option<String>,
}

impl Author {
    /// Name as written to the metadata CSV
    pub fn display_name(&self) -> Option<String> {
        match (&self.last_name, &self.fore_name, &self.collective_name) {
            (Some(last), Some(fore), _) => Some(format!("{last} {fore}")),
            (Some(last), None, _) => Some(match &self.initials {
                Some(initials) => format!("{last} {initials}"),
                None => last.clone(),
            }),
            (None, _, Some(collective)) => Some(collective.clone()),
            _ => None,
        }
    }
}

/// Journal issue publication date
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PubDate {
    pub year: Option<String>,
    pub month: Option<String>,
    pub day: Option<String>,
    /// Free-form date such as "2019 Nov-Dec" used when no structured date exists
    pub medline_date: Option<String>,
}

impl PubDate {
    /// Four-digit publication year
    pub fn year_number(&self) -> Option<u16> {
        if let Some(year) = self.year.as_deref().and_then(|y| y.trim().parse().ok()) {
            return Some(year);
        }
        self.medline_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .and_then(|y| y.parse().ok())
    }

    /// `year/month/day` with missing parts dropped, or the MedlineDate
    pub fn display(&self) -> String {
        let parts: Vec<&str> = [&self.year, &self.month, &self.day]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .filter(|p| !p.is_empty())
            .collect();

        if parts.is_empty() {
            self.medline_date.clone().unwrap_or_default()
        } else {
            parts.join("/")
        }
    }
}
