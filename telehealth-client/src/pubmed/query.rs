//! ESearch sort orders

use std::fmt;
use std::str::FromStr;

use crate::error::TelehealthError;

/// Sort order for ESearch results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Best match (PubMed default)
    #[default]
    Relevance,
    /// Most recent first
    PublicationDate,
    /// First author, alphabetically
    FirstAuthor,
    /// Journal name, alphabetically
    JournalName,
}

impl SortOrder {
    /// Value of the ESearch `sort` parameter
    pub fn as_api_param(&self) -> &'static str {
        match self {
            SortOrder::Relevance => "relevance",
            SortOrder::PublicationDate => "pub_date",
            SortOrder::FirstAuthor => "Author",
            SortOrder::JournalName => "JournalName",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_param())
    }
}

impl FromStr for SortOrder {
    type Err = TelehealthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "relevance" => Ok(SortOrder::Relevance),
            "pub_date" | "publication_date" | "date" => Ok(SortOrder::PublicationDate),
            "author" | "first_author" => Ok(SortOrder::FirstAuthor),
            "journal" | "journal_name" | "journalname" => Ok(SortOrder::JournalName),
            other => Err(TelehealthError::Config(format!(
                "Unknown sort order '{other}' (expected relevance, pub_date, author or journal)"
            ))),
        }
    }
}
