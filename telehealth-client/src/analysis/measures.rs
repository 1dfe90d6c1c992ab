//! Telehealth utilization measure detection and categorization

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::text::{KeywordSet, split_sentences};
use crate::error::TelehealthError;
use crate::records::{ExtractionMethod, MeasureRecord};

/// Article-level label used when measure sentences exist but none matches a
/// category keyword
pub const OTHER_CATEGORY: &str = "Other/Undefined";

const TELEHEALTH_TERMS: &[&str] = &[
    "telehealth",
    "telemedicine",
    "virtual care",
    "video visit",
    "video visits",
    "remote monitoring",
    "telemonitoring",
    "ehealth",
    "e-health",
    "virtual visit",
    "virtual visits",
    "remote consultation",
    "remote consultations",
    "teleconsultation",
    "teleconsultations",
];

const MEASUREMENT_TERMS: &[&str] = &[
    "utilization",
    "usage",
    "use",
    "adoption",
    "implementation",
    "rate",
    "rates",
    "percentage",
    "proportion",
    "number",
    "count",
    "frequency",
    "visits",
    "consultations",
    "encounters",
    "sessions",
];

const PERCENTAGE_KEYWORDS: &[&str] = &["percentage", "percent", "proportion", "ratio", "%"];

const RATE_KEYWORDS: &[&str] = &[
    "rate",
    "rates",
    "per patient",
    "per visit",
    "per provider",
    "per day",
    "per week",
    "per month",
    "per year",
    "per capita",
    "per 1000",
    "per 1,000",
    "per 100",
];

const COUNT_KEYWORDS: &[&str] = &[
    "count",
    "counts",
    "number of",
    "frequency",
    "volume",
    "quantity",
    "total of",
];

const BINARY_KEYWORDS: &[&str] = &[
    "binary",
    "yes/no",
    "yes or no",
    "presence",
    "absence",
    "used or not",
    "adoption",
    "adopted",
    "implemented",
    "ever used",
    "any use",
];

fn keyword_set(cell: &'static OnceLock<KeywordSet>, keywords: &[&'static str]) -> &'static KeywordSet {
    cell.get_or_init(|| KeywordSet::new(keywords).expect("keyword table is valid"))
}

fn telehealth_terms() -> &'static KeywordSet {
    static SET: OnceLock<KeywordSet> = OnceLock::new();
    keyword_set(&SET, TELEHEALTH_TERMS)
}

fn measurement_terms() -> &'static KeywordSet {
    static SET: OnceLock<KeywordSet> = OnceLock::new();
    keyword_set(&SET, MEASUREMENT_TERMS)
}

/// The four kinds of telehealth utilization measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MeasureCategory {
    /// Whether telehealth was used at all
    Binary,
    /// Number of visits, sessions or users
    Count,
    /// Usage normalized by time or population
    Rate,
    /// Share of visits or patients
    Percentage,
}

impl MeasureCategory {
    pub const ALL: [MeasureCategory; 4] = [
        MeasureCategory::Binary,
        MeasureCategory::Count,
        MeasureCategory::Rate,
        MeasureCategory::Percentage,
    ];

    /// Categories in the order keywords are tried by [`classify`](Self::classify)
    const PRECEDENCE: [MeasureCategory; 4] = [
        MeasureCategory::Percentage,
        MeasureCategory::Rate,
        MeasureCategory::Count,
        MeasureCategory::Binary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MeasureCategory::Binary => "Binary",
            MeasureCategory::Count => "Count",
            MeasureCategory::Rate => "Rate",
            MeasureCategory::Percentage => "Percentage",
        }
    }

    fn keywords(&self) -> &'static KeywordSet {
        static PERCENTAGE: OnceLock<KeywordSet> = OnceLock::new();
        static RATE: OnceLock<KeywordSet> = OnceLock::new();
        static COUNT: OnceLock<KeywordSet> = OnceLock::new();
        static BINARY: OnceLock<KeywordSet> = OnceLock::new();

        match self {
            MeasureCategory::Percentage => keyword_set(&PERCENTAGE, PERCENTAGE_KEYWORDS),
            MeasureCategory::Rate => keyword_set(&RATE, RATE_KEYWORDS),
            MeasureCategory::Count => keyword_set(&COUNT, COUNT_KEYWORDS),
            MeasureCategory::Binary => keyword_set(&BINARY, BINARY_KEYWORDS),
        }
    }

    /// Assign exactly one category to a measure description
    ///
    /// Keywords are tried in the order Percentage, Rate, Count, Binary and
    /// the first category with a match wins. Text without any category
    /// keyword yields `None`.
    ///
    /// ```
    /// use telehealth_client::analysis::MeasureCategory;
    ///
    /// assert_eq!(
    ///     MeasureCategory::classify("Telehealth visits per patient per year"),
    ///     Some(MeasureCategory::Rate)
    /// );
    /// assert_eq!(
    ///     MeasureCategory::classify("The adoption rate reached 40%"),
    ///     Some(MeasureCategory::Percentage)
    /// );
    /// assert_eq!(MeasureCategory::classify("Patients liked video"), None);
    /// ```
    pub fn classify(text: &str) -> Option<MeasureCategory> {
        Self::PRECEDENCE
            .into_iter()
            .find(|category| category.keywords().is_match(text))
    }
}

impl fmt::Display for MeasureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeasureCategory {
    type Err = TelehealthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| TelehealthError::LlmResponse(format!("unknown measure category '{s}'")))
    }
}

/// Whether a sentence mentions both telehealth and a measurement term
pub fn is_measure_sentence(sentence: &str) -> bool {
    telehealth_terms().is_match(sentence) && measurement_terms().is_match(sentence)
}

/// Measure sentences of a text, in order of appearance
pub fn find_measure_sentences(text: &str) -> Vec<String> {
    split_sentences(text)
        .into_iter()
        .filter(|s| is_measure_sentence(s))
        .collect()
}

/// Article-level summary of measure categories
///
/// Distinct categories joined with `", "`; [`OTHER_CATEGORY`] when there
/// are measure sentences but none is classifiable; empty when there are
/// none at all.
pub fn categorize_measures<S: AsRef<str>>(sentences: &[S]) -> String {
    if sentences.is_empty() {
        return String::new();
    }

    let categories: BTreeSet<MeasureCategory> = sentences
        .iter()
        .filter_map(|s| MeasureCategory::classify(s.as_ref()))
        .collect();

    if categories.is_empty() {
        return OTHER_CATEGORY.to_string();
    }

    categories
        .iter()
        .map(MeasureCategory::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Numeric value mentioned in a measure sentence
///
/// Percentages are preferred for [`MeasureCategory::Percentage`]; otherwise
/// the first stand-alone number is returned. Digits glued to letters or
/// hyphens (`COVID-19`, `H1N1`) are ignored.
pub fn extract_value(sentence: &str, category: MeasureCategory) -> Option<String> {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    static PERCENT: OnceLock<Regex> = OnceLock::new();

    let number = NUMBER.get_or_init(|| {
        Regex::new(r"(?:^|[^\w\-.])(\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?)(?:\s?%)?")
            .expect("number regex is valid")
    });
    let percent = PERCENT.get_or_init(|| {
        Regex::new(r"(?:^|[^\w\-.])(\d+(?:\.\d+)?\s?%)").expect("percent regex is valid")
    });

    if category == MeasureCategory::Percentage {
        if let Some(caps) = percent.captures(sentence) {
            return Some(caps[1].replace(' ', ""));
        }
    }

    number
        .captures_iter(sentence)
        .filter(|caps| {
            // skip bare digits directly followed by a letter, e.g. "3rd"
            let end = caps.get(1).map_or(0, |m| m.end());
            !sentence[end..].starts_with(|c: char| c.is_alphabetic())
        })
        .find_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
}

/// Rule-based measure extraction over text chunks
///
/// Each distinct classifiable measure sentence becomes one record whose
/// context holds the previous, matching and next sentence of its chunk.
pub fn extract_measures<S: AsRef<str>>(article_id: &str, chunks: &[S]) -> Vec<MeasureRecord> {
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for chunk in chunks {
        let sentences = split_sentences(chunk.as_ref());

        for (i, sentence) in sentences.iter().enumerate() {
            if !is_measure_sentence(sentence) {
                continue;
            }

            let Some(category) = MeasureCategory::classify(sentence) else {
                debug!(article_id, sentence = %sentence, "Measure sentence without category keyword");
                continue;
            };

            if !seen.insert(sentence.clone()) {
                continue;
            }

            let start = i.saturating_sub(1);
            let end = (i + 2).min(sentences.len());
            let context = sentences[start..end].join(" ");

            records.push(MeasureRecord {
                article_id: article_id.to_string(),
                measure: sentence.clone(),
                category,
                value: extract_value(sentence, category).unwrap_or_default(),
                context,
                method: ExtractionMethod::Rules,
            });
        }
    }

    debug!(article_id, measures = records.len(), "Rule-based extraction finished");
    records
}
