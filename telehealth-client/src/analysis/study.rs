//! Study characteristic heuristics
//!
//! Ordered keyword tables and regex patterns that guess the design, data
//! source, population, sample size and duration of a study, plus the title,
//! authors and publication year of a PDF whose metadata is unknown.

use std::path::Path;
use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};

use super::text::KeywordSet;
use crate::records::StudyProfile;

/// Value reported when no heuristic matched
pub const NOT_SPECIFIED: &str = "Not clearly specified";

/// Author value when no author line was recognized
pub const AUTHORS_NOT_EXTRACTED: &str = "Not extracted";

type Table = &'static [(&'static str, &'static [&'static str])];

const STUDY_DESIGNS: Table = &[
    (
        "Randomized Controlled Trial (RCT)",
        &["randomized controlled trial", "rct", "randomized clinical trial"],
    ),
    (
        "Cohort Study",
        &["cohort study", "longitudinal study", "prospective cohort", "retrospective cohort"],
    ),
    ("Case-Control Study", &["case-control", "case control"]),
    ("Cross-Sectional Study", &["cross-sectional", "cross sectional"]),
    (
        "Qualitative Study",
        &["qualitative study", "qualitative research", "interview study", "focus group"],
    ),
    ("Systematic Review", &["systematic review", "systematic literature review"]),
    ("Meta-Analysis", &["meta-analysis", "meta analysis"]),
    ("Review Article", &["review article", "literature review", "narrative review"]),
    ("Mixed Methods", &["mixed methods", "mixed-methods"]),
    (
        "Quasi-Experimental",
        &["quasi-experimental", "quasi experimental", "non-randomized trial"],
    ),
    ("Case Series", &["case series", "case report"]),
    ("Observational Study", &["observational study", "observational research"]),
    ("Pre-Post Study", &["pre-post", "pre post", "before and after", "before-after"]),
    (
        "Secondary Analysis",
        &["secondary analysis", "secondary data", "retrospective analysis"],
    ),
    (
        "Pilot/Feasibility Study",
        &["pilot study", "pilot trial", "feasibility study"],
    ),
];

const DATA_SOURCES: Table = &[
    (
        "Electronic Health Records (EHR)",
        &[
            "electronic health record",
            "electronic health records",
            "ehr",
            "electronic medical record",
            "electronic medical records",
            "emr",
            "medical record",
            "medical records",
        ],
    ),
    (
        "Insurance Claims",
        &["claims data", "insurance claims", "medicare claims", "medicaid claims", "billing data"],
    ),
    (
        "Survey/Questionnaire",
        &[
            "survey",
            "questionnaire",
            "self-report",
            "self report",
            "patient-reported",
            "patient reported",
        ],
    ),
    (
        "Interviews/Focus Groups",
        &["interview", "interviews", "focus group", "qualitative data", "semi-structured interview"],
    ),
    (
        "Registry/Database",
        &["registry", "database", "data repository", "data warehouse"],
    ),
    (
        "Veterans Health Administration (VHA) Data",
        &["veterans", "va", "veterans health administration", "vha", "va health"],
    ),
    (
        "Clinical Trial Data",
        &["clinical trial", "trial data", "randomized trial data"],
    ),
    ("Administrative Data", &["administrative data", "administrative records"]),
    (
        "Social Media Data",
        &["social media", "twitter", "facebook", "instagram", "online platform"],
    ),
    (
        "Wearable/Sensor Data",
        &["wearable", "sensor", "monitoring device", "remote monitoring"],
    ),
    (
        "Mobile App Data",
        &["mobile app", "smartphone app", "application data", "app-based"],
    ),
];

const POPULATIONS: Table = &[
    ("General Adult Population", &["adult", "adults", "general population"]),
    (
        "Pediatric/Youth",
        &["pediatric", "children", "adolescent", "adolescents", "youth", "child", "teen"],
    ),
    (
        "Elderly",
        &["elderly", "older adult", "older adults", "geriatric", "senior", "aged 65", "65 years and older"],
    ),
    ("Veterans", &["veteran", "veterans", "military", "service member", "armed forces"]),
    ("Rural Population", &["rural", "remote area", "underserved area"]),
    ("Urban Population", &["urban", "city", "metropolitan"]),
    (
        "Low-Income",
        &["low income", "low-income", "poverty", "disadvantaged", "medicaid"],
    ),
    (
        "Chronic Disease Patients",
        &["chronic disease", "chronic condition", "chronic illness"],
    ),
    (
        "Mental Health Patients",
        &["mental health", "psychiatric", "depression", "anxiety", "psychological"],
    ),
    (
        "Healthcare Providers",
        &[
            "provider",
            "providers",
            "physician",
            "physicians",
            "clinician",
            "clinicians",
            "doctor",
            "nurse",
            "healthcare professional",
        ],
    ),
    (
        "Specific Ethnic Groups",
        &[
            "ethnic",
            "racial",
            "minority",
            "hispanic",
            "latino",
            "african american",
            "black",
            "asian",
        ],
    ),
    ("Pregnant Women", &["pregnant", "pregnancy", "maternal", "prenatal"]),
    (
        "COVID-19 Patients",
        &["covid", "covid-19", "coronavirus", "sars-cov-2", "pandemic patient"],
    ),
];

/// Compiled form of a label table, in table order
struct CompiledTable(Vec<(&'static str, KeywordSet)>);

impl CompiledTable {
    fn compile(table: Table) -> Self {
        Self(
            table
                .iter()
                .map(|(label, keywords)| {
                    (*label, KeywordSet::new(keywords).expect("keyword table is valid"))
                })
                .collect(),
        )
    }

    fn first_match(&self, text: &str) -> Option<&'static str> {
        self.0
            .iter()
            .find(|(_, keywords)| keywords.is_match(text))
            .map(|(label, _)| *label)
    }

    fn all_matches(&self, text: &str) -> Vec<&'static str> {
        self.0
            .iter()
            .filter(|(_, keywords)| keywords.is_match(text))
            .map(|(label, _)| *label)
            .collect()
    }
}

fn study_designs() -> &'static CompiledTable {
    static TABLE: OnceLock<CompiledTable> = OnceLock::new();
    TABLE.get_or_init(|| CompiledTable::compile(STUDY_DESIGNS))
}

fn data_sources() -> &'static CompiledTable {
    static TABLE: OnceLock<CompiledTable> = OnceLock::new();
    TABLE.get_or_init(|| CompiledTable::compile(DATA_SOURCES))
}

fn populations() -> &'static CompiledTable {
    static TABLE: OnceLock<CompiledTable> = OnceLock::new();
    TABLE.get_or_init(|| CompiledTable::compile(POPULATIONS))
}

/// First matching study design, or [`NOT_SPECIFIED`]
pub fn identify_study_design(text: &str) -> &'static str {
    study_designs().first_match(text).unwrap_or(NOT_SPECIFIED)
}

/// One row of the article design table
///
/// Terms match at the start of a word, so `interview` also finds
/// "interviewed" and `review` finds "Reviews".
struct DesignRule {
    label: &'static str,
    publication_type: &'static [&'static str],
    abstract_terms: &'static [&'static str],
}

const ARTICLE_DESIGNS: &[DesignRule] = &[
    DesignRule {
        label: "Randomized Controlled Trial (RCT)",
        publication_type: &["randomized controlled trial"],
        abstract_terms: &["rct"],
    },
    DesignRule {
        label: "Cohort Study",
        publication_type: &[],
        abstract_terms: &["cohort", "longitudinal"],
    },
    DesignRule {
        label: "Case-Control Study",
        publication_type: &[],
        abstract_terms: &["case-control"],
    },
    DesignRule {
        label: "Cross-Sectional Study",
        publication_type: &[],
        abstract_terms: &["cross-sectional"],
    },
    DesignRule {
        label: "Qualitative Study",
        publication_type: &[],
        abstract_terms: &["qualitative", "interview", "focus group"],
    },
    DesignRule {
        label: "Systematic Review",
        publication_type: &["systematic review"],
        abstract_terms: &["systematic review"],
    },
    DesignRule {
        label: "Meta-Analysis",
        publication_type: &["meta-analysis"],
        abstract_terms: &["meta-analysis"],
    },
    DesignRule {
        label: "Review Article",
        publication_type: &["review"],
        abstract_terms: &[],
    },
    DesignRule {
        label: "Retrospective Study",
        publication_type: &[],
        abstract_terms: &["retrospective"],
    },
    DesignRule {
        label: "Prospective Study",
        publication_type: &[],
        abstract_terms: &["prospective"],
    },
];

fn word_prefix_regex(terms: &[&str]) -> Option<Regex> {
    if terms.is_empty() {
        return None;
    }
    let alternatives: Vec<String> = terms
        .iter()
        .map(|term| format!(r"\b{}", regex::escape(term)))
        .collect();
    Some(
        RegexBuilder::new(&alternatives.join("|"))
            .case_insensitive(true)
            .build()
            .expect("design term regex is valid"),
    )
}

fn article_designs() -> &'static [(&'static str, Option<Regex>, Option<Regex>)] {
    static RULES: OnceLock<Vec<(&'static str, Option<Regex>, Option<Regex>)>> = OnceLock::new();
    RULES.get_or_init(|| {
        ARTICLE_DESIGNS
            .iter()
            .map(|rule| {
                (
                    rule.label,
                    word_prefix_regex(rule.publication_type),
                    word_prefix_regex(rule.abstract_terms),
                )
            })
            .collect()
    })
}

/// Study design of an article from its publication types and abstract,
/// or [`NOT_SPECIFIED`]
pub fn classify_article_design(publication_types: &str, abstract_text: &str) -> &'static str {
    article_designs()
        .iter()
        .find(|(_, by_type, by_abstract)| {
            by_type.as_ref().is_some_and(|re| re.is_match(publication_types))
                || by_abstract.as_ref().is_some_and(|re| re.is_match(abstract_text))
        })
        .map(|(label, _, _)| *label)
        .unwrap_or(NOT_SPECIFIED)
}

/// First matching data source, or [`NOT_SPECIFIED`]
pub fn identify_data_source(text: &str) -> &'static str {
    data_sources().first_match(text).unwrap_or(NOT_SPECIFIED)
}

/// Every matching population joined with `", "`, or [`NOT_SPECIFIED`]
pub fn identify_population(text: &str) -> String {
    let found = populations().all_matches(text);
    if found.is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        found.join(", ")
    }
}

fn compile_all(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("heuristic regex is valid"))
        .collect()
}

/// Reported number of participants, if it exceeds 10
pub fn extract_sample_size(text: &str) -> Option<u64> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    let patterns = PATTERNS.get_or_init(|| {
        compile_all(&[
            r"\b[nN]\s*=\s*(\d+(?:,\d+)*)",
            r"(?i)(?:sample|cohort|population|participants|subjects|patients)\s+(?:size|of)\s+(?:was|were|of)?\s*(?::|was|were)?\s*(\d+(?:,\d+)*)",
            r"(?i)(?:included|enrolled|recruited|analyzed)\s+(\d+(?:,\d+)*)\s+(?:patients|participants|subjects|individuals)",
            r"(?i)(\d+(?:,\d+)*)\s+(?:patients|participants|subjects|individuals)\s+(?:were|was)\s+(?:included|enrolled|recruited|analyzed)",
            r"(?i)data\s+(?:was|were)\s+collected\s+from\s+(\d+(?:,\d+)*)\s+(?:patients|participants|subjects|individuals)",
        ])
    });

    patterns.iter().find_map(|re| {
        let caps = re.captures(text)?;
        let size: u64 = caps[1].replace(',', "").parse().ok()?;
        (size > 10).then_some(size)
    })
}

fn pluralize(count: &str, unit: &str) -> String {
    let plural = count.parse::<u64>().is_ok_and(|n| n > 1);
    if plural && !unit.ends_with('s') {
        format!("{unit}s")
    } else {
        unit.to_string()
    }
}

/// Study period such as `"6 months"`, `"6-12 months"` or
/// `"January 2020 to December 2021"`
pub fn extract_study_duration(text: &str) -> Option<String> {
    static SIMPLE: OnceLock<Vec<Regex>> = OnceLock::new();
    static RANGE: OnceLock<Regex> = OnceLock::new();
    static BETWEEN: OnceLock<Regex> = OnceLock::new();

    let simple = SIMPLE.get_or_init(|| {
        compile_all(&[
            r"(?i)(?:study|trial|analysis)\s+(?:period|duration)\s+(?:was|of)\s+(\d+)\s+(day|week|month|year)s?",
            r"(?i)(?:followed|monitored|tracked)\s+(?:for|over)\s+(?:a\s+period\s+of\s+)?(\d+)\s+(day|week|month|year)s?",
            r"(?i)(?:data\s+(?:were|was)\s+collected|study\s+was\s+conducted)\s+(?:over|during|for)\s+(?:a\s+period\s+of\s+)?(\d+)\s+(day|week|month|year)s?",
        ])
    });
    let range = RANGE.get_or_init(|| {
        Regex::new(r"(?i)(\d+)(?:-|\s+to\s+)(\d+)\s+(day|week|month|year)s?\s+(?:study|period|duration)")
            .expect("heuristic regex is valid")
    });
    let between = BETWEEN.get_or_init(|| {
        Regex::new(r"(?i)between\s+(\w+\s+\d{4})\s+and\s+(\w+\s+\d{4})")
            .expect("heuristic regex is valid")
    });

    if let Some(caps) = simple.iter().find_map(|re| re.captures(text)) {
        let unit = caps[2].to_lowercase();
        return Some(format!("{} {}", &caps[1], pluralize(&caps[1], &unit)));
    }

    if let Some(caps) = range.captures(text) {
        let unit = caps[3].to_lowercase();
        return Some(format!(
            "{}-{} {}",
            &caps[1],
            &caps[2],
            pluralize(&caps[2], &unit)
        ));
    }

    between
        .captures(text)
        .map(|caps| format!("{} to {}", &caps[1], &caps[2]))
}

fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Publication year of a PDF
///
/// A parenthesised year such as `(2021)` wins; otherwise the latest year
/// between 1990 and `reference_year` in the first 2,000 characters.
pub fn extract_publication_year(text: &str, reference_year: u16) -> Option<u16> {
    static CITATION_YEAR: OnceLock<Regex> = OnceLock::new();
    static YEAR: OnceLock<Regex> = OnceLock::new();

    let citation_year = CITATION_YEAR.get_or_init(|| {
        Regex::new(r"\(\s*(20\d{2}|19\d{2})\s*\)").expect("year regex is valid")
    });
    let year = YEAR
        .get_or_init(|| Regex::new(r"\b(20\d{2}|199\d)\b").expect("year regex is valid"));

    if let Some(found) = citation_year
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse::<u16>().ok())
        .find(|y| *y <= reference_year)
    {
        return Some(found);
    }

    year.captures_iter(char_prefix(text, 2000))
        .filter_map(|caps| caps[1].parse::<u16>().ok())
        .filter(|y| *y <= reference_year)
        .max()
}

/// Title of a PDF: the first line longer than 15 characters among the first
/// 10 lines that is not a URL, else the file stem with `_` replaced by spaces
pub fn extract_title(text: &str, path: &Path) -> String {
    text.lines()
        .take(10)
        .map(str::trim)
        .find(|line| line.chars().count() > 15 && !line.starts_with("http"))
        .map(str::to_string)
        .unwrap_or_else(|| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().replace('_', " "))
                .unwrap_or_default()
        })
}

/// Author line of a PDF, or [`AUTHORS_NOT_EXTRACTED`]
pub fn extract_authors(text: &str) -> String {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    let patterns = PATTERNS.get_or_init(|| {
        compile_all(&[
            r"(?i)\bby\s+([\w ,.]+)",
            r"(?i)\bauthors?[: ]+([\w ,.]+)",
            r"(?i)([\w ,.]+)\s+Department of",
            r"(?i)([\w ,.]+)\s+University",
        ])
    });

    let head = char_prefix(text, 1000);
    patterns
        .iter()
        .find_map(|re| {
            let caps = re.captures(head)?;
            let authors = caps[1].trim();
            (!authors.is_empty()).then(|| authors.to_string())
        })
        .unwrap_or_else(|| AUTHORS_NOT_EXTRACTED.to_string())
}

/// Run every heuristic over the text of one PDF
pub fn profile_study(article_id: &str, text: &str, path: &Path, reference_year: u16) -> StudyProfile {
    StudyProfile {
        article_id: article_id.to_string(),
        title: extract_title(text, path),
        authors: extract_authors(text),
        publication_year: extract_publication_year(text, reference_year),
        study_design: identify_study_design(text).to_string(),
        data_source: identify_data_source(text).to_string(),
        population: identify_population(text),
        sample_size: extract_sample_size(text),
        study_duration: extract_study_duration(text).unwrap_or_default(),
    }
}
