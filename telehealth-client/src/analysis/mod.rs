//! Rule-based analysis of article text
//!
//! - `measures` - telehealth measure sentences and their category
//! - `study` - study design, data source, population and bibliographic
//!   heuristics for PDFs
//! - `text` - sentence splitting and keyword matching

pub mod measures;
pub mod study;
mod text;

pub use measures::{
    MeasureCategory, OTHER_CATEGORY, categorize_measures, extract_measures, extract_value,
    find_measure_sentences, is_measure_sentence,
};
pub use study::{
    NOT_SPECIFIED, classify_article_design, extract_authors, extract_publication_year, extract_sample_size,
    extract_study_duration, extract_title, identify_data_source, identify_population,
    identify_study_design, profile_study,
};
pub use text::{KeywordSet, normalize_whitespace, split_sentences};
