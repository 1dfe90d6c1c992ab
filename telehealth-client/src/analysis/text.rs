//! Sentence splitting and keyword matching

use regex::{Regex, RegexBuilder};

use crate::error::{Result, TelehealthError};

/// Collapse runs of whitespace into single spaces and trim the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split text into sentences
///
/// Whitespace is collapsed first; a sentence ends after `.`, `!` or `?`
/// followed by whitespace.
///
/// ```
/// use telehealth_client::analysis::split_sentences;
///
/// let sentences = split_sentences("Use rose 20%.  Video  visits doubled! Why?");
/// assert_eq!(sentences, vec!["Use rose 20%.", "Video visits doubled!", "Why?"]);
/// ```
pub fn split_sentences(text: &str) -> Vec<String> {
    let normalized = normalize_whitespace(text);
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = normalized.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') && chars.peek() == Some(&' ') {
            chars.next();
            sentences.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        sentences.push(current);
    }

    sentences
}

/// Case-insensitive alternation of keywords
///
/// Keywords starting or ending with a word character are anchored on word
/// boundaries there, so `rate` does not match `generated` while `%` still
/// matches `45%`.
#[derive(Debug, Clone)]
pub struct KeywordSet {
    keywords: Vec<&'static str>,
    regex: Regex,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl KeywordSet {
    pub fn new(keywords: &[&'static str]) -> Result<Self> {
        let alternatives: Vec<String> = keywords
            .iter()
            .map(|keyword| {
                let mut pattern = String::new();
                if keyword.starts_with(is_word_char) {
                    pattern.push_str(r"\b");
                }
                pattern.push_str(&regex::escape(keyword));
                if keyword.ends_with(is_word_char) {
                    pattern.push_str(r"\b");
                }
                pattern
            })
            .collect();

        let regex = RegexBuilder::new(&alternatives.join("|"))
            .case_insensitive(true)
            .build()
            .map_err(|e| TelehealthError::Config(format!("invalid keyword pattern: {e}")))?;

        Ok(Self {
            keywords: keywords.to_vec(),
            regex,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    pub fn keywords(&self) -> &[&'static str] {
        &self.keywords
    }
}
