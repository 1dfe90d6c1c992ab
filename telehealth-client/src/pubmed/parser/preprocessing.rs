//! XML preprocessing utilities for the PubMed parser

use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Strip inline formatting tags from EFetch XML
///
/// Tags like `<i>`, `<sup>`, `<sub>`, `<b>` appear in `AbstractText` and
/// `ArticleTitle` and break quick-xml's serde deserializer, which expects
/// those elements to hold plain text.
///
/// ```ignore
/// let xml = "<AbstractText>CO<sup>2</sup> levels</AbstractText>";
/// assert_eq!(strip_inline_html_tags(xml), "<AbstractText>CO2 levels</AbstractText>");
/// ```
pub(crate) fn strip_inline_html_tags(xml: &str) -> String {
    static INLINE_TAG_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = INLINE_TAG_REGEX.get_or_init(|| {
        Regex::new(r"</?(?:i|b|u|sup|sub|em|strong|italic|bold|sc)(?:\s[^>]*)?>")
            .expect("inline tag regex is valid")
    });

    let cleaned = re.replace_all(xml, "");

    if cleaned.len() != xml.len() {
        debug!(
            original_bytes = xml.len(),
            cleaned_bytes = cleaned.len(),
            "Stripped inline HTML tags"
        );
    }

    cleaned.into_owned()
}
