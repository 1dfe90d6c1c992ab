//! EFetch XML parsing and metadata row construction from fixture strings

#[path = "../common/mod.rs"]
mod common;

use rstest::rstest;
use telehealth_client::pipeline::build_article_record;
use telehealth_client::pubmed::{parse_article_from_xml, parse_articles_from_xml};
use telehealth_client::TelehealthError;
use tracing_test::traced_test;

use common::EFETCH_TWO_ARTICLES;

#[test]
fn test_structured_abstract_is_labeled() {
    let article = parse_article_from_xml(EFETCH_TWO_ARTICLES, "33515491").unwrap();

    assert_eq!(
        article.abstract_text.as_deref(),
        Some(
            "BACKGROUND: Virtual care expanded rapidly in 2020. RESULTS: Telehealth visits \
             accounted for 45% of all encounters. The telemedicine adoption rate was 3.2 per \
             1000 patients."
        )
    );
    assert_eq!(article.mesh_terms, vec!["Telemedicine", "Electronic Health Records"]);
    assert_eq!(article.journal, "Journal of medical Internet research");
}

#[rstest]
#[case("33515491", "Telehealth use among older adults during the COVID-19 pandemic.")]
#[case("32511443", "Video visit volume in primary care clinics.")]
fn test_titles(#[case] pmid: &str, #[case] title: &str) {
    let article = parse_article_from_xml(EFETCH_TWO_ARTICLES, pmid).unwrap();
    assert_eq!(article.title, title);
}

#[test]
fn test_requested_pmid_missing() {
    let err = parse_article_from_xml(EFETCH_TWO_ARTICLES, "11111111").unwrap_err();
    assert!(matches!(err, TelehealthError::ArticleNotFound { .. }));
}

#[test]
#[traced_test]
fn test_batch_with_unusable_record() {
    let xml = EFETCH_TWO_ARTICLES.replace(
        "</PubmedArticleSet>",
        r#"<PubmedArticle><MedlineCitation><PMID Version="1">30000001</PMID></MedlineCitation></PubmedArticle></PubmedArticleSet>"#,
    );

    let articles = parse_articles_from_xml(&xml).unwrap();

    let pmids: Vec<&str> = articles.iter().map(|a| a.pmid.as_str()).collect();
    assert_eq!(pmids, vec!["33515491", "32511443"]);
}

#[test]
fn test_metadata_rows_from_parsed_articles() {
    let articles = parse_articles_from_xml(EFETCH_TWO_ARTICLES).unwrap();
    let rows: Vec<_> = articles.iter().map(build_article_record).collect();

    assert_eq!(rows[0].article_type, "Journal Article");
    assert_eq!(rows[0].mesh_terms, "Telemedicine, Electronic Health Records");
    assert_eq!(rows[0].study_type, "Not clearly specified");
    assert_eq!(
        rows[0].telehealth_measures,
        "RESULTS: Telehealth visits accounted for 45% of all encounters.; \
         The telemedicine adoption rate was 3.2 per 1000 patients."
    );

    assert_eq!(rows[1].publication_year, Some(2020));
    assert_eq!(rows[1].data_source, "Survey/Questionnaire");
    assert_eq!(
        rows[1].telehealth_measures,
        "The number of video visits per clinic grew each month."
    );
}
