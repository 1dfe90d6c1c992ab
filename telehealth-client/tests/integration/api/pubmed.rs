//! PubMed E-utilities tests against the real NCBI service
//!
//! **IMPORTANT**: These tests are only run when:
//! 1. The `integration-tests` feature is enabled
//! 2. The `TELEHEALTH_REAL_API_TESTS` environment variable is set
//!
//! To run these tests:
//! ```bash
//! TELEHEALTH_REAL_API_TESTS=1 cargo test --features integration-tests --test pubmed_api_tests
//! ```

#[path = "../common/mod.rs"]
mod common;

#[cfg(feature = "integration-tests")]
mod integration_tests {
    use tracing::info;
    use tracing_test::traced_test;

    use telehealth_client::SortOrder;
    use telehealth_client::pipeline::build_article_record;

    use crate::common::integration_test_utils::{
        TEST_PMIDS_STR, TEST_SEARCH_QUERIES, create_test_pubmed_client, should_run_real_api_tests,
    };

    #[tokio::test]
    #[traced_test]
    async fn test_search_telehealth_queries() {
        if !should_run_real_api_tests() {
            info!("Skipping real API test - enable with TELEHEALTH_REAL_API_TESTS=1");
            return;
        }

        let client = create_test_pubmed_client();

        for query in TEST_SEARCH_QUERIES {
            let pmids = client
                .search_articles(query, 5, Some(&SortOrder::Relevance))
                .await
                .expect("search should succeed");

            info!(query, count = pmids.len(), "Search finished");
            assert!(pmids.len() <= 5);
            assert!(pmids.iter().all(|p| p.chars().all(|c| c.is_ascii_digit())));
        }
    }

    #[tokio::test]
    #[traced_test]
    async fn test_fetch_known_articles() {
        if !should_run_real_api_tests() {
            info!("Skipping real API test - enable with TELEHEALTH_REAL_API_TESTS=1");
            return;
        }

        let client = create_test_pubmed_client();
        let articles = client
            .fetch_articles(TEST_PMIDS_STR)
            .await
            .expect("fetch should succeed");

        assert!(!articles.is_empty());
        for article in &articles {
            let record = build_article_record(article);
            assert!(!record.title.is_empty());
            assert!(!record.journal.is_empty());
            info!(pmid = %record.pmid, measure_types = %record.telehealth_measure_type, "Fetched");
        }
    }

    #[tokio::test]
    #[traced_test]
    async fn test_pmc_link_lookup() {
        if !should_run_real_api_tests() {
            info!("Skipping real API test - enable with TELEHEALTH_REAL_API_TESTS=1");
            return;
        }

        let client = create_test_pubmed_client();
        let result = client.check_pmc_availability(TEST_PMIDS_STR[0]).await;

        assert!(result.is_ok(), "ELink request failed: {:?}", result.err());
    }
}
