//! PubMed client tests against a mocked E-utilities server
//!
//! wiremock stands in for NCBI so search, fetch, PMC lookup and the retry
//! layer can be exercised without network access.

#[path = "../common/mod.rs"]
mod common;

use telehealth_client::{PubMedClient, SortOrder, TelehealthError};
use tracing_test::traced_test;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{EFETCH_TWO_ARTICLES, elink_response, esearch_response, mock_config};

fn create_mock_client(mock_server: &MockServer) -> PubMedClient {
    PubMedClient::with_config(mock_config(mock_server)).expect("client should build")
}

#[tokio::test]
#[traced_test]
async fn test_search_returns_pmids_with_sort_and_api_params() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("db", "pubmed"))
        .and(query_param("term", "telehealth utilization measures"))
        .and(query_param("retmax", "20"))
        .and(query_param("sort", "pub_date"))
        .and(query_param("tool", "telehealth-tests"))
        .and(query_param("email", "tests@example.org"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(esearch_response(&["33515491", "32511443"])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = mock_config(&mock_server)
        .with_tool("telehealth-tests")
        .with_email("tests@example.org");
    let client = PubMedClient::with_config(config).unwrap();

    let pmids = client
        .search_articles(
            "telehealth utilization measures",
            20,
            Some(&SortOrder::PublicationDate),
        )
        .await
        .unwrap();

    assert_eq!(pmids, vec!["33515491", "32511443"]);
    assert!(logs_contain("ESearch completed"));
}

#[tokio::test]
async fn test_search_error_field_becomes_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"esearchresult": {"ERROR": "Invalid query syntax", "idlist": []}}"#,
        ))
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let err = client
        .search_articles("telehealth[[", 10, None)
        .await
        .unwrap_err();

    match err {
        TelehealthError::ApiError { status, message } => {
            assert_eq!(status, 200);
            assert!(message.contains("Invalid query syntax"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_search_limit_is_checked_before_any_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let err = client
        .search_articles("telehealth", 10_000, None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TelehealthError::SearchLimitExceeded {
            requested: 10_000,
            maximum: 9999
        }
    ));
}

#[tokio::test]
#[traced_test]
async fn test_fetch_articles_parses_batch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("id", "33515491,32511443"))
        .and(query_param("retmode", "xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(EFETCH_TWO_ARTICLES)
                .insert_header("content-type", "application/xml"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let articles = client
        .fetch_articles(&["33515491", "32511443"])
        .await
        .unwrap();

    assert_eq!(articles.len(), 2);

    let first = &articles[0];
    assert_eq!(first.pmid, "33515491");
    assert_eq!(
        first.title,
        "Telehealth use among older adults during the COVID-19 pandemic."
    );
    assert_eq!(first.author_list().as_deref(), Some("Smith Jane, Lee Min"));
    assert_eq!(first.pmc_id.as_deref(), Some("PMC7906746"));
    assert_eq!(first.doi.as_deref(), Some("10.2196/24531"));
    assert_eq!(first.pub_date.display(), "2021/Mar/1");

    let second = &articles[1];
    assert_eq!(
        second.author_list().as_deref(),
        Some("Primary Care Telehealth Collaborative")
    );
    assert_eq!(second.pub_date.year_number(), Some(2020));
    assert!(second.pmc_id.is_none());
}

#[tokio::test]
async fn test_invalid_pmid_fails_without_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let err = client
        .fetch_articles(&["33515491", "not-a-pmid"])
        .await
        .unwrap_err();

    assert!(matches!(err, TelehealthError::InvalidPmid { .. }));
}

#[tokio::test]
#[traced_test]
async fn test_server_error_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(esearch_response(&["33515491"])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let pmids = client.search_articles("telehealth", 5, None).await.unwrap();

    assert_eq!(pmids, vec!["33515491"]);
    assert!(logs_contain("Transient failure, retrying"));
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let err = client
        .search_articles("telehealth", 5, None)
        .await
        .unwrap_err();

    assert!(matches!(err, TelehealthError::ApiError { status: 404, .. }));
}

#[tokio::test]
async fn test_check_pmc_availability() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/elink.fcgi"))
        .and(query_param("id", "33515491"))
        .and(query_param("linkname", "pubmed_pmc"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(elink_response("33515491", &["7906746"])),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/elink.fcgi"))
        .and(query_param("id", "32511443"))
        .respond_with(ResponseTemplate::new(200).set_body_string(elink_response("32511443", &[])))
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);

    let linked = client.check_pmc_availability("33515491").await.unwrap();
    assert_eq!(linked.map(|id| id.to_string()).as_deref(), Some("PMC7906746"));

    let unlinked = client.check_pmc_availability("32511443").await.unwrap();
    assert!(unlinked.is_none());
}
