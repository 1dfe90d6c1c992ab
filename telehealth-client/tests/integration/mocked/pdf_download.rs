//! PMC Open Access lookup and PDF download against a mocked server

#[path = "../common/mod.rs"]
mod common;

use telehealth_client::{PmcClient, TelehealthError};
use tempfile::tempdir;
use tracing_test::traced_test;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{STUDY_LINES, mock_config, oa_not_available_response, oa_pdf_response, pdf_with_text};

fn create_mock_client(mock_server: &MockServer) -> PmcClient {
    PmcClient::with_config(mock_config(mock_server)).expect("client should build")
}

#[tokio::test]
#[traced_test]
async fn test_find_and_download_pdf() {
    let mock_server = MockServer::start().await;
    let pdf_url = format!("{}/pdf/PMC7906746.pdf", mock_server.uri());
    let pdf_bytes = pdf_with_text(STUDY_LINES);

    Mock::given(method("GET"))
        .and(path("/oa.fcgi"))
        .and(query_param("id", "PMC7906746"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(oa_pdf_response("PMC7906746", &pdf_url)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pdf/PMC7906746.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(pdf_bytes.clone())
                .insert_header("content-type", "application/pdf"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);

    let link = client.find_pdf_link("7906746").await.unwrap().unwrap();
    assert_eq!(link.pmcid.to_string(), "PMC7906746");
    assert_eq!(link.url, pdf_url);
    assert_eq!(link.license.as_deref(), Some("CC BY"));

    let dir = tempdir().unwrap();
    let dest = dir.path().join("articles").join("33515491.pdf");
    let written = client.download_pdf(&link.url, &dest).await.unwrap();

    assert_eq!(written, pdf_bytes.len() as u64);
    assert_eq!(std::fs::read(&dest).unwrap(), pdf_bytes);
    assert!(logs_contain("PDF downloaded"));
}

#[tokio::test]
async fn test_article_outside_oa_subset() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/oa.fcgi"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(oa_not_available_response("PMC1234567")),
        )
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let link = client.find_pdf_link("PMC1234567").await.unwrap();

    assert!(link.is_none());
}

#[tokio::test]
async fn test_invalid_pmcid_is_rejected() {
    let mock_server = MockServer::start().await;
    let client = create_mock_client(&mock_server);

    let err = client.find_pdf_link("PMCabc").await.unwrap_err();
    assert!(matches!(err, TelehealthError::InvalidPmcid { .. }));
}

#[tokio::test]
async fn test_html_landing_page_is_not_saved() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pdf/paywalled.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body>Please sign in</body></html>")
                .insert_header("content-type", "text/html"),
        )
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let dir = tempdir().unwrap();
    let dest = dir.path().join("paywalled.pdf");

    let err = client
        .download_pdf(&format!("{}/pdf/paywalled.pdf", mock_server.uri()), &dest)
        .await
        .unwrap_err();

    assert!(matches!(err, TelehealthError::InvalidPdf { .. }));
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_missing_pdf_is_an_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pdf/missing.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let dir = tempdir().unwrap();
    let dest = dir.path().join("missing.pdf");

    let err = client
        .download_pdf(&format!("{}/pdf/missing.pdf", mock_server.uri()), &dest)
        .await
        .unwrap_err();

    assert!(matches!(err, TelehealthError::ApiError { status: 404, .. }));
    assert!(!dest.exists());
}
