//! End-to-end download job against a mocked NCBI server

#[path = "../common/mod.rs"]
mod common;

use telehealth_client::pipeline::{DownloadOptions, download_articles};
use telehealth_client::records::read_records;
use telehealth_client::{ArticleRecord, Client};
use tempfile::tempdir;
use tracing_test::traced_test;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{
    EFETCH_TWO_ARTICLES, STUDY_LINES, elink_response, esearch_response, mock_config,
    oa_pdf_response, pdf_with_text,
};

async fn mount_ncbi(mock_server: &MockServer) {
    let pdf_url = format!("{}/pdf/PMC7906746.pdf", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(esearch_response(&["33515491", "32511443"])),
        )
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EFETCH_TWO_ARTICLES))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/elink.fcgi"))
        .and(query_param("id", "32511443"))
        .respond_with(ResponseTemplate::new(200).set_body_string(elink_response("32511443", &[])))
        .expect(1)
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/oa.fcgi"))
        .and(query_param("id", "PMC7906746"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(oa_pdf_response("PMC7906746", &pdf_url)),
        )
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pdf/PMC7906746.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(pdf_with_text(STUDY_LINES)))
        .mount(mock_server)
        .await;
}

#[tokio::test]
#[traced_test]
async fn test_download_writes_one_row_per_article() {
    let mock_server = MockServer::start().await;
    mount_ncbi(&mock_server).await;

    let dir = tempdir().unwrap();
    let options = DownloadOptions::new()
        .with_num_articles(2)
        .with_output_dir(dir.path().join("articles"))
        .with_csv_path(dir.path().join("data").join("article_metadata.csv"));

    let client = Client::with_config(mock_config(&mock_server)).unwrap();
    let outcome = download_articles(&client.pubmed, &client.pmc, &options, &())
        .await
        .unwrap();

    assert_eq!(outcome.report.processed, 2);
    assert_eq!(outcome.pdf_count(), 1);
    assert_eq!(outcome.report.skipped.len(), 1);
    assert_eq!(outcome.report.skipped[0].id, "32511443");

    let rows: Vec<ArticleRecord> = read_records(&options.csv_path).unwrap();
    assert_eq!(rows.len(), 2);

    let first = &rows[0];
    assert_eq!(first.pmid, "33515491");
    assert_eq!(first.authors, "Smith Jane, Lee Min");
    assert_eq!(first.publication_year, Some(2021));
    assert_eq!(first.doi, "10.2196/24531");
    assert_eq!(first.data_source, "Electronic Health Records (EHR)");
    assert_eq!(first.telehealth_measure_type, "Rate, Percentage");
    assert!(first.pdf_path.ends_with("33515491.pdf"));
    assert!(std::path::Path::new(&first.pdf_path).exists());
    assert!(first.notes.is_empty());

    let second = &rows[1];
    assert_eq!(second.pmid, "32511443");
    assert_eq!(second.authors, "Primary Care Telehealth Collaborative");
    assert_eq!(second.publication_date, "2020 Nov-Dec");
    assert_eq!(second.study_type, "Cross-Sectional Study");
    assert_eq!(second.telehealth_measure_type, "Count");
    assert!(second.pdf_path.is_empty());
    assert!(second.notes.contains("No open access PDF available"));
    assert!(logs_contain("Metadata saved"));
}

#[tokio::test]
async fn test_skip_pdf_makes_no_pmc_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(esearch_response(&["33515491", "32511443"])),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EFETCH_TWO_ARTICLES))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/oa.fcgi"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let options = DownloadOptions::new()
        .with_output_dir(dir.path().join("articles"))
        .with_csv_path(dir.path().join("metadata.csv"))
        .with_pdf_downloads(false);

    let client = Client::with_config(mock_config(&mock_server)).unwrap();
    let outcome = download_articles(&client.pubmed, &client.pmc, &options, &())
        .await
        .unwrap();

    assert_eq!(outcome.records.len(), 2);
    assert!(outcome.report.is_clean());
    assert_eq!(outcome.pdf_count(), 0);
}

#[tokio::test]
async fn test_empty_search_writes_header_only() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(esearch_response(&[])))
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("metadata.csv");
    let options = DownloadOptions::new()
        .with_search_term("no such telehealth topic")
        .with_csv_path(&csv_path);

    let client = Client::with_config(mock_config(&mock_server)).unwrap();
    let outcome = download_articles(&client.pubmed, &client.pmc, &options, &())
        .await
        .unwrap();

    assert!(outcome.records.is_empty());
    let content = std::fs::read_to_string(&csv_path).unwrap();
    assert!(content.starts_with("pmid,title,authors,publication_year,journal"));
    assert_eq!(content.lines().count(), 1);
}
