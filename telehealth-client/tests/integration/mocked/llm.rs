//! Chat-completions classification against a mocked endpoint

use serde_json::json;
use telehealth_client::llm::{LlmClient, LlmConfig};
use telehealth_client::{
    ExtractionMethod, MeasureCategory, MeasureExtractor, RetryConfig, TelehealthError,
};
use tracing_test::traced_test;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "gpt-3.5-turbo",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 512, "completion_tokens": 64, "total_tokens": 576}
    })
}

fn create_client(mock_server: &MockServer) -> LlmClient {
    let config = LlmConfig::new("sk-test")
        .with_base_url(format!("{}/v1", mock_server.uri()))
        .with_retry_config(RetryConfig::none());
    LlmClient::new(config).expect("client should build")
}

#[tokio::test]
#[traced_test]
async fn test_classify_chunk() {
    let mock_server = MockServer::start().await;

    let answer = json!({"measures": [
        {"description": "Share of encounters by telehealth", "category": "Percentage", "value": "45%"},
        {"description": "Telehealth visits per month", "category": "rate", "value": 3.2},
        {"description": "Patient satisfaction", "category": "Clinical", "value": "high"}
    ]})
    .to_string();

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-3.5-turbo",
            "temperature": 0.3,
            "max_tokens": 1000,
            "response_format": {"type": "json_object"}
        })))
        .and(body_string_contains("45% of all encounters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(&answer)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let measures = client
        .classify_chunk("Telehealth visits accounted for 45% of all encounters.")
        .await
        .unwrap();

    assert_eq!(measures.len(), 2);
    assert_eq!(measures[0].category, MeasureCategory::Percentage);
    assert_eq!(measures[0].value, "45%");
    assert_eq!(measures[1].category, MeasureCategory::Rate);
    assert_eq!(measures[1].value, "3.2");
    assert!(logs_contain("Dropping measure with unknown category"));
}

#[tokio::test]
async fn test_http_error_carries_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string(
            r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let err = client.classify_chunk("Telehealth use").await.unwrap_err();

    match err {
        TelehealthError::ApiError { status, message } => {
            assert_eq!(status, 401);
            assert!(message.contains("Incorrect API key provided"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unparseable_content() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("I could not find any measures in this text.")),
        )
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let err = client.classify_chunk("Telehealth use").await.unwrap_err();

    assert!(matches!(err, TelehealthError::LlmResponse(_)));
}

#[tokio::test]
#[traced_test]
async fn test_failed_chunk_does_not_fail_article() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("FIRST-CHUNK"))
        .respond_with(ResponseTemplate::new(400).set_body_string("context length exceeded"))
        .mount(&mock_server)
        .await;

    let answer = json!({"measures": [
        {"description": "Number of video visits", "category": "Count", "value": 1200}
    ]})
    .to_string();
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("SECOND-CHUNK"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(&answer)))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let chunks = vec![
        "FIRST-CHUNK telehealth text".to_string(),
        "SECOND-CHUNK telehealth text".to_string(),
    ];

    let records = client.extract("33515491", &chunks).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].article_id, "33515491");
    assert_eq!(records[0].category, MeasureCategory::Count);
    assert_eq!(records[0].value, "1200");
    assert_eq!(records[0].method, ExtractionMethod::Llm);
    assert!(logs_contain("LLM analysis of chunk failed"));
}

#[tokio::test]
async fn test_article_fails_when_every_chunk_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let chunks = vec!["telehealth text".to_string()];

    let err = client.extract("33515491", &chunks).await.unwrap_err();
    assert!(matches!(err, TelehealthError::ApiError { status: 400, .. }));
}
