//! Gemini client against a mock HTTP server.

use std::sync::Arc;

use image::DynamicImage;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wound_care::{
    DiagnosticAdapter, Diagnosis, GeminiClient, GeminiConfig, VisionLanguageModel, WoundError,
};

const GENERATE_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

fn client_for(server: &MockServer) -> GeminiClient {
    let mut config = GeminiConfig::new("test-key");
    config.endpoint = server.uri();
    GeminiClient::new(config).unwrap()
}

fn reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] }
        }]
    }))
}

#[tokio::test]
async fn test_generate_sends_image_and_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{
                "role": "user",
                "parts": [
                    { "inline_data": { "mime_type": "image/png" } },
                    { "text": "is it infected?" }
                ]
            }]
        })))
        .respond_with(reply("Not infected"))
        .expect(1)
        .mount(&server)
        .await;

    let text = client_for(&server)
        .generate(b"\x89PNG", "is it infected?")
        .await
        .unwrap();
    assert_eq!(text, "Not infected");
}

#[tokio::test]
async fn test_http_error_is_diagnostic_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate(b"png", "prompt")
        .await
        .unwrap_err();
    assert!(matches!(err, WoundError::Diagnostic(_)));
    assert!(err.to_string().contains("403"));
}

#[tokio::test]
async fn test_empty_candidates_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate(b"png", "prompt")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no text"));
}

#[tokio::test]
async fn test_adapter_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(reply("infected\n"))
        .mount(&server)
        .await;

    let adapter = DiagnosticAdapter::new(Arc::new(client_for(&server)));
    let diagnosis = adapter.diagnose(&DynamicImage::new_rgb8(8, 8)).await;
    assert_eq!(diagnosis, Diagnosis::Infected);
}

#[tokio::test]
async fn test_adapter_absorbs_server_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let adapter = DiagnosticAdapter::new(Arc::new(client_for(&server)));
    let diagnosis = adapter.diagnose(&DynamicImage::new_rgb8(8, 8)).await;
    assert!(diagnosis.is_failure());
    assert!(diagnosis.to_string().starts_with("Error: "));
}
