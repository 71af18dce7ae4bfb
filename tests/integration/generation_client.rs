//! DashScope client against a mock HTTP server

use gapfill::error::EngineError;
use gapfill::provider::{DashScopeClient, GenerationClient, ProviderConfig};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATION_PATH: &str = "/api/v1/services/aigc/text-generation/generation";

fn client_for(server: &MockServer, api_key: Option<&str>) -> DashScopeClient {
    let config = ProviderConfig {
        api_key: api_key.map(str::to_string),
        endpoint: format!("{}{}", server.uri(), GENERATION_PATH),
        request_timeout_secs: Some(5),
        ..ProviderConfig::default()
    };
    DashScopeClient::new(config).unwrap()
}

fn envelope(content: &str) -> serde_json::Value {
    json!({
        "output": {
            "choices": [
                { "finish_reason": "stop", "message": { "role": "assistant", "content": content } }
            ]
        },
        "usage": { "input_tokens": 120, "output_tokens": 80 },
        "request_id": "test-request"
    })
}

#[tokio::test]
async fn test_sends_bearer_credential_and_request_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATION_PATH))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "qwen-max",
            "parameters": { "max_tokens": 2000, "result_format": "message" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            r#"{"product":{"name":"Omega Pure","brand":"Nordic","price":88},"recommendation":{"summary":"Clean and potent"}}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let parsed = client_for(&server, Some("sk-test"))
        .generate("prompt")
        .await
        .unwrap();
    let product = parsed.product.unwrap();
    assert_eq!(product.name.as_deref(), Some("Omega Pure"));
    assert_eq!(product.brand.as_deref(), Some("Nordic"));
    assert_eq!(product.price, Some(88.0));
    assert_eq!(
        parsed.recommendation.unwrap().summary.as_deref(),
        Some("Clean and potent")
    );
}

#[tokio::test]
async fn test_fenced_completion_is_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "Here you go:\n```json\n{\"product\": {\"name\": \"Krill Max\"}}\n```",
        )))
        .mount(&server)
        .await;

    let parsed = client_for(&server, Some("sk-test"))
        .generate("prompt")
        .await
        .unwrap();
    assert_eq!(
        parsed.product.and_then(|p| p.name).as_deref(),
        Some("Krill Max")
    );
}

#[tokio::test]
async fn test_non_success_status_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Throttling.RateQuota"))
        .mount(&server)
        .await;

    let err = client_for(&server, Some("sk-test"))
        .generate("prompt")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Transport(_)));
    let message = err.to_string();
    assert!(message.contains("429"));
    assert!(message.contains("Throttling.RateQuota"));
}

#[tokio::test]
async fn test_empty_envelope_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "output": {} })))
        .mount(&server)
        .await;

    let err = client_for(&server, Some("sk-test"))
        .generate("prompt")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::EmptyResponse));
}

#[tokio::test]
async fn test_unparsable_completion_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope("Sure! ```json\n{not valid json\n```")),
        )
        .mount(&server)
        .await;

    let err = client_for(&server, Some("sk-test"))
        .generate("prompt")
        .await
        .unwrap_err();
    assert_eq!(err.class(), "malformed_response");
}

#[tokio::test]
async fn test_missing_credential_never_hits_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope("{}")))
        .expect(0)
        .mount(&server)
        .await;

    let err = client_for(&server, Some("   "))
        .generate("prompt")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Config(_)));
}
