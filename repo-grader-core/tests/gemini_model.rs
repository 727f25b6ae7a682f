//! Integration tests for GeminiClient using wiremock

use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use repo_grader_core::config::GeminiConfig;
use repo_grader_core::contract::ModelClient;
use repo_grader_core::error::ModelInvocationError;
use repo_grader_core::model::{active_model, discover_model, GeminiClient};

fn create_client(mock_server: &MockServer) -> GeminiClient {
    GeminiClient::new(&GeminiConfig {
        api_base_url: mock_server.uri(),
        default_model: "gemini-1.5-flash".to_string(),
        api_key: Some("test-api-key".to_string()),
    })
}

#[tokio::test]
async fn test_generate_returns_candidate_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/test-model:generateContent"))
        .and(header("x-goog-api-key", "test-api-key"))
        .and(body_partial_json(serde_json::json!({
            "contents": [{ "parts": [{ "text": "Review this" }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "text": "{\"a\":" }, { "text": "1}" }]
                },
                "finishReason": "STOP"
            }]
        })))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let text = client.generate("test-model", "Review this").await.unwrap();
    assert_eq!(text, "{\"a\":1}");
}

#[tokio::test]
async fn test_generate_quota_exceeded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/test-model:generateContent"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "error": { "message": "Resource has been exhausted" }
        })))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let error = client.generate("test-model", "hi").await.unwrap_err();
    assert!(matches!(error, ModelInvocationError::QuotaExceeded(_)));
}

#[tokio::test]
async fn test_generate_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/test-model:generateContent"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let error = client.generate("test-model", "hi").await.unwrap_err();
    assert!(matches!(error, ModelInvocationError::ServiceUnavailable(_)));
}

#[tokio::test]
async fn test_generate_without_candidates_is_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/test-model:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [],
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let error = client.generate("test-model", "hi").await.unwrap_err();
    assert!(matches!(error, ModelInvocationError::EmptyResponse));
}

#[tokio::test]
async fn test_list_models_maps_descriptors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .and(header("x-goog-api-key", "test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "models": [
                {
                    "name": "models/embedding-001",
                    "supportedGenerationMethods": ["embedContent"]
                },
                {
                    "name": "models/gemini-2.0-flash",
                    "displayName": "Gemini 2.0 Flash",
                    "supportedGenerationMethods": ["generateContent", "countTokens"]
                }
            ]
        })))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let models = client.list_models().await.unwrap();

    assert_eq!(models.len(), 2);
    assert_eq!(models[1].name, "models/gemini-2.0-flash");
    assert_eq!(
        models[1].supported_generation_methods,
        vec!["generateContent", "countTokens"]
    );
}

#[tokio::test]
async fn test_discovery_against_live_listing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "models": [
                { "name": "models/gemini-1.5-pro", "supportedGenerationMethods": ["generateContent"] }
            ]
        })))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let (updater, handle) = active_model("gemini-1.5-flash");
    discover_model(&client, &updater).await;
    assert_eq!(handle.current(), "gemini-1.5-pro");
}

#[tokio::test]
async fn test_discovery_rejected_key_keeps_default() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let (updater, handle) = active_model("gemini-1.5-flash");
    discover_model(&client, &updater).await;
    assert_eq!(handle.current(), "gemini-1.5-flash");
}
