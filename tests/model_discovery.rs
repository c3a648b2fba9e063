// Copyright 2026 MikuCast contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Model discovery against a mock HTTP server.

use serde_json::json;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mikucast::config::ProviderRecord;
use mikucast::providers::{ModelFetcher, ProviderRegistry};
use mikucast::Settings;

fn record_for(server: &MockServer) -> ProviderRecord {
    ProviderRecord {
        base_url: server.uri(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_openai_shape_sorted_and_deduped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [
                {"id": "gpt-4o", "object": "model"},
                {"id": "gpt-3.5-turbo", "object": "model"},
                {"id": "gpt-4o", "object": "model"},
            ]
        })))
        .mount(&server)
        .await;

    let fetcher = ModelFetcher::bind("openai", record_for(&server));
    let models = fetcher.fetch_models().await.unwrap();
    assert_eq!(models, vec!["gpt-3.5-turbo", "gpt-4o"]);
}

#[tokio::test]
async fn test_gemini_shape_uses_models_and_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [
                {"name": "models/gemini-2.0-flash"},
                {"name": "models/gemini-1.5-pro"},
            ]
        })))
        .mount(&server)
        .await;

    let fetcher = ModelFetcher::bind("gemini", record_for(&server));
    let models = fetcher.fetch_models().await.unwrap();
    assert_eq!(
        models,
        vec!["models/gemini-1.5-pro", "models/gemini-2.0-flash"]
    );
}

#[tokio::test]
async fn test_api_key_becomes_authorization_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let record = ProviderRecord {
        base_url: server.uri(),
        api_key: Some("sk-test".to_string()),
        ..Default::default()
    };
    let fetcher = ModelFetcher::bind("openai", record);
    let models = fetcher.fetch_models().await.unwrap();
    assert!(models.is_empty());
}

#[tokio::test]
async fn test_no_api_key_sends_no_authorization_header() {
    let server = MockServer::start().await;
    // Reject any request carrying an Authorization header.
    Mock::given(method("GET"))
        .and(path("/models"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let fetcher = ModelFetcher::bind("openai", record_for(&server));
    assert!(fetcher.fetch_models().await.is_ok());
}

#[tokio::test]
async fn test_http_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let fetcher = ModelFetcher::bind("openai", record_for(&server));
    let err = fetcher.fetch_models().await.unwrap_err();
    assert_eq!(err.kind(), "http_status");
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn test_non_json_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let fetcher = ModelFetcher::bind("openai", record_for(&server));
    let err = fetcher.fetch_models().await.unwrap_err();
    assert_eq!(err.kind(), "decode");
}

#[tokio::test]
async fn test_wrong_response_path_is_unexpected_shape() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": "gpt-4o"}]
        })))
        .mount(&server)
        .await;

    let fetcher = ModelFetcher::bind("openai", record_for(&server));
    let err = fetcher.fetch_models().await.unwrap_err();
    assert_eq!(err.kind(), "unexpected_shape");
}

#[tokio::test]
async fn test_degraded_fetch_returns_empty_list_with_reason() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let fetcher = ModelFetcher::bind("openai", record_for(&server));
    let (models, reason) = fetcher.fetch_models_or_empty().await;
    assert!(models.is_empty());
    assert_eq!(reason.unwrap().kind(), "http_status");
}

#[tokio::test]
async fn test_trailing_slash_base_url_joins_cleanly() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "m"}]
        })))
        .mount(&server)
        .await;

    let record = ProviderRecord {
        base_url: format!("{}/v1/", server.uri()),
        ..Default::default()
    };
    let fetcher = ModelFetcher::bind("openai", record);
    assert_eq!(fetcher.fetch_models().await.unwrap(), vec!["m"]);
}

#[tokio::test]
async fn test_custom_provider_with_custom_shape() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [
                {"model": "llama3.2", "size": 123},
                {"model": "qwen2.5-coder", "size": 456},
            ]
        })))
        .mount(&server)
        .await;

    let record = ProviderRecord {
        base_url: server.uri(),
        models_endpoint: "/api/tags".to_string(),
        models_list_path: "models".to_string(),
        model_id_field: "model".to_string(),
        ..Default::default()
    };
    let fetcher = ModelFetcher::bind("ollama", record);
    let models = fetcher.fetch_models().await.unwrap();
    assert_eq!(models, vec!["llama3.2", "qwen2.5-coder"]);
}

#[tokio::test]
async fn test_registry_resolves_configured_provider() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "claude-sonnet-4"}]
        })))
        .mount(&server)
        .await;

    let mut settings = Settings::default();
    settings
        .providers
        .insert("anthropic".to_string(), record_for(&server));

    let registry = ProviderRegistry::new(&settings);
    let fetcher = registry.resolve("anthropic").unwrap();
    assert_eq!(fetcher.fetch_models().await.unwrap(), vec!["claude-sonnet-4"]);

    assert!(registry.resolve("nonexistent").is_err());
}
