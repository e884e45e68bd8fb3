#![allow(clippy::unwrap_used)]
// Integration tests for `CompletionClient` against both wire formats.

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lumo_api::completion::types::{CompletionRequest, ToolDefinition};
use lumo_api::{CompletionClient, Error, Provider};

fn request() -> CompletionRequest {
    CompletionRequest {
        system: "You control lights.".into(),
        user: "turn off the lamp".into(),
        tools: vec![ToolDefinition {
            name: "set_light_state".into(),
            description: "Change a light".into(),
            parameters: json!({ "type": "object", "properties": {} }),
        }],
    }
}

fn client(provider: Provider, base: &str) -> CompletionClient {
    CompletionClient::with_client(
        reqwest::Client::new(),
        provider,
        SecretString::from("sk-test".to_string()),
        Some("test-model".into()),
        Some(base),
    )
}

#[tokio::test]
async fn test_anthropic_tool_use() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "sk-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{
                "type": "tool_use",
                "id": "tu_1",
                "name": "set_light_state",
                "input": { "lightName": "lamp", "on": false }
            }],
            "stop_reason": "tool_use"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let c = client(Provider::Anthropic, &format!("{}/v1/messages", server.uri()));
    let resp = c.complete(&request()).await.unwrap();
    assert_eq!(resp.tool_calls.len(), 1);
    assert_eq!(resp.tool_calls[0].name, "set_light_state");
    assert_eq!(resp.tool_calls[0].arguments["on"], false);
}

#[tokio::test]
async fn test_openai_text_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": { "role": "assistant", "content": "Which lamp?" },
                "finish_reason": "stop"
            }]
        })))
        .mount(&server)
        .await;

    let c = client(Provider::OpenAiCompatible, &format!("{}/v1", server.uri()));
    let resp = c.complete(&request()).await.unwrap();
    assert_eq!(resp.text.as_deref(), Some("Which lamp?"));
    assert!(resp.tool_calls.is_empty());
}

#[tokio::test]
async fn test_rejected_key_is_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&server)
        .await;

    let c = client(Provider::OpenAiCompatible, &format!("{}/v1", server.uri()));
    let result = c.complete(&request()).await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_server_error_is_completion_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let c = client(Provider::Anthropic, &format!("{}/v1/messages", server.uri()));
    let result = c.complete(&request()).await;
    assert!(
        matches!(result, Err(Error::Completion { status: 529, .. })),
        "expected Completion error, got: {result:?}"
    );
}
