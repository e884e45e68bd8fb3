#![allow(clippy::unwrap_used)]
// Integration tests for the pairing handshake.

use secrecy::ExposeSecret;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lumo_api::{BridgeChannel, PairingClient, PairingResponse};

async fn setup() -> (MockServer, PairingClient) {
    let server = MockServer::start().await;
    let url = Url::parse(&format!("{}/api", server.uri())).unwrap();
    let client = PairingClient::with_url(url, BridgeChannel::Direct(reqwest::Client::new()));
    (server, client)
}

#[tokio::test]
async fn test_pairing_granted() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .and(body_json(json!({ "devicetype": "lumo#test" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "success": { "username": "new-key" } }])),
        )
        .mount(&server)
        .await;

    match client.request_app_key("lumo#test").await.unwrap() {
        PairingResponse::Granted { app_key } => assert_eq!(app_key.expose_secret(), "new-key"),
        other => panic!("expected Granted, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_pairing_link_button_not_pressed() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "error": { "type": 101, "address": "", "description": "link button not pressed" }
        }])))
        .mount(&server)
        .await;

    let resp = client.request_app_key("lumo#test").await.unwrap();
    assert!(matches!(resp, PairingResponse::LinkButtonNotPressed));
}

#[tokio::test]
async fn test_pairing_other_error_is_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "error": { "type": 7, "description": "invalid value for parameter" }
        }])))
        .mount(&server)
        .await;

    match client.request_app_key("lumo#test").await.unwrap() {
        PairingResponse::Rejected { code, description } => {
            assert_eq!(code, 7);
            assert_eq!(description, "invalid value for parameter");
        }
        other => panic!("expected Rejected, got: {other:?}"),
    }
}
