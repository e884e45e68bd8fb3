#![allow(clippy::unwrap_used)]
// Pairing retry loop against a mocked bridge.

use std::time::Duration;

use secrecy::ExposeSecret;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lumo_api::{BridgeChannel, PairingClient};
use lumo_core::{CoreError, PairingOptions, pair};

// ── Helpers ─────────────────────────────────────────────────────────

fn link_button_not_pressed() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!([{
        "error": { "type": 101, "address": "", "description": "link button not pressed" }
    }]))
}

fn fast(attempts: u32) -> PairingOptions {
    PairingOptions {
        attempts,
        interval: Duration::from_millis(10),
    }
}

async fn setup() -> (MockServer, PairingClient) {
    let server = MockServer::start().await;
    let url = Url::parse(&format!("{}/api", server.uri())).unwrap();
    let client = PairingClient::with_url(url, BridgeChannel::Direct(reqwest::Client::new()));
    (server, client)
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_retries_until_button_pressed() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(link_button_not_pressed())
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "success": { "username": "granted-key" } }])),
        )
        .mount(&server)
        .await;

    let mut waits = Vec::new();
    let key = pair(&client, "lumo#test", fast(15), |attempt, of| {
        waits.push((attempt, of));
    })
    .await
    .unwrap();

    assert_eq!(key.expose_secret(), "granted-key");
    assert_eq!(waits, vec![(1, 15), (2, 15)]);
}

#[tokio::test]
async fn test_other_error_stops_immediately() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "error": { "type": 7, "description": "invalid value" }
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let result = pair(&client, "lumo#test", fast(15), |_, _| {}).await;
    assert!(
        matches!(result, Err(CoreError::PairingRejected { .. })),
        "expected PairingRejected, got: {result:?}"
    );
}

#[tokio::test]
async fn test_gives_up_after_attempts() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(link_button_not_pressed())
        .expect(3)
        .mount(&server)
        .await;

    let result = pair(&client, "lumo#test", fast(3), |_, _| {}).await;
    assert!(
        matches!(result, Err(CoreError::PairingTimedOut { attempts: 3 })),
        "expected PairingTimedOut, got: {result:?}"
    );
}
