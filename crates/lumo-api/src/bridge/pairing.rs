// Pairing handshake
//
// `POST https://{host}/api` with a device type. The bridge answers with a
// one-element array holding either `success.username` (the application
// key) or an `error` whose type 101 means the link button was not pressed.

use reqwest::Method;
use reqwest::header::HeaderMap;
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::bridge::client::BridgeChannel;
use crate::error::Error;

/// Bridge error type for "link button not pressed".
pub const LINK_BUTTON_NOT_PRESSED: u16 = 101;

/// Outcome of a single pairing attempt.
#[derive(Debug)]
pub enum PairingResponse {
    Granted { app_key: SecretString },
    LinkButtonNotPressed,
    Rejected { code: u16, description: String },
}

#[derive(Deserialize)]
struct PairingEntry {
    success: Option<PairingSuccess>,
    error: Option<PairingError>,
}

#[derive(Deserialize)]
struct PairingSuccess {
    username: String,
}

#[derive(Deserialize)]
struct PairingError {
    #[serde(rename = "type")]
    kind: u16,
    #[serde(default)]
    description: String,
}

/// Unauthenticated client for the key-request endpoint.
pub struct PairingClient {
    channel: BridgeChannel,
    url: Url,
}

impl PairingClient {
    pub fn new(host: &str, channel: BridgeChannel) -> Result<Self, Error> {
        let url = Url::parse(&format!("https://{host}/api"))?;
        Ok(Self { channel, url })
    }

    pub fn with_url(url: Url, channel: BridgeChannel) -> Self {
        Self { channel, url }
    }

    /// Make one key request. Retrying is the caller's business.
    pub async fn request_app_key(&self, device_type: &str) -> Result<PairingResponse, Error> {
        let reply = self
            .channel
            .execute(
                Method::POST,
                self.url.clone(),
                HeaderMap::new(),
                Some(json!({ "devicetype": device_type })),
            )
            .await?;

        let entries: Vec<PairingEntry> = serde_json::from_value(reply.body.clone())
            .map_err(|e| Error::deserialization(&e, reply.body.to_string()))?;

        let Some(entry) = entries.into_iter().next() else {
            return Err(Error::Deserialization {
                message: "empty pairing response".into(),
                body: reply.body.to_string(),
            });
        };

        Ok(match (entry.success, entry.error) {
            (Some(success), _) => PairingResponse::Granted {
                app_key: SecretString::from(success.username),
            },
            (None, Some(err)) if err.kind == LINK_BUTTON_NOT_PRESSED => {
                PairingResponse::LinkButtonNotPressed
            }
            (None, Some(err)) => PairingResponse::Rejected {
                code: err.kind,
                description: err.description,
            },
            (None, None) => PairingResponse::Rejected {
                code: 0,
                description: "bridge returned neither success nor error".into(),
            },
        })
    }
}
