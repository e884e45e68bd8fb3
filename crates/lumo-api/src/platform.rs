// Platform fetch seam.
//
// A host application may proxy bridge traffic through its own process
// (to dodge cross-origin rules in a webview, or to accept the bridge's
// self-signed certificate). The bridge client takes that capability as
// an injected trait object; `ProxyFetch` is the bundled implementation.

use std::time::Duration;

use futures_util::future::BoxFuture;
use reqwest::Method;
use reqwest::header::HeaderMap;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// A request handed to the platform for execution.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

/// The platform's answer: `{ ok, status, data, error }`.
///
/// `data` is `None` when the body could not be parsed as JSON; `error`
/// then carries a short description.
#[derive(Debug, Clone, Default)]
pub struct FetchResponse {
    pub ok: bool,
    pub status: u16,
    pub data: Option<Value>,
    pub error: Option<String>,
}

/// HTTP capability provided by the hosting platform.
///
/// Returning `Err` means no response was produced at all (connection
/// refused, DNS failure). Any HTTP answer, successful or not, is an `Ok`.
pub trait PlatformFetch: Send + Sync {
    fn fetch(&self, request: FetchRequest) -> BoxFuture<'_, Result<FetchResponse, Error>>;
}

/// Platform proxy that accepts self-signed certificates.
///
/// `ok` is reported only for HTTP 200, and a body that fails to parse as
/// JSON yields `ok: false` with `data: None`.
pub struct ProxyFetch {
    http: reqwest::Client,
}

impl ProxyFetch {
    pub fn new(timeout: Duration) -> Result<Self, Error> {
        let http = TransportConfig::insecure(timeout).build_client()?;
        Ok(Self { http })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl PlatformFetch for ProxyFetch {
    fn fetch(&self, request: FetchRequest) -> BoxFuture<'_, Result<FetchResponse, Error>> {
        Box::pin(async move {
            debug!("proxy {} {}", request.method, request.url);

            let mut builder = self
                .http
                .request(request.method, request.url)
                .headers(request.headers);
            if let Some(ref body) = request.body {
                builder = builder.json(body);
            }

            let resp = builder.send().await?;
            let status = resp.status().as_u16();
            let text = resp.text().await?;

            Ok(match serde_json::from_str::<Value>(&text) {
                Ok(data) => FetchResponse {
                    ok: status == 200,
                    status,
                    data: Some(data),
                    error: None,
                },
                Err(_) => FetchResponse {
                    ok: false,
                    status,
                    data: None,
                    error: Some("Failed to parse JSON".into()),
                },
            })
        })
    }
}
