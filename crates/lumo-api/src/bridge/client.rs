// Bridge resource client
//
// Wraps the transport channel with CLIP v2 URL construction, the
// application-key header, and `{ errors, data }` envelope unwrapping.
// The channel (direct HTTP or platform proxy) is fixed at construction.

use std::sync::Arc;

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};
use url::Url;

use crate::bridge::models::{
    BridgeResponse, DeviceResource, LightResource, LightStateUpdate, ResourceKind, ResourceRef,
    RoomResource, SceneResource,
};
use crate::error::Error;
use crate::platform::{FetchRequest, PlatformFetch};
use crate::transport::TransportConfig;

const APP_KEY_HEADER: &str = "hue-application-key";

/// How requests reach the bridge.
#[derive(Clone)]
pub enum BridgeChannel {
    /// Plain HTTPS from this process.
    Direct(reqwest::Client),
    /// Delegated to a host-provided fetch capability.
    Platform(Arc<dyn PlatformFetch>),
}

impl std::fmt::Debug for BridgeChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct(_) => f.write_str("Direct"),
            Self::Platform(_) => f.write_str("Platform"),
        }
    }
}

/// Status and parsed JSON body of a successful exchange.
pub(crate) struct Reply {
    pub status: u16,
    pub body: Value,
}

impl BridgeChannel {
    /// Build a direct channel from transport settings.
    pub fn direct(transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self::Direct(transport.build_client()?))
    }

    /// Execute one request. Non-2xx statuses and unparseable bodies are
    /// errors on both channels.
    pub(crate) async fn execute(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Option<Value>,
    ) -> Result<Reply, Error> {
        debug!("{method} {url}");

        match self {
            Self::Direct(http) => {
                let mut builder = http.request(method, url).headers(headers);
                if let Some(ref body) = body {
                    builder = builder.json(body);
                }
                let resp = builder.send().await?;
                let status = resp.status().as_u16();
                let text = resp.text().await?;

                if !(200..300).contains(&status) {
                    let parsed = serde_json::from_str::<Value>(&text).ok();
                    return Err(status_error(status, parsed.as_ref(), None));
                }

                let body: Value =
                    serde_json::from_str(&text).map_err(|e| Error::deserialization(&e, text))?;
                Ok(Reply { status, body })
            }
            Self::Platform(platform) => {
                let resp = platform
                    .fetch(FetchRequest {
                        method,
                        url,
                        headers,
                        body,
                    })
                    .await?;

                if !(200..300).contains(&resp.status) {
                    return Err(status_error(
                        resp.status,
                        resp.data.as_ref(),
                        resp.error.as_deref(),
                    ));
                }

                let Some(body) = resp.data else {
                    return Err(Error::Deserialization {
                        message: resp
                            .error
                            .unwrap_or_else(|| "platform returned no data".into()),
                        body: String::new(),
                    });
                };

                if !resp.ok {
                    return Err(status_error(resp.status, Some(&body), resp.error.as_deref()));
                }

                Ok(Reply {
                    status: resp.status,
                    body,
                })
            }
        }
    }
}

/// Map a failed status to an error, preferring the bridge's own description.
fn status_error(status: u16, body: Option<&Value>, fallback: Option<&str>) -> Error {
    if status == 401 || status == 403 {
        return Error::Authentication {
            message: format!("bridge rejected the application key (HTTP {status})"),
        };
    }

    let description = body
        .and_then(|b| b.get("errors"))
        .and_then(Value::as_array)
        .and_then(|errs| errs.first())
        .and_then(|e| e.get("description"))
        .and_then(Value::as_str)
        .map(String::from);

    Error::Bridge {
        status,
        message: description
            .or_else(|| fallback.map(String::from))
            .unwrap_or_else(|| format!("HTTP {status}")),
    }
}

/// Client for the bridge's `/clip/v2` resource API.
///
/// Every method returns the unwrapped `data` array. A response that carries
/// `errors` but no data is an error; errors accompanying data are logged.
#[derive(Debug, Clone)]
pub struct BridgeClient {
    channel: BridgeChannel,
    base_url: Url,
    headers: HeaderMap,
}

impl BridgeClient {
    /// Direct HTTPS client for the bridge at `host`.
    pub fn direct(
        host: &str,
        app_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let channel = BridgeChannel::direct(transport)?;
        Self::with_base_url(bridge_base_url(host)?, app_key, channel)
    }

    /// Client that routes every request through the platform fetch capability.
    pub fn via_platform(
        host: &str,
        app_key: &SecretString,
        platform: Arc<dyn PlatformFetch>,
    ) -> Result<Self, Error> {
        Self::with_base_url(
            bridge_base_url(host)?,
            app_key,
            BridgeChannel::Platform(platform),
        )
    }

    /// Client against an explicit base URL (tests, non-standard ports).
    pub fn with_base_url(
        mut base_url: Url,
        app_key: &SecretString,
        channel: BridgeChannel,
    ) -> Result<Self, Error> {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut key = HeaderValue::from_str(app_key.expose_secret()).map_err(|_| {
            Error::Authentication {
                message: "application key contains invalid header characters".into(),
            }
        })?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(APP_KEY_HEADER, key);

        Ok(Self {
            channel,
            base_url,
            headers,
        })
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Fetch every resource of `kind`.
    pub async fn list<T: DeserializeOwned>(&self, kind: ResourceKind) -> Result<Vec<T>, Error> {
        let url = self.base_url.join(&kind.path())?;
        let reply = self
            .channel
            .execute(Method::GET, url, self.headers.clone(), None)
            .await?;
        unwrap_envelope(reply)
    }

    pub async fn list_lights(&self) -> Result<Vec<LightResource>, Error> {
        self.list(ResourceKind::Light).await
    }

    pub async fn list_rooms(&self) -> Result<Vec<RoomResource>, Error> {
        self.list(ResourceKind::Room).await
    }

    pub async fn list_scenes(&self) -> Result<Vec<SceneResource>, Error> {
        self.list(ResourceKind::Scene).await
    }

    pub async fn list_devices(&self) -> Result<Vec<DeviceResource>, Error> {
        self.list(ResourceKind::Device).await
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// `PUT resource/light/{id}` with a partial state.
    pub async fn update_light(
        &self,
        light_id: &str,
        update: &LightStateUpdate,
    ) -> Result<Vec<ResourceRef>, Error> {
        let body = serde_json::to_value(update).map_err(|e| Error::Deserialization {
            message: format!("failed to encode light update: {e}"),
            body: String::new(),
        })?;
        self.put(ResourceKind::Light, light_id, body).await
    }

    /// `PUT resource/scene/{id}` with a recall action.
    pub async fn recall_scene(&self, scene_id: &str) -> Result<Vec<ResourceRef>, Error> {
        self.put(
            ResourceKind::Scene,
            scene_id,
            json!({ "recall": { "action": "active" } }),
        )
        .await
    }

    async fn put(
        &self,
        kind: ResourceKind,
        id: &str,
        body: Value,
    ) -> Result<Vec<ResourceRef>, Error> {
        let url = self.base_url.join(&format!("{}/{id}", kind.path()))?;
        let reply = self
            .channel
            .execute(Method::PUT, url, self.headers.clone(), Some(body))
            .await?;
        unwrap_envelope(reply)
    }
}

/// `https://{host}/clip/v2/`
fn bridge_base_url(host: &str) -> Result<Url, Error> {
    Ok(Url::parse(&format!("https://{host}/clip/v2/"))?)
}

fn unwrap_envelope<T: DeserializeOwned>(reply: Reply) -> Result<Vec<T>, Error> {
    let Reply { status, body } = reply;
    let envelope: BridgeResponse<T> = match serde_json::from_value(body.clone()) {
        Ok(env) => env,
        Err(e) => return Err(Error::deserialization(&e, body.to_string())),
    };

    if envelope.errors.is_empty() {
        return Ok(envelope.data);
    }

    let messages: Vec<&str> = envelope
        .errors
        .iter()
        .map(|e| e.description.as_str())
        .collect();

    if envelope.data.is_empty() {
        return Err(Error::Bridge {
            status,
            message: messages.join("; "),
        });
    }

    warn!(errors = ?messages, "bridge returned errors alongside data");
    Ok(envelope.data)
}
