use thiserror::Error;

/// Top-level error type for the `lumo-api` crate.
///
/// Covers every failure mode across the bridge resource API, the pairing
/// handshake, the platform fetch seam and the completion service.
/// `lumo-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The bridge rejected the application key (HTTP 401/403), or the
    /// completion service rejected its API key.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The injected platform fetch capability failed before producing a response.
    #[error("Platform fetch failed: {0}")]
    Platform(String),

    // ── Bridge ──────────────────────────────────────────────────────
    /// Non-success status or an `errors` envelope from the bridge.
    #[error("Bridge API error (HTTP {status}): {message}")]
    Bridge { status: u16, message: String },

    /// Pairing handshake returned an error other than "link button not pressed".
    #[error("Pairing rejected by bridge (type {code}): {message}")]
    Pairing { code: u16, message: String },

    // ── Completion service ──────────────────────────────────────────
    /// Non-success status from the completion service.
    #[error("Completion service error (HTTP {status}): {message}")]
    Completion { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the credential was rejected.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Bridge { status, .. } => *status == 429 || *status == 503,
            Self::Platform(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Bridge { status: 404, .. } => true,
            _ => false,
        }
    }

    pub(crate) fn deserialization(err: &serde_json::Error, body: String) -> Self {
        let preview: String = body.chars().take(200).collect();
        Self::Deserialization {
            message: format!("{err} (body preview: {preview:?})"),
            body,
        }
    }
}
