// ── Core error types ──
//
// User-facing errors from lumo-core. Consumers never see raw HTTP status
// codes or JSON parse failures; the `From<lumo_api::Error>` impl folds
// transport-layer errors into domain variants.

use thiserror::Error;

/// Fixed message shown whenever the bridge cannot be reached or read.
pub const CONNECTIVITY_MESSAGE: &str = "Failed to fetch data. Check connection.";

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to bridge at {host}: {reason}")]
    ConnectionFailed { host: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Not connected to a bridge")]
    Disconnected,

    #[error("Bridge request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Light not found: {identifier}")]
    LightNotFound { identifier: String },

    #[error("Room not found: {identifier}")]
    RoomNotFound { identifier: String },

    #[error("Scene not found: {identifier}")]
    SceneNotFound { identifier: String },

    // ── Pairing errors ───────────────────────────────────────────────
    #[error("Link button was not pressed within {attempts} attempts")]
    PairingTimedOut { attempts: u32 },

    #[error("Bridge rejected pairing request: {message}")]
    PairingRejected { message: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    Validation { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<lumo_api::Error> for CoreError {
    fn from(err: lumo_api::Error) -> Self {
        match err {
            lumo_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            lumo_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        host: e
                            .url()
                            .and_then(|u| u.host_str().map(String::from))
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            lumo_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            lumo_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                host: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            lumo_api::Error::Platform(msg) => CoreError::ConnectionFailed {
                host: String::new(),
                reason: msg,
            },
            lumo_api::Error::Bridge { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            lumo_api::Error::Pairing { code, message } => CoreError::PairingRejected {
                message: format!("{message} (type {code})"),
            },
            lumo_api::Error::Completion { status, message } => CoreError::Api {
                message: format!("completion service: {message}"),
                status: Some(status),
            },
            lumo_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

impl CoreError {
    /// Connectivity failure carrying the fixed user-facing message.
    pub(crate) fn unreachable(host: &str) -> Self {
        CoreError::ConnectionFailed {
            host: host.to_owned(),
            reason: CONNECTIVITY_MESSAGE.into(),
        }
    }
}
