//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use lumo_config::ConfigError;
use lumo_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to bridge at {host}")]
    #[diagnostic(
        code(lumo::connection_failed),
        help(
            "{reason}\n\
             Check that the bridge is powered and on the same network.\n\
             Try: lumo lights list --bridge <ip> --insecure"
        )
    )]
    ConnectionFailed { host: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(lumo::timeout),
        help("Increase the timeout with --timeout or check the bridge's responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("The bridge rejected the application key")]
    #[diagnostic(
        code(lumo::auth_failed),
        help(
            "{message}\n\
             The key may have been revoked in the bridge's app.\n\
             Pair again with: lumo pair <ip>"
        )
    )]
    AuthFailed { message: String },

    #[error("No application key configured for profile '{profile}'")]
    #[diagnostic(
        code(lumo::no_credentials),
        help(
            "Pair with the bridge: lumo pair <ip>\n\
             Or pass --app-key / set LUMO_APP_KEY."
        )
    )]
    NoCredentials { profile: String },

    #[error("No assistant API key for profile '{profile}'")]
    #[diagnostic(
        code(lumo::no_assistant_key),
        help(
            "Set ANTHROPIC_API_KEY (or OPENAI_API_KEY with --provider openai),\n\
             or add an [profiles.{profile}.assistant] table with api_key_env."
        )
    )]
    NoAssistantKey { profile: String },

    // ── Pairing ──────────────────────────────────────────────────────
    #[error("Pairing failed: {message}")]
    #[diagnostic(
        code(lumo::pairing_failed),
        help("Press the round link button on top of the bridge, then run pair again.")
    )]
    PairingFailed { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(lumo::not_found),
        help("Run: lumo {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Bridge error: {message}")]
    #[diagnostic(code(lumo::api_error))]
    ApiError { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(lumo::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(lumo::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: lumo pair <ip>"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No bridge configured")]
    #[diagnostic(
        code(lumo::no_config),
        help(
            "Pair with a bridge: lumo pair <ip>\n\
             Or try the demo home: lumo --demo lights list\n\
             Config expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("{0}")]
    #[diagnostic(code(lumo::config))]
    Config(String),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(lumo::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(lumo::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } | Self::NoAssistantKey { .. } => {
                exit_code::AUTH
            }
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { host, reason } => CliError::ConnectionFailed {
                host: if host.is_empty() { "(unknown)".into() } else { host },
                reason,
            },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::Disconnected => CliError::ConnectionFailed {
                host: "(disconnected)".into(),
                reason: "The bridge connection was closed.".into(),
            },

            CoreError::Timeout => CliError::Timeout,

            CoreError::LightNotFound { identifier } => not_found("light", identifier, "lights"),
            CoreError::RoomNotFound { identifier } => not_found("room", identifier, "rooms"),
            CoreError::SceneNotFound { identifier } => not_found("scene", identifier, "scenes"),

            CoreError::PairingTimedOut { .. } | CoreError::PairingRejected { .. } => {
                CliError::PairingFailed {
                    message: err.to_string(),
                }
            }

            CoreError::Validation { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Api { message, status } => CliError::ApiError {
                message: match status {
                    Some(s) => format!("{message} (HTTP {s})"),
                    None => message,
                },
            },

            CoreError::Config { message } => CliError::Config(message),

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

pub fn not_found(resource_type: &str, identifier: String, plural: &str) -> CliError {
    CliError::NotFound {
        resource_type: resource_type.into(),
        identifier,
        list_command: format!("{plural} list"),
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::NoAssistantKey { profile } => CliError::NoAssistantKey { profile },
            ConfigError::ProfileNotFound { name, available } => {
                CliError::ProfileNotFound { name, available }
            }
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config(other.to_string()),
        }
    }
}
