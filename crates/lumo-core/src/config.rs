// ── Runtime connection configuration ──
//
// These types describe how to reach a bridge (or the offline demo home).
// They carry credential data and connection tuning, but never touch disk.
// The CLI constructs a `BridgeConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;

pub use lumo_api::Provider;

/// Simulated round-trip latency of the demo home.
pub const DEFAULT_DEMO_LATENCY: Duration = Duration::from_millis(600);

/// Default poll period for the background refresh task.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Where resource calls go.
#[derive(Debug, Clone)]
pub enum ConnectionMode {
    /// A real bridge on the local network.
    Live {
        host: String,
        app_key: SecretString,
        transport: BridgeTransport,
    },
    /// In-memory demo home; no network traffic.
    Demo { latency: Duration },
}

/// How live requests reach the bridge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BridgeTransport {
    /// Routed through a platform fetch capability (the bundled proxy unless
    /// one is injected).
    #[default]
    Platform,
    /// Plain HTTPS from this process.
    Direct,
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification. Bridges ship self-signed certificates.
    #[default]
    DangerAcceptInvalid,
}

/// Configuration for a single bridge session.
///
/// Built by the CLI, passed to `Controller`. Core never reads config files.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub mode: ConnectionMode,
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// How often to re-fetch everything (seconds). 0 = never.
    pub poll_interval_secs: u64,
}

impl BridgeConfig {
    /// Live bridge config with default tuning.
    pub fn live(host: impl Into<String>, app_key: SecretString) -> Self {
        Self {
            mode: ConnectionMode::Live {
                host: host.into(),
                app_key,
                transport: BridgeTransport::default(),
            },
            ..Self::demo()
        }
    }

    /// Demo home with the default simulated latency.
    pub fn demo() -> Self {
        Self {
            mode: ConnectionMode::Demo {
                latency: DEFAULT_DEMO_LATENCY,
            },
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(10),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }

    /// Display label for logs and errors.
    pub fn host_label(&self) -> &str {
        match &self.mode {
            ConnectionMode::Live { host, .. } => host,
            ConnectionMode::Demo { .. } => "demo",
        }
    }

    pub fn is_demo(&self) -> bool {
        matches!(self.mode, ConnectionMode::Demo { .. })
    }
}

/// Completion service settings for the assistant.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub provider: Provider,
    pub api_key: SecretString,
    pub model: Option<String>,
    pub base_url: Option<String>,
}
