//! Shared configuration for the lumo CLI.
//!
//! TOML profiles, secret resolution (env + keyring + plaintext), and
//! translation to `lumo_core::BridgeConfig` / `AssistantConfig`. The CLI
//! layers its flag overrides on top of what this crate resolves.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use lumo_core::config::DEFAULT_POLL_INTERVAL_SECS;
use lumo_core::{
    AssistantConfig, BridgeConfig, BridgeTransport, ConnectionMode, Provider, TlsVerification,
};

/// Keyring service name under which secrets are stored.
pub const KEYRING_SERVICE: &str = "lumo";

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "LUMO_CONFIG";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no application key configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("no assistant API key configured for profile '{profile}'")]
    NoAssistantKey { profile: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String, available: String },

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl From<keyring::Error> for ConfigError {
    fn from(err: keyring::Error) -> Self {
        Self::Keyring(err.to_string())
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named bridge profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use: explicit choice, then the configured
    /// default, then `"default"`.
    pub fn active_profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    /// Look up a profile by name.
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.into(),
                available: self.profile_names(),
            })
    }

    /// Comma-separated profile names, for help text.
    pub fn profile_names(&self) -> String {
        if self.profiles.is_empty() {
            return "(none)".into();
        }
        self.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }

    /// Drop a profile, moving the default elsewhere if it pointed at it.
    pub fn remove_profile(&mut self, name: &str) -> Result<Profile, ConfigError> {
        let removed = self
            .profiles
            .remove(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.into(),
                available: self.profile_names(),
            })?;

        if self.default_profile.as_deref() == Some(name) {
            self.default_profile = self.profiles.keys().next().cloned();
        }
        Ok(removed)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// How requests reach the bridge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Platform,
    Direct,
}

impl From<Transport> for BridgeTransport {
    fn from(t: Transport) -> Self {
        match t {
            Transport::Platform => Self::Platform,
            Transport::Direct => Self::Direct,
        }
    }
}

/// A named bridge profile.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Bridge host or IP address.
    pub bridge: String,

    /// Application key (plaintext; prefer keyring or env var).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_key: Option<String>,

    /// Environment variable holding the application key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_key_env: Option<String>,

    #[serde(default)]
    pub transport: Transport,

    /// Override TLS verification. `true` accepts the bridge's self-signed
    /// certificate, `false` demands a trusted chain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Path to a custom CA certificate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Request timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Poll interval in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_interval: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistant: Option<AssistantProfile>,
}

impl Profile {
    pub fn new(bridge: impl Into<String>) -> Self {
        Self {
            bridge: bridge.into(),
            ..Self::default()
        }
    }
}

/// Natural-language assistant settings for a profile.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AssistantProfile {
    #[serde(default)]
    pub provider: Provider,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Endpoint override (OpenAI-compatible servers, proxies).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `LUMO_CONFIG`, then platform conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "lumo", "lumo").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("lumo");
    p
}

// ── Loading / saving ────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_at(&config_path())
}

/// Load from an explicit path. A missing file yields the defaults.
pub fn load_config_at(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("LUMO_").split("__"));

    let config: Config = figment.extract()?;
    debug!(path = %path.display(), profiles = config.profiles.len(), "config loaded");
    Ok(config)
}

/// Load config, falling back to defaults on any error.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write it to the canonical path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_at(cfg, &config_path())
}

/// Serialize config to TOML and write it to `path`, creating parents.
pub fn save_config_at(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;

    // Plaintext keys may live in here.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    debug!(path = %path.display(), "config saved");
    Ok(())
}

/// Remove a profile from the canonical config and forget its secrets.
pub fn clear_profile(name: &str) -> Result<Profile, ConfigError> {
    clear_profile_at(&config_path(), name)
}

/// Remove a profile from the config at `path` and forget its secrets.
pub fn clear_profile_at(path: &Path, name: &str) -> Result<Profile, ConfigError> {
    let mut cfg = load_config_at(path)?;
    let removed = cfg.remove_profile(name)?;
    for kind in [SecretKind::AppKey, SecretKind::AssistantKey] {
        forget_secret(name, kind);
    }
    save_config_at(&cfg, path)?;
    Ok(removed)
}

// ── Keyring ─────────────────────────────────────────────────────────

/// Secrets stored per profile in the system keyring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
    AppKey,
    AssistantKey,
}

impl SecretKind {
    fn account(self, profile_name: &str) -> String {
        match self {
            Self::AppKey => format!("{profile_name}/app-key"),
            Self::AssistantKey => format!("{profile_name}/assistant-key"),
        }
    }
}

/// Store a secret in the system keyring.
pub fn store_secret(
    profile_name: &str,
    kind: SecretKind,
    secret: &SecretString,
) -> Result<(), ConfigError> {
    use secrecy::ExposeSecret;

    let entry = keyring::Entry::new(KEYRING_SERVICE, &kind.account(profile_name))?;
    entry.set_password(secret.expose_secret())?;
    Ok(())
}

fn keyring_secret(profile_name: &str, kind: SecretKind) -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, &kind.account(profile_name))
        .and_then(|entry| entry.get_password())
        .ok()
}

fn forget_secret(profile_name: &str, kind: SecretKind) {
    let account = kind.account(profile_name);
    match keyring::Entry::new(KEYRING_SERVICE, &account).and_then(|e| e.delete_credential()) {
        Ok(()) => debug!(account = %account, "keyring entry removed"),
        Err(e) => debug!(account = %account, error = %e, "no keyring entry removed"),
    }
}

// ── Secret resolution ───────────────────────────────────────────────

/// Env var, then keyring, then plaintext. Empty values are skipped.
fn resolve_secret(
    env_name: Option<&str>,
    profile_name: &str,
    kind: SecretKind,
    plaintext: Option<&str>,
) -> Option<SecretString> {
    env_name
        .and_then(|name| std::env::var(name).ok())
        .filter(|v| !v.is_empty())
        .or_else(|| keyring_secret(profile_name, kind).filter(|v| !v.is_empty()))
        .or_else(|| plaintext.filter(|v| !v.is_empty()).map(str::to_owned))
        .map(SecretString::from)
}

/// Resolve the bridge application key for a profile.
pub fn resolve_app_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_secret(
        profile.app_key_env.as_deref(),
        profile_name,
        SecretKind::AppKey,
        profile.app_key.as_deref(),
    )
    .ok_or_else(|| ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Conventional env var for a provider's API key.
pub fn provider_key_env(provider: Provider) -> &'static str {
    match provider {
        Provider::Anthropic => "ANTHROPIC_API_KEY",
        Provider::OpenAiCompatible => "OPENAI_API_KEY",
    }
}

/// Resolve the assistant API key. Without an explicit `api_key_env`, the
/// provider's conventional variable is consulted.
pub fn resolve_assistant_key(
    assistant: &AssistantProfile,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    let env_name = assistant
        .api_key_env
        .as_deref()
        .unwrap_or_else(|| provider_key_env(assistant.provider));

    resolve_secret(
        Some(env_name),
        profile_name,
        SecretKind::AssistantKey,
        assistant.api_key.as_deref(),
    )
    .ok_or_else(|| ConfigError::NoAssistantKey {
        profile: profile_name.into(),
    })
}

// ── Translation to core configs ─────────────────────────────────────

/// TLS policy implied by a profile. Bridges ship self-signed certificates,
/// so verification is off unless a CA is given or `insecure = false`.
pub fn tls_for(profile: &Profile) -> TlsVerification {
    match (profile.insecure, &profile.ca_cert) {
        (Some(true), _) => TlsVerification::DangerAcceptInvalid,
        (_, Some(ca)) => TlsVerification::CustomCa(ca.clone()),
        (Some(false), None) => TlsVerification::SystemDefaults,
        (None, None) => TlsVerification::DangerAcceptInvalid,
    }
}

/// Build a live `BridgeConfig` from a profile, with no CLI overrides.
pub fn profile_to_bridge_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<BridgeConfig, ConfigError> {
    let host = profile.bridge.trim();
    if host.is_empty() {
        return Err(ConfigError::Validation {
            field: "bridge".into(),
            reason: format!("profile '{profile_name}' has no bridge address"),
        });
    }

    let app_key = resolve_app_key(profile, profile_name)?;

    Ok(BridgeConfig {
        mode: ConnectionMode::Live {
            host: host.to_owned(),
            app_key,
            transport: profile.transport.into(),
        },
        tls: tls_for(profile),
        timeout: Duration::from_secs(profile.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        poll_interval_secs: profile.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
    })
}

/// Assistant settings for a profile, `None` when it has no assistant table.
pub fn assistant_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<Option<AssistantConfig>, ConfigError> {
    let Some(assistant) = profile.assistant.as_ref() else {
        return Ok(None);
    };

    Ok(Some(AssistantConfig {
        provider: assistant.provider,
        api_key: resolve_assistant_key(assistant, profile_name)?,
        model: assistant.model.clone(),
        base_url: assistant.base_url.clone(),
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    #[test]
    fn active_profile_prefers_explicit_then_default() {
        let mut cfg = Config::default();
        assert_eq!(cfg.active_profile_name(None), "default");
        cfg.default_profile = Some("upstairs".into());
        assert_eq!(cfg.active_profile_name(None), "upstairs");
        assert_eq!(cfg.active_profile_name(Some("garage")), "garage");
    }

    #[test]
    fn removing_default_profile_moves_default() {
        let mut cfg = Config::default();
        cfg.profiles.insert("default".into(), Profile::new("10.0.0.2"));
        cfg.profiles.insert("attic".into(), Profile::new("10.0.0.3"));

        let removed = cfg.remove_profile("default").unwrap();
        assert_eq!(removed.bridge, "10.0.0.2");
        assert_eq!(cfg.default_profile.as_deref(), Some("attic"));

        let err = cfg.remove_profile("default").unwrap_err();
        assert!(matches!(err, ConfigError::ProfileNotFound { .. }));
    }

    #[test]
    fn tls_policy_follows_profile() {
        let mut p = Profile::new("h");
        assert_eq!(tls_for(&p), TlsVerification::DangerAcceptInvalid);
        p.insecure = Some(false);
        assert_eq!(tls_for(&p), TlsVerification::SystemDefaults);
        p.ca_cert = Some("/etc/bridge.pem".into());
        assert_eq!(
            tls_for(&p),
            TlsVerification::CustomCa("/etc/bridge.pem".into())
        );
        p.insecure = Some(true);
        assert_eq!(tls_for(&p), TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn plaintext_key_is_last_resort() {
        let profile = Profile {
            app_key: Some("plain-key".into()),
            app_key_env: Some("LUMO_TEST_SURELY_UNSET_VARIABLE".into()),
            ..Profile::new("10.0.0.2")
        };
        let key = resolve_app_key(&profile, "lumo-config-test-plaintext").unwrap();
        assert_eq!(key.expose_secret(), "plain-key");
    }

    #[test]
    fn env_var_wins_over_plaintext() {
        let expected = std::env::var("PATH").unwrap();
        let profile = Profile {
            app_key: Some("plain-key".into()),
            app_key_env: Some("PATH".into()),
            ..Profile::new("10.0.0.2")
        };
        let key = resolve_app_key(&profile, "lumo-config-test-env").unwrap();
        assert_eq!(key.expose_secret(), expected);
    }

    #[test]
    fn missing_key_is_reported() {
        let err = resolve_app_key(&Profile::new("h"), "lumo-config-test-missing").unwrap_err();
        assert!(matches!(err, ConfigError::NoCredentials { .. }));
    }

    #[test]
    fn bridge_config_from_profile() {
        let profile = Profile {
            app_key: Some("k".into()),
            transport: Transport::Direct,
            timeout: Some(3),
            poll_interval: Some(0),
            ..Profile::new(" 192.168.1.20 ")
        };
        let cfg = profile_to_bridge_config(&profile, "lumo-config-test-bridge").unwrap();

        let ConnectionMode::Live {
            host, transport, ..
        } = &cfg.mode
        else {
            panic!("expected live mode");
        };
        assert_eq!(host, "192.168.1.20");
        assert_eq!(*transport, BridgeTransport::Direct);
        assert_eq!(cfg.timeout, Duration::from_secs(3));
        assert_eq!(cfg.poll_interval_secs, 0);
    }

    #[test]
    fn empty_bridge_is_rejected() {
        let profile = Profile {
            app_key: Some("k".into()),
            ..Profile::new("  ")
        };
        assert!(matches!(
            profile_to_bridge_config(&profile, "x"),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn assistant_config_absent_without_table() {
        let profile = Profile::new("h");
        assert!(assistant_config(&profile, "x").unwrap().is_none());
    }

    #[test]
    fn assistant_config_uses_plaintext_key() {
        let profile = Profile {
            assistant: Some(AssistantProfile {
                provider: Provider::OpenAiCompatible,
                model: Some("gpt-4o-mini".into()),
                base_url: Some("http://localhost:11434/v1".into()),
                api_key_env: Some("LUMO_TEST_SURELY_UNSET_VARIABLE".into()),
                api_key: Some("sk-test".into()),
            }),
            ..Profile::new("h")
        };
        let cfg = assistant_config(&profile, "lumo-config-test-assistant")
            .unwrap()
            .unwrap();
        assert_eq!(cfg.provider, Provider::OpenAiCompatible);
        assert_eq!(cfg.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(cfg.api_key.expose_secret(), "sk-test");
    }
}
