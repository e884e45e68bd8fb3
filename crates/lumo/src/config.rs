//! CLI configuration: thin wrapper around `lumo_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--bridge, --app-key, --insecure, --timeout, --demo).

use std::time::Duration;

use clap::ValueEnum;
use secrecy::SecretString;

use lumo_config::{AssistantProfile, Config, Profile};
use lumo_core::config::DEFAULT_POLL_INTERVAL_SECS;
use lumo_core::{AssistantConfig, BridgeConfig, ConnectionMode, Provider, TlsVerification};

use crate::cli::{AskArgs, GlobalOpts, OutputFormat};
use crate::error::CliError;

pub use lumo_config::{config_path, load_config};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Output format: flag, then `[defaults] output`, then table.
pub fn output_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    global
        .output
        .or_else(|| OutputFormat::from_str(&config.defaults.output, true).ok())
        .unwrap_or(OutputFormat::Table)
}

/// Request timeout: flag, then profile, then `[defaults] timeout`.
fn timeout(global: &GlobalOpts, profile: Option<&Profile>, config: &Config) -> Duration {
    Duration::from_secs(
        global
            .timeout
            .or_else(|| profile.and_then(|p| p.timeout))
            .unwrap_or(config.defaults.timeout),
    )
}

/// Build the `BridgeConfig` for this invocation.
///
/// `--demo` wins outright. Otherwise the active profile is used with flag
/// overrides; without a profile, `--bridge` + `--app-key` must be given.
pub fn bridge_config(global: &GlobalOpts, config: &Config) -> Result<BridgeConfig, CliError> {
    let profile_name = active_profile_name(global, config);
    let profile = config.profiles.get(&profile_name);

    if global.demo {
        return Ok(BridgeConfig {
            mode: ConnectionMode::Demo {
                latency: Duration::from_millis(global.demo_latency),
            },
            timeout: timeout(global, profile, config),
            ..BridgeConfig::demo()
        });
    }

    // An explicitly requested profile must exist.
    if profile.is_none() && global.profile.is_some() {
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: config.profile_names(),
        });
    }

    let Some(profile) = profile else {
        let host = global.bridge.clone().ok_or_else(|| CliError::NoConfig {
            path: config_path().display().to_string(),
        })?;
        let key = global
            .app_key
            .clone()
            .ok_or(CliError::NoCredentials {
                profile: profile_name,
            })?;

        let mut cfg = BridgeConfig::live(host, SecretString::from(key));
        cfg.timeout = timeout(global, None, config);
        return Ok(cfg);
    };

    resolve_profile(profile, &profile_name, global, config)
}

/// Translate a `Profile` + global flags into a `BridgeConfig`.
fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
    config: &Config,
) -> Result<BridgeConfig, CliError> {
    // 1. Host (flag > env > profile)
    let host = global.bridge.clone().unwrap_or_else(|| profile.bridge.clone());
    if host.trim().is_empty() {
        return Err(CliError::Validation {
            field: "bridge".into(),
            reason: format!("profile '{profile_name}' has no bridge address"),
        });
    }

    // 2. Application key (flag > env var > keyring > plaintext)
    let app_key = match global.app_key.clone() {
        Some(key) => SecretString::from(key),
        None => lumo_config::resolve_app_key(profile, profile_name)?,
    };

    // 3. TLS
    let tls = if global.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        lumo_config::tls_for(profile)
    };

    Ok(BridgeConfig {
        mode: ConnectionMode::Live {
            host: host.trim().to_owned(),
            app_key,
            transport: profile.transport.into(),
        },
        tls,
        timeout: timeout(global, Some(profile), config),
        poll_interval_secs: profile.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
    })
}

/// Assistant settings: the profile's `[assistant]` table with `ask` flag
/// overrides, or flags plus the provider's conventional key variable.
pub fn assistant_config(
    global: &GlobalOpts,
    config: &Config,
    args: &AskArgs,
) -> Result<AssistantConfig, CliError> {
    let profile_name = active_profile_name(global, config);
    let mut assistant: AssistantProfile = config
        .profiles
        .get(&profile_name)
        .and_then(|p| p.assistant.clone())
        .unwrap_or_default();

    if let Some(provider) = args.provider.as_deref() {
        let provider: Provider = provider.parse().map_err(|_| CliError::Validation {
            field: "provider".into(),
            reason: format!("expected 'anthropic' or 'openai', got '{provider}'"),
        })?;
        if provider != assistant.provider {
            // A different provider's key variable no longer applies.
            assistant.api_key_env = None;
            assistant.api_key = None;
        }
        assistant.provider = provider;
    }
    if let Some(model) = &args.model {
        assistant.model = Some(model.clone());
    }
    if let Some(base_url) = &args.base_url {
        assistant.base_url = Some(base_url.clone());
    }

    Ok(AssistantConfig {
        provider: assistant.provider,
        api_key: lumo_config::resolve_assistant_key(&assistant, &profile_name)?,
        model: assistant.model,
        base_url: assistant.base_url,
    })
}

/// Poll interval for `watch`: flag, then profile, then the core default.
pub fn poll_interval(global: &GlobalOpts, config: &Config, flag: Option<u64>) -> u64 {
    let profile_name = active_profile_name(global, config);
    flag.or_else(|| {
        config
            .profiles
            .get(&profile_name)
            .and_then(|p| p.poll_interval)
    })
    .filter(|secs| *secs > 0)
    .unwrap_or(DEFAULT_POLL_INTERVAL_SECS)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["lumo"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["devices", "list"]);
        Cli::try_parse_from(argv).unwrap().global
    }

    fn with_profile() -> Config {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                app_key: Some("stored".into()),
                timeout: Some(4),
                poll_interval: Some(9),
                ..Profile::new("10.0.0.2")
            },
        );
        cfg
    }

    #[test]
    fn demo_flag_ignores_profiles() {
        let cfg = bridge_config(&global(&["--demo"]), &Config::default()).unwrap();
        assert!(cfg.is_demo());
    }

    #[test]
    fn missing_profile_without_flags_is_no_config() {
        let err = bridge_config(&global(&[]), &Config::default()).unwrap_err();
        assert!(matches!(err, CliError::NoConfig { .. }));
    }

    #[test]
    fn bridge_flag_without_key_needs_credentials() {
        let err = bridge_config(&global(&["--bridge", "10.0.0.9"]), &Config::default())
            .unwrap_err();
        assert!(matches!(err, CliError::NoCredentials { .. }));
    }

    #[test]
    fn unknown_explicit_profile_is_reported() {
        let err = bridge_config(&global(&["-p", "attic"]), &with_profile()).unwrap_err();
        assert!(matches!(err, CliError::ProfileNotFound { .. }));
    }

    #[test]
    fn flags_override_profile() {
        let cfg = bridge_config(
            &global(&["--bridge", "10.0.0.7", "--timeout", "2", "-k"]),
            &with_profile(),
        )
        .unwrap();
        assert_eq!(cfg.host_label(), "10.0.0.7");
        assert_eq!(cfg.timeout, Duration::from_secs(2));
        assert_eq!(cfg.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(cfg.poll_interval_secs, 9);
    }

    #[test]
    fn profile_supplies_defaults() {
        let cfg = bridge_config(&global(&[]), &with_profile()).unwrap();
        assert_eq!(cfg.host_label(), "10.0.0.2");
        assert_eq!(cfg.timeout, Duration::from_secs(4));
    }

    #[test]
    fn output_falls_back_to_config_default() {
        let mut cfg = Config::default();
        cfg.defaults.output = "yaml".into();
        assert_eq!(output_format(&global(&[]), &cfg), OutputFormat::Yaml);
        assert_eq!(
            output_format(&global(&["-o", "json-compact"]), &cfg),
            OutputFormat::JsonCompact
        );
        cfg.defaults.output = "nonsense".into();
        assert_eq!(output_format(&global(&[]), &cfg), OutputFormat::Table);
    }

    #[test]
    fn watch_interval_prefers_flag() {
        let cfg = with_profile();
        assert_eq!(poll_interval(&global(&[]), &cfg, Some(2)), 2);
        assert_eq!(poll_interval(&global(&[]), &cfg, None), 9);
        assert_eq!(
            poll_interval(&global(&[]), &Config::default(), None),
            DEFAULT_POLL_INTERVAL_SECS
        );
    }
}
