#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;

use lumo_config::{
    AssistantProfile, Config, ConfigError, Profile, Transport, clear_profile_at, load_config_at,
    save_config_at,
};
use lumo_core::Provider;

fn sample() -> Config {
    let mut cfg = Config::default();
    cfg.profiles.insert(
        "default".into(),
        Profile {
            app_key: Some("abc123".into()),
            poll_interval: Some(10),
            ..Profile::new("192.168.1.20")
        },
    );
    cfg.profiles.insert(
        "cabin".into(),
        Profile {
            app_key_env: Some("CABIN_KEY".into()),
            transport: Transport::Direct,
            insecure: Some(false),
            ca_cert: Some("/etc/lumo/cabin.pem".into()),
            assistant: Some(AssistantProfile {
                provider: Provider::OpenAiCompatible,
                model: Some("gpt-4o".into()),
                ..AssistantProfile::default()
            }),
            ..Profile::new("cabin.local")
        },
    );
    cfg
}

#[test]
fn missing_file_loads_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = load_config_at(&dir.path().join("nope.toml")).unwrap();
    assert_eq!(cfg.default_profile.as_deref(), Some("default"));
    assert!(cfg.profiles.is_empty());
    assert_eq!(cfg.defaults.output, "table");
}

#[test]
fn saved_config_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let cfg = sample();
    save_config_at(&cfg, &path).unwrap();
    let loaded = load_config_at(&path).unwrap();

    assert_eq!(loaded, cfg);
}

#[test]
fn hand_written_toml_is_understood() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
default_profile = "home"

[defaults]
output = "json"

[profiles.home]
bridge = "10.0.0.5"
app_key = "k"
transport = "direct"
timeout = 4

[profiles.home.assistant]
provider = "anthropic"
api_key_env = "MY_KEY"
"#,
    )
    .unwrap();

    let cfg = load_config_at(&path).unwrap();
    assert_eq!(cfg.active_profile_name(None), "home");
    assert_eq!(cfg.defaults.output, "json");
    assert_eq!(cfg.defaults.color, "auto");

    let home = cfg.profile("home").unwrap();
    assert_eq!(home.transport, Transport::Direct);
    assert_eq!(home.timeout, Some(4));
    let assistant = home.assistant.as_ref().unwrap();
    assert_eq!(assistant.provider, Provider::Anthropic);
    assert_eq!(assistant.api_key_env.as_deref(), Some("MY_KEY"));
}

#[test]
fn invalid_transport_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[profiles.x]\nbridge = \"h\"\ntransport = \"carrier-pigeon\"\n")
        .unwrap();

    assert!(matches!(
        load_config_at(&path),
        Err(ConfigError::Figment(_))
    ));
}

#[test]
fn clear_profile_rewrites_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    save_config_at(&sample(), &path).unwrap();

    let removed = clear_profile_at(&path, "default").unwrap();
    assert_eq!(removed.bridge, "192.168.1.20");

    let cfg = load_config_at(&path).unwrap();
    assert_eq!(cfg.profiles.keys().collect::<Vec<_>>(), vec!["cabin"]);
    assert_eq!(cfg.default_profile.as_deref(), Some("cabin"));

    assert!(matches!(
        clear_profile_at(&path, "default"),
        Err(ConfigError::ProfileNotFound { .. })
    ));
}

#[cfg(unix)]
#[test]
fn saved_file_is_private() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    save_config_at(&sample(), &path).unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}
