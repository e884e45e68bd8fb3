//! Integration tests for the `lumo` CLI binary.
//!
//! Everything runs against the built-in demo home or fails before any
//! network access, so no bridge is needed.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `lumo` binary with env isolation.
///
/// Clears all `LUMO_*` env vars and points the config file into `dir`
/// so tests never touch the user's real configuration.
fn lumo_cmd(dir: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("lumo");
    cmd.env("HOME", "/tmp/lumo-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/lumo-cli-test-nonexistent")
        .env("LUMO_CONFIG", dir.join("config.toml"))
        .env("NO_COLOR", "1")
        .env_remove("LUMO_PROFILE")
        .env_remove("LUMO_BRIDGE")
        .env_remove("LUMO_APP_KEY")
        .env_remove("LUMO_DEMO")
        .env_remove("LUMO_OUTPUT")
        .env_remove("LUMO_COLOR_MODE")
        .env_remove("LUMO_INSECURE")
        .env_remove("LUMO_TIMEOUT")
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("OPENAI_API_KEY");
    cmd
}

/// Demo home with no simulated latency.
fn demo_cmd(dir: &Path) -> assert_cmd::Command {
    let mut cmd = lumo_cmd(dir);
    cmd.args(["--demo", "--demo-latency", "0"]);
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let dir = tempfile::tempdir().unwrap();
    let output = lumo_cmd(dir.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let dir = tempfile::tempdir().unwrap();
    lumo_cmd(dir.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("lights")
            .and(predicate::str::contains("rooms"))
            .and(predicate::str::contains("scenes"))
            .and(predicate::str::contains("pair")),
    );
}

#[test]
fn test_version_flag() {
    let dir = tempfile::tempdir().unwrap();
    lumo_cmd(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("lumo"));
}

#[test]
fn test_completions_zsh() {
    let dir = tempfile::tempdir().unwrap();
    lumo_cmd(dir.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_ignore_broken_config() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "not = [valid").unwrap();
    lumo_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Demo home ───────────────────────────────────────────────────────

#[test]
fn test_demo_lights_list_plain() {
    let dir = tempfile::tempdir().unwrap();
    demo_cmd(dir.path())
        .args(["lights", "list", "-o", "plain"])
        .assert()
        .success()
        .stdout("l1\nl2\nl3\nl4\nl5\n");
}

#[test]
fn test_demo_rooms_list_json() {
    let dir = tempfile::tempdir().unwrap();
    let output = demo_cmd(dir.path())
        .args(["rooms", "list", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let rooms: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rooms = rooms.as_array().unwrap();
    assert_eq!(rooms.len(), 3);
    let kitchen = rooms
        .iter()
        .find(|r| r["room"]["name"] == "Kitchen")
        .unwrap();
    assert_eq!(kitchen["light_count"], 2);
    assert_eq!(kitchen["any_on"], false);
}

#[test]
fn test_demo_set_color_by_partial_name() {
    let dir = tempfile::tempdir().unwrap();
    let output = demo_cmd(dir.path())
        .args(["lights", "set", "kitchen", "--color", "red", "-o", "json-compact"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Kitchen Ceiling 1"), "{stderr}");
    assert!(stderr.contains("2 lights"), "{stderr}");

    let lights: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(lights.as_array().unwrap().len(), 2);
}

#[test]
fn test_demo_set_without_changes_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    demo_cmd(dir.path())
        .args(["lights", "set", "kitchen"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("nothing to change"));
}

#[test]
fn test_demo_unknown_light_exits_not_found() {
    let dir = tempfile::tempdir().unwrap();
    demo_cmd(dir.path())
        .args(["lights", "on", "porch"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("porch"));
}

#[test]
fn test_demo_room_toggle_reports_count() {
    let dir = tempfile::tempdir().unwrap();
    demo_cmd(dir.path())
        .args(["rooms", "on", "Kitchen"])
        .assert()
        .success()
        .stderr(predicate::str::contains("2 lights"));
}

#[test]
fn test_demo_scenes_filtered_by_room() {
    let dir = tempfile::tempdir().unwrap();
    demo_cmd(dir.path())
        .args(["scenes", "list", "--room", "Kitchen", "-o", "plain"])
        .assert()
        .success()
        .stdout("s2\n");
}

#[test]
fn test_demo_scene_activation() {
    let dir = tempfile::tempdir().unwrap();
    demo_cmd(dir.path())
        .args(["scenes", "activate", "relax"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Relax"));
}

#[test]
fn test_demo_devices_list() {
    let dir = tempfile::tempdir().unwrap();
    demo_cmd(dir.path())
        .args(["devices", "list", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("d0").and(predicate::str::contains("d5")));
}

#[test]
fn test_demo_watch_single_update() {
    let dir = tempfile::tempdir().unwrap();
    demo_cmd(dir.path())
        .args(["watch", "-n", "1", "-o", "plain"])
        .timeout(std::time::Duration::from_secs(20))
        .assert()
        .success()
        .stdout(predicate::str::contains("r1\ton").and(predicate::str::contains("r2\toff")));
}

// ── Missing configuration ───────────────────────────────────────────

#[test]
fn test_no_config_reports_missing_bridge() {
    let dir = tempfile::tempdir().unwrap();
    let output = lumo_cmd(dir.path()).args(["lights", "list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(text.contains("No bridge configured"), "{text}");
}

#[test]
fn test_ask_without_key_is_auth_error() {
    let dir = tempfile::tempdir().unwrap();
    demo_cmd(dir.path())
        .args(["ask", "make", "the", "kitchen", "blue"])
        .assert()
        .code(3);
}

// ── Config commands ─────────────────────────────────────────────────

#[test]
fn test_config_path_follows_env() {
    let dir = tempfile::tempdir().unwrap();
    let expected = dir.path().join("config.toml");
    lumo_cmd(dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(format!("{}\n", expected.display()));
}

#[test]
fn test_config_show_masks_plaintext_keys() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "default_profile = \"home\"\n\n[profiles.home]\nbridge = \"10.0.0.2\"\napp_key = \"super-secret\"\n",
    )
    .unwrap();
    lumo_cmd(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("10.0.0.2")
                .and(predicate::str::contains("****"))
                .and(predicate::str::contains("super-secret").not()),
        );
}

#[test]
fn test_config_clear_unknown_profile() {
    let dir = tempfile::tempdir().unwrap();
    lumo_cmd(dir.path())
        .args(["config", "clear", "attic", "-y"])
        .assert()
        .code(4);
}

#[test]
fn test_config_clear_requires_yes_when_not_interactive() {
    let dir = tempfile::tempdir().unwrap();
    lumo_cmd(dir.path())
        .args(["config", "clear", "attic"])
        .assert()
        .code(2);
}
