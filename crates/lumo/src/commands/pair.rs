//! `lumo pair`: link-button handshake, then persist the profile.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use secrecy::ExposeSecret;
use tracing::warn;

use lumo_config::SecretKind;
use lumo_core::pairing::{device_type, pairing_client};
use lumo_core::{PairingOptions, pair};

use crate::cli::PairArgs;
use crate::config;
use crate::error::CliError;

use super::Context;

const WAIT_MESSAGE: &str = "Press the link button on the bridge";

fn spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.yellow} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.enable_steady_tick(Duration::from_millis(100));
    bar.set_message(format!("{WAIT_MESSAGE}..."));
    bar
}

/// Name announced to the bridge; shows up in its list of apps.
fn local_device_type() -> String {
    let host = std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .unwrap_or_default();
    device_type(&host)
}

pub async fn handle(args: &PairArgs, ctx: &Context) -> Result<(), CliError> {
    let mut cfg = ctx.config.clone();
    let profile_name = args
        .name
        .clone()
        .unwrap_or_else(|| config::active_profile_name(&ctx.global, &cfg));
    let timeout = Duration::from_secs(ctx.global.timeout.unwrap_or(cfg.defaults.timeout));

    let client = pairing_client(&args.ip, timeout)?;
    let options = PairingOptions {
        attempts: args.attempts,
        ..PairingOptions::default()
    };

    let bar = spinner(ctx.global.quiet);
    let result = pair(&client, &local_device_type(), options, |attempt, total| {
        bar.set_message(format!("{WAIT_MESSAGE}... ({attempt}/{total})"));
    })
    .await;
    bar.finish_and_clear();
    let app_key = result?;

    let mut profile = cfg.profiles.remove(&profile_name).unwrap_or_default();
    profile.bridge.clone_from(&args.ip);
    profile.app_key = None;

    if args.plaintext {
        profile.app_key = Some(app_key.expose_secret().to_owned());
    } else if let Err(e) = lumo_config::store_secret(&profile_name, SecretKind::AppKey, &app_key) {
        warn!(error = %e, "keyring unavailable");
        ctx.status("System keyring unavailable; storing the key in the config file.");
        profile.app_key = Some(app_key.expose_secret().to_owned());
    }

    cfg.profiles.insert(profile_name.clone(), profile);
    if cfg.default_profile.is_none() {
        cfg.default_profile = Some(profile_name.clone());
    }
    lumo_config::save_config(&cfg)?;

    ctx.status(&format!(
        "Paired with {}. Saved as profile '{profile_name}' in {}",
        args.ip,
        config::config_path().display()
    ));
    Ok(())
}
