//! Config subcommand handlers.

use lumo_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::{Context, util};

const MASK: &str = "****";

/// Copy of the config with plaintext secrets masked.
fn redacted(cfg: &Config) -> Config {
    let mut out = cfg.clone();
    for profile in out.profiles.values_mut() {
        if let Some(key) = profile.app_key.as_mut() {
            MASK.clone_into(key);
        }
        if let Some(key) = profile.assistant.as_mut().and_then(|a| a.api_key.as_mut()) {
            MASK.clone_into(key);
        }
    }
    out
}

pub fn handle(args: &ConfigArgs, ctx: &Context) -> Result<(), CliError> {
    match &args.command {
        ConfigCommand::Show => {
            let safe = redacted(&ctx.config);
            let out = match ctx.output {
                OutputFormat::Table | OutputFormat::Plain => toml::to_string_pretty(&safe)
                    .map_err(|e| CliError::Internal(e.to_string()))?,
                format => {
                    output::render_single(format, &safe, |_| String::new(), |_| String::new())
                }
            };
            ctx.print(out.trim_end());
            Ok(())
        }

        ConfigCommand::Path => {
            // Not subject to --quiet; the path is the whole point.
            println!("{}", config::config_path().display());
            Ok(())
        }

        ConfigCommand::Clear { profile } => {
            let name = profile
                .clone()
                .unwrap_or_else(|| config::active_profile_name(&ctx.global, &ctx.config));
            let prompt = format!("Remove profile '{name}' and its stored keys?");
            if !util::confirm(&prompt, ctx.global.yes)? {
                return Ok(());
            }
            lumo_config::clear_profile(&name)?;
            ctx.status(&format!("Profile '{name}' removed"));
            Ok(())
        }
    }
}
