//! Light command handlers.

use tabled::Tabled;

use lumo_core::{Command as CoreCommand, CommandResult, Controller, Light, LightColor, LightUpdate};

use crate::cli::{LightSetArgs, LightsArgs, LightsCommand, OutputFormat};
use crate::error::{CliError, not_found};
use crate::output;

use super::{Context, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct LightRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Power")]
    power: String,
    #[tabled(rename = "Brightness")]
    brightness: String,
    #[tabled(rename = "Color")]
    color: String,
    #[tabled(rename = "Type")]
    archetype: String,
}

fn row(light: &Light, color: bool) -> LightRow {
    LightRow {
        id: light.id.clone(),
        name: light.name.clone(),
        power: output::power(light.on, color),
        brightness: light
            .brightness
            .map_or_else(|| "-".into(), |b| output::brightness_bar(b, color)),
        color: util::describe_color(light.color),
        archetype: light.archetype.clone().unwrap_or_default(),
    }
}

fn detail(light: &Light) -> String {
    let mut lines = vec![
        format!("ID:         {}", light.id),
        format!("Name:       {}", light.name),
        format!("Power:      {}", if light.on { "on" } else { "off" }),
        format!(
            "Brightness: {}",
            light
                .brightness
                .map_or_else(|| "not dimmable".into(), |b| format!("{b:.0}%"))
        ),
    ];
    match light.color {
        Some(LightColor::Xy(xy)) => lines.push(format!("Color:      xy {:.4}, {:.4}", xy.x, xy.y)),
        Some(LightColor::Temperature { mirek }) => lines.push(format!(
            "Color:      {mirek} mirek ({})",
            util::describe_color(light.color)
        )),
        None => {}
    }
    if let Some(ref archetype) = light.archetype {
        lines.push(format!("Type:       {archetype}"));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: LightsArgs,
    ctx: &Context,
) -> Result<(), CliError> {
    let snap = controller.snapshot();

    match args.command {
        LightsCommand::List => {
            let out = output::render_list(
                ctx.output,
                &snap.lights,
                |l| row(l, ctx.color),
                |l| l.id.clone(),
            );
            ctx.print(&out);
            Ok(())
        }

        LightsCommand::Get { light } => {
            let found = snap
                .resolve_light(&light)
                .ok_or_else(|| not_found("light", light.clone(), "lights"))?;
            let out = output::render_single(ctx.output, found, detail, |l| l.id.clone());
            ctx.print(&out);
            Ok(())
        }

        LightsCommand::On { lights } => {
            let targets = util::select_lights(&snap, &lights)?;
            apply(controller, &targets, LightUpdate::power(true), ctx).await
        }

        LightsCommand::Off { lights } => {
            let targets = util::select_lights(&snap, &lights)?;
            apply(controller, &targets, LightUpdate::power(false), ctx).await
        }

        LightsCommand::Set(set) => {
            let update = build_update(&set)?;
            let targets = util::select_lights(&snap, &set.lights)?;
            apply(controller, &targets, update, ctx).await
        }
    }
}

/// Translate `lights set` flags into a partial update.
fn build_update(args: &LightSetArgs) -> Result<LightUpdate, CliError> {
    let mut update = LightUpdate::new();

    if args.on {
        update = update.with_on(true);
    } else if args.off {
        update = update.with_on(false);
    }
    if let Some(b) = args.brightness {
        update = update.with_brightness(util::validate_brightness(b)?);
    }
    if let Some(ref name) = args.color {
        update = update.with_xy(util::parse_color(name)?);
    }
    if let Some(ref raw) = args.xy {
        update = update.with_xy(util::parse_xy(raw)?);
    }
    if let Some(mirek) = args.mirek {
        update = update.with_mirek(util::validate_mirek(mirek)?);
    }

    if update.is_empty() {
        return Err(CliError::Validation {
            field: "set".into(),
            reason: "nothing to change; pass --on/--off, --brightness, --color, --xy or --mirek"
                .into(),
        });
    }
    Ok(update)
}

async fn apply(
    controller: &Controller,
    targets: &[Light],
    update: LightUpdate,
    ctx: &Context,
) -> Result<(), CliError> {
    let count = match targets {
        [single] => {
            controller
                .execute(CoreCommand::SetLight {
                    light_id: single.id.clone(),
                    update,
                })
                .await?;
            1
        }
        _ => match controller
            .execute(CoreCommand::SetLights {
                light_ids: targets.iter().map(|l| l.id.clone()).collect(),
                update,
            })
            .await?
        {
            CommandResult::Affected(n) => n,
            CommandResult::Ok => targets.len(),
        },
    };

    let names: Vec<&str> = targets.iter().map(|l| l.name.as_str()).collect();
    ctx.status(&format!(
        "{} ({count} light{}): {}",
        names.join(", "),
        if count == 1 { "" } else { "s" },
        util::describe_update(&update)
    ));

    // Reflect the reconciled state for scripted callers.
    let snap = controller.snapshot();
    let updated: Vec<Light> = targets
        .iter()
        .filter_map(|t| snap.light(&t.id).cloned())
        .collect();
    if ctx.output != OutputFormat::Table {
        let out = output::render_list(ctx.output, &updated, |l| row(l, false), |l| l.id.clone());
        ctx.print(&out);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::cli::{Cli, Command};

    fn set_args(args: &[&str]) -> LightSetArgs {
        let mut argv = vec!["lumo", "lights", "set"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Lights(LightsArgs {
                command: LightsCommand::Set(set),
            }) => set,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn set_builds_partial_update() {
        let update = build_update(&set_args(&["all", "--brightness", "40", "--color", "red"]))
            .unwrap();
        assert_eq!(update.on(), None);
        assert_eq!(update.brightness(), Some(40.0));
        assert!(matches!(update.color(), Some(LightColor::Xy(_))));
    }

    #[test]
    fn set_without_changes_is_rejected() {
        assert!(matches!(
            build_update(&set_args(&["strip"])),
            Err(CliError::Validation { .. })
        ));
    }

    #[test]
    fn color_and_mirek_conflict_at_parse_time() {
        assert!(
            Cli::try_parse_from([
                "lumo", "lights", "set", "x", "--color", "red", "--mirek", "300"
            ])
            .is_err()
        );
    }

    #[test]
    fn mirek_out_of_range_is_rejected() {
        assert!(build_update(&set_args(&["x", "--mirek", "90"])).is_err());
    }
}
