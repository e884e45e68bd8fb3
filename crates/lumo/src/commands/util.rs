//! Shared helpers for command handlers.

use std::future::Future;

use lumo_core::color::{color_names, named_color};
use lumo_core::{
    Controller, HomeSnapshot, Light, LightColor, LightUpdate, RoomView, Scene, Xy,
};

use crate::config;
use crate::error::{CliError, not_found};

use super::Context;

/// Connect for one request-response cycle, run `f`, disconnect.
pub async fn with_controller<F, Fut>(ctx: &Context, f: F) -> Result<(), CliError>
where
    F: FnOnce(Controller) -> Fut,
    Fut: Future<Output = Result<(), CliError>>,
{
    let bridge = config::bridge_config(&ctx.global, &ctx.config)?;
    Controller::oneshot(bridge, |controller| async move { Ok(f(controller).await) }).await?
}

/// Lights addressed by `query`: an exact id or name wins, otherwise every
/// light whose name contains it ("all" selects everything).
pub fn select_lights(snap: &HomeSnapshot, query: &str) -> Result<Vec<Light>, CliError> {
    if let Some(light) = snap.resolve_light(query) {
        return Ok(vec![light.clone()]);
    }
    let matched: Vec<Light> = snap.match_lights(query).into_iter().cloned().collect();
    if matched.is_empty() {
        return Err(not_found("light", query.into(), "lights"));
    }
    Ok(matched)
}

pub fn resolve_room<'a>(snap: &'a HomeSnapshot, query: &str) -> Result<&'a RoomView, CliError> {
    snap.resolve_room(query)
        .ok_or_else(|| not_found("room", query.into(), "rooms"))
}

pub fn resolve_scene<'a>(snap: &'a HomeSnapshot, query: &str) -> Result<&'a Scene, CliError> {
    snap.resolve_scene(query)
        .ok_or_else(|| not_found("scene", query.into(), "scenes"))
}

/// Parse `"x,y"` into chromaticity coordinates within the unit square.
pub fn parse_xy(raw: &str) -> Result<Xy, CliError> {
    let invalid = || CliError::Validation {
        field: "xy".into(),
        reason: format!("expected two numbers between 0 and 1 as \"x,y\", got '{raw}'"),
    };
    let (x, y) = raw.split_once(',').ok_or_else(invalid)?;
    let x: f64 = x.trim().parse().map_err(|_| invalid())?;
    let y: f64 = y.trim().parse().map_err(|_| invalid())?;
    if !(0.0..=1.0).contains(&x) || !(0.0..=1.0).contains(&y) {
        return Err(invalid());
    }
    Ok(Xy::new(x, y))
}

/// Look up a named colour, listing the known names on failure.
pub fn parse_color(name: &str) -> Result<Xy, CliError> {
    named_color(name).ok_or_else(|| CliError::Validation {
        field: "color".into(),
        reason: format!(
            "unknown color '{name}' (known: {})",
            color_names().collect::<Vec<_>>().join(", ")
        ),
    })
}

pub fn validate_brightness(value: f64) -> Result<f64, CliError> {
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(CliError::Validation {
            field: "brightness".into(),
            reason: format!("must be between 0 and 100, got {value}"),
        })
    }
}

pub fn validate_mirek(value: u16) -> Result<u16, CliError> {
    if (153..=500).contains(&value) {
        Ok(value)
    } else {
        Err(CliError::Validation {
            field: "mirek".into(),
            reason: format!("must be between 153 and 500, got {value}"),
        })
    }
}

/// Short human description of a light's colour.
pub fn describe_color(color: Option<LightColor>) -> String {
    match color {
        Some(LightColor::Xy(Xy { x, y })) => format!("xy {x:.3},{y:.3}"),
        Some(LightColor::Temperature { mirek }) if mirek > 0 => {
            format!("{}K", 1_000_000 / u32::from(mirek))
        }
        Some(LightColor::Temperature { mirek }) => format!("{mirek} mirek"),
        None => "-".into(),
    }
}

/// Describe what an update does, e.g. "on, 40%, xy 0.700,0.299".
pub fn describe_update(update: &LightUpdate) -> String {
    let mut parts = Vec::new();
    if let Some(on) = update.on() {
        parts.push(if on { "on".to_owned() } else { "off".to_owned() });
    }
    if let Some(b) = update.brightness() {
        parts.push(format!("{b:.0}%"));
    }
    if update.color().is_some() {
        parts.push(describe_color(update.color()));
    }
    parts.join(", ")
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}
