//! Room command handlers.

use tabled::Tabled;

use lumo_core::{Command as CoreCommand, CommandResult, Controller, HomeSnapshot, RoomView};

use crate::cli::{RoomsArgs, RoomsCommand};
use crate::error::CliError;
use crate::output;

use super::{Context, util};

#[derive(Tabled)]
struct RoomRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Lights")]
    lights: usize,
    #[tabled(rename = "Power")]
    power: String,
    #[tabled(rename = "Brightness")]
    brightness: String,
}

fn row(view: &RoomView, color: bool) -> RoomRow {
    RoomRow {
        id: view.room.id.clone(),
        name: view.room.name.clone(),
        lights: view.light_count,
        power: output::power(view.any_on, color),
        brightness: output::brightness_bar(view.avg_brightness, color),
    }
}

fn detail(view: &RoomView, snap: &HomeSnapshot) -> String {
    let mut lines = vec![
        format!("ID:         {}", view.room.id),
        format!("Name:       {}", view.room.name),
        format!("Power:      {}", if view.any_on { "on" } else { "off" }),
        format!("Brightness: {:.0}%", view.avg_brightness),
        format!("Lights:     {}", view.light_count),
    ];
    for id in &view.light_ids {
        if let Some(light) = snap.light(id) {
            lines.push(format!(
                "  - {} ({}, {})",
                light.name,
                if light.on { "on" } else { "off" },
                light
                    .brightness
                    .map_or_else(|| "-".into(), |b| format!("{b:.0}%"))
            ));
        }
    }
    let scenes: Vec<&str> = snap
        .scenes_for_room(&view.room.id)
        .map(|s| s.name.as_str())
        .collect();
    if !scenes.is_empty() {
        lines.push(format!("Scenes:     {}", scenes.join(", ")));
    }
    lines.join("\n")
}

pub async fn handle(
    controller: &Controller,
    args: RoomsArgs,
    ctx: &Context,
) -> Result<(), CliError> {
    let snap = controller.snapshot();

    match args.command {
        RoomsCommand::List => {
            let out = output::render_list(
                ctx.output,
                &snap.rooms,
                |r| row(r, ctx.color),
                |r| r.room.id.clone(),
            );
            ctx.print(&out);
            Ok(())
        }

        RoomsCommand::Get { room } => {
            let view = util::resolve_room(&snap, &room)?;
            let out = output::render_single(
                ctx.output,
                view,
                |v| detail(v, &snap),
                |v| v.room.id.clone(),
            );
            ctx.print(&out);
            Ok(())
        }

        RoomsCommand::On { room } => toggle(controller, &snap, &room, true, ctx).await,
        RoomsCommand::Off { room } => toggle(controller, &snap, &room, false, ctx).await,
    }
}

async fn toggle(
    controller: &Controller,
    snap: &HomeSnapshot,
    query: &str,
    on: bool,
    ctx: &Context,
) -> Result<(), CliError> {
    let view = util::resolve_room(snap, query)?;
    let result = controller
        .execute(CoreCommand::ToggleRoom {
            room_id: view.room.id.clone(),
            on,
        })
        .await?;

    let count = match result {
        CommandResult::Affected(n) => n,
        CommandResult::Ok => view.light_count,
    };
    ctx.status(&format!(
        "{}: {count} light{} turned {}",
        view.room.name,
        if count == 1 { "" } else { "s" },
        if on { "on" } else { "off" }
    ));
    Ok(())
}
