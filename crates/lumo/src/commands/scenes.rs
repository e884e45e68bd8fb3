//! Scene command handlers.

use serde::Serialize;
use tabled::Tabled;

use lumo_core::{Command as CoreCommand, Controller, Scene};

use crate::cli::{ScenesArgs, ScenesCommand};
use crate::error::CliError;
use crate::output;

use super::{Context, util};

#[derive(Tabled)]
struct SceneRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Room")]
    room: String,
}

/// Scene with its room resolved, for every output format.
#[derive(Serialize)]
struct SceneListing<'a> {
    #[serde(flatten)]
    scene: &'a Scene,
    room_name: Option<&'a str>,
}

pub async fn handle(
    controller: &Controller,
    args: ScenesArgs,
    ctx: &Context,
) -> Result<(), CliError> {
    let snap = controller.snapshot();

    match args.command {
        ScenesCommand::List { room } => {
            let room_id = room
                .as_deref()
                .map(|q| util::resolve_room(&snap, q).map(|v| v.room.id.clone()))
                .transpose()?;

            let listing: Vec<SceneListing<'_>> = snap
                .scenes
                .iter()
                .filter(|s| room_id.as_ref().is_none_or(|id| &s.room_id == id))
                .map(|scene| SceneListing {
                    scene,
                    room_name: snap.room_name(&scene.room_id),
                })
                .collect();

            let out = output::render_list(
                ctx.output,
                &listing,
                |s| SceneRow {
                    id: s.scene.id.clone(),
                    name: s.scene.name.clone(),
                    room: s.room_name.unwrap_or("-").to_owned(),
                },
                |s| s.scene.id.clone(),
            );
            ctx.print(&out);
            Ok(())
        }

        ScenesCommand::Activate { scene } => {
            let found = util::resolve_scene(&snap, &scene)?;
            controller
                .execute(CoreCommand::ActivateScene {
                    scene_id: found.id.clone(),
                })
                .await?;
            ctx.status(&format!("Scene '{}' activated", found.name));
            Ok(())
        }
    }
}
