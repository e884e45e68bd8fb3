//! Device command handlers.

use serde::Serialize;
use tabled::Tabled;

use lumo_core::{Controller, Device};

use crate::cli::{DevicesArgs, DevicesCommand};
use crate::error::CliError;
use crate::output;

use super::Context;

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    archetype: String,
    #[tabled(rename = "Lights")]
    lights: String,
}

/// A device with the lights it resolves to.
#[derive(Serialize)]
struct DeviceListing<'a> {
    #[serde(flatten)]
    device: &'a Device,
    light_ids: &'a [String],
    light_names: Vec<&'a str>,
}

pub fn handle(controller: &Controller, args: &DevicesArgs, ctx: &Context) -> Result<(), CliError> {
    let snap = controller.snapshot();

    match args.command {
        DevicesCommand::List => {
            let listing: Vec<DeviceListing<'_>> = snap
                .devices
                .iter()
                .map(|device| {
                    let light_ids = snap.device_lights.lights_for(&device.id);
                    DeviceListing {
                        device,
                        light_ids,
                        light_names: light_ids
                            .iter()
                            .filter_map(|id| snap.light(id).map(|l| l.name.as_str()))
                            .collect(),
                    }
                })
                .collect();

            let out = output::render_list(
                ctx.output,
                &listing,
                |d| DeviceRow {
                    id: d.device.id.clone(),
                    name: d.device.name.clone(),
                    archetype: d.device.archetype.clone().unwrap_or_default(),
                    lights: if d.light_names.is_empty() {
                        "-".into()
                    } else {
                        d.light_names.join(", ")
                    },
                },
                |d| d.device.id.clone(),
            );
            ctx.print(&out);
            Ok(())
        }
    }
}
