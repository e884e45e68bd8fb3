//! `lumo watch`: long-lived polling with a room summary per change.

use serde::Serialize;
use tabled::Tabled;

use lumo_core::{ConnectionState, Controller, HomeSnapshot};

use crate::cli::{OutputFormat, WatchArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::Context;

#[derive(Debug, Clone, PartialEq, Serialize)]
struct RoomSummary {
    id: String,
    name: String,
    on: bool,
    brightness: f64,
    lights: usize,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Room")]
    name: String,
    #[tabled(rename = "Lights")]
    lights: usize,
    #[tabled(rename = "Power")]
    power: String,
    #[tabled(rename = "Brightness")]
    brightness: String,
}

fn summarize(snap: &HomeSnapshot) -> Vec<RoomSummary> {
    snap.rooms
        .iter()
        .map(|v| RoomSummary {
            id: v.room.id.clone(),
            name: v.room.name.clone(),
            on: v.any_on,
            brightness: v.avg_brightness,
            lights: v.light_count,
        })
        .collect()
}

fn render(summary: &[RoomSummary], ctx: &Context) -> String {
    let body = output::render_list(
        ctx.output,
        summary,
        |r| SummaryRow {
            name: r.name.clone(),
            lights: r.lights,
            power: output::power(r.on, ctx.color),
            brightness: output::brightness_bar(r.brightness, ctx.color),
        },
        |r| format!("{}\t{}", r.id, if r.on { "on" } else { "off" }),
    );
    if ctx.output == OutputFormat::Table {
        format!("{}\n{body}", chrono::Local::now().format("%H:%M:%S"))
    } else {
        body
    }
}

pub async fn handle(args: &WatchArgs, ctx: &Context) -> Result<(), CliError> {
    let mut bridge = config::bridge_config(&ctx.global, &ctx.config)?;
    bridge.poll_interval_secs = config::poll_interval(&ctx.global, &ctx.config, args.interval);

    let controller = Controller::new(bridge);
    controller.connect().await?;

    let result = watch_loop(&controller, args, ctx).await;
    controller.disconnect().await;
    result
}

async fn watch_loop(
    controller: &Controller,
    args: &WatchArgs,
    ctx: &Context,
) -> Result<(), CliError> {
    let mut snapshots = controller.subscribe();
    let mut states = controller.connection_state();
    let mut last: Option<Vec<RoomSummary>> = None;
    let mut printed = 0usize;

    loop {
        let summary = summarize(&snapshots.borrow_and_update());
        if last.as_ref() != Some(&summary) {
            ctx.print(&render(&summary, ctx));
            last = Some(summary);
            printed += 1;
            if args.count.is_some_and(|n| printed >= n) {
                return Ok(());
            }
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => return Ok(()),
            changed = snapshots.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
            }
            changed = states.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let state = states.borrow_and_update().clone();
                match state {
                    ConnectionState::Error { message } => ctx.status(&message),
                    ConnectionState::Connected => ctx.status("Connection restored."),
                    ConnectionState::Connecting | ConnectionState::Disconnected => {}
                }
            }
        }
    }
}
