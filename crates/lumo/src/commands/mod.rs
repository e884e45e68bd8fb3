//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod ask;
pub mod config_cmd;
pub mod devices;
pub mod lights;
pub mod pair;
pub mod rooms;
pub mod scenes;
pub mod util;
pub mod watch;

use lumo_config::Config;
use lumo_core::Controller;

use crate::cli::{Command, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::{config, output};

/// Everything a handler needs besides its own arguments.
pub struct Context {
    pub global: GlobalOpts,
    pub config: Config,
    pub output: OutputFormat,
    pub color: bool,
}

impl Context {
    pub fn new(global: GlobalOpts, config: Config) -> Self {
        let output = config::output_format(&global, &config);
        let color = output::should_color(global.color_mode);
        Self {
            global,
            config,
            output,
            color,
        }
    }

    pub fn print(&self, rendered: &str) {
        output::print_output(rendered, self.global.quiet);
    }

    pub fn status(&self, message: &str) {
        output::status(message, self.global.quiet);
    }
}

/// Dispatch a snapshot-bound command against a connected controller.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    ctx: &Context,
) -> Result<(), CliError> {
    match cmd {
        Command::Lights(args) => lights::handle(controller, args, ctx).await,
        Command::Rooms(args) => rooms::handle(controller, args, ctx).await,
        Command::Scenes(args) => scenes::handle(controller, args, ctx).await,
        Command::Devices(args) => devices::handle(controller, &args, ctx),
        Command::Pair(_)
        | Command::Ask(_)
        | Command::Watch(_)
        | Command::Config(_)
        | Command::Completions(_) => Err(CliError::Internal(
            "command manages its own connection".into(),
        )),
    }
}
