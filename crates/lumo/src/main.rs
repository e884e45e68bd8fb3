mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::commands::{Context, util};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // stdout carries command output; diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let Cli { global, command } = cli;

    // Completions must work even with a broken config file.
    if let Command::Completions(args) = &command {
        let mut cmd = Cli::command();
        clap_complete::generate(args.shell, &mut cmd, "lumo", &mut std::io::stdout());
        return Ok(());
    }

    let ctx = Context::new(global, config::load_config()?);
    let ctx = &ctx;

    match command {
        Command::Config(args) => commands::config_cmd::handle(&args, ctx),
        Command::Pair(args) => commands::pair::handle(&args, ctx).await,
        Command::Ask(args) => commands::ask::handle(&args, ctx).await,
        Command::Watch(args) => commands::watch::handle(&args, ctx).await,
        cmd => {
            tracing::debug!(command = ?cmd, "dispatching command");
            util::with_controller(ctx, |controller| async move {
                commands::dispatch(cmd, &controller, ctx).await
            })
            .await
        }
    }
}
