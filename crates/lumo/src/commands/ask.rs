//! `lumo ask`: free text in, light changes out.

use std::time::Duration;

use serde::Serialize;

use lumo_core::Assistant;

use crate::cli::{AskArgs, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::{Context, util};

/// Completion calls run longer than bridge calls.
const ASK_TIMEOUT_SECS: u64 = 60;

#[derive(Serialize)]
struct Exchange<'a> {
    request: &'a str,
    reply: &'a str,
}

pub async fn handle(args: &AskArgs, ctx: &Context) -> Result<(), CliError> {
    let assistant_config = config::assistant_config(&ctx.global, &ctx.config, args)?;
    let text = args.text.join(" ");
    let timeout = Duration::from_secs(ctx.global.timeout.unwrap_or(ASK_TIMEOUT_SECS));

    util::with_controller(ctx, |controller| async move {
        let assistant = Assistant::from_config(controller, &assistant_config, timeout)?;
        let reply = assistant.process_user_request(&text).await;

        let out = match ctx.output {
            OutputFormat::Table | OutputFormat::Plain => reply,
            format => output::render_single(
                format,
                &Exchange {
                    request: &text,
                    reply: &reply,
                },
                |e| e.reply.to_owned(),
                |e| e.reply.to_owned(),
            ),
        };
        ctx.print(&out);
        Ok(())
    })
    .await
}
