//! gh-dispatch CLI entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse configuration**: flags and environment variables via `clap`
//!    (see [`args`]).
//! 2. **Wire observability**: `tracing-subscriber` to stderr plus an optional
//!    OpenTelemetry OTLP exporter (see [`telemetry`]). Every span and event
//!    emitted by the workspace crates flows through it.
//! 3. **Construct infrastructure**: the [`github::GithubClient`] REST
//!    transport, the crossterm [`terminal::ScreenTerminal`], and the Ctrl+C
//!    aware [`interrupt::InterruptPacer`], injected into
//!    [`tracker::Dispatcher`].
//! 4. **Map the outcome to an exit status**: 0 on success, 1 on error (or on
//!    an unsuccessful conclusion with `--exit-status`), 130 on interrupt.

mod args;
mod interrupt;
mod telemetry;
mod terminal;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use dispatch::{DispatchError, DispatchRequest, InvocationId};
use github::GithubClient;
use tracing::{info_span, Instrument};
use tracker::{DispatchOutcome, Dispatcher};

use crate::args::Cli;
use crate::interrupt::{InterruptPacer, INTERRUPTED_EXIT_CODE};
use crate::terminal::ScreenTerminal;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            if matches!(err.downcast_ref::<DispatchError>(), Some(e) if e.is_interrupted()) {
                return ExitCode::from(INTERRUPTED_EXIT_CODE);
            }
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let (common, event) = cli.into_parts();
    let _telemetry = telemetry::init(common.log_format)?;

    let invocation_id = InvocationId::new_random();
    let span = info_span!("gh_dispatch", %invocation_id, repo = %common.repo);

    let client = GithubClient::builder()
        .base_url(common.api_url.clone())
        .token(common.token())
        .build()
        .context("failed to configure the GitHub client")?;
    let pacer = InterruptPacer::install();
    let mut terminal = ScreenTerminal::stdout();

    let request = DispatchRequest::new(common.repo.clone(), event);
    let mut dispatcher = Dispatcher::new(&client, &mut terminal, &pacer, common.watch_config());
    let outcome = dispatcher.dispatch(request).instrument(span).await?;

    Ok(match outcome {
        DispatchOutcome::Finished(run) if common.exit_status && !run.succeeded() => {
            ExitCode::FAILURE
        }
        DispatchOutcome::Untracked | DispatchOutcome::Finished(_) => ExitCode::SUCCESS,
    })
}
