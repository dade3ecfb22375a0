use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    load_settings, presentation::entry_view, ComposerInput, HttpAnalysisBackend,
    SessionController, SessionPolicy, UploadFile,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::oneshot,
    task::JoinHandle,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod input;
mod render;

use input::{Command, InputLine};

/// Converse with the document-analysis service from a terminal.
#[derive(Parser, Debug)]
#[command(name = "analyst")]
struct Args {
    /// Base address of the analysis service (overrides settings file and env).
    #[arg(long)]
    api_url: Option<String>,
    /// Settings file to read instead of ./analyst.toml.
    #[arg(long)]
    config: Option<PathBuf>,
    /// How long success/error upload notices stay visible.
    #[arg(long)]
    status_expiry_ms: Option<u64>,
    /// Wait for each answer before reading the next line (for piped input).
    #[arg(long)]
    wait: bool,
}

const HELP: &str = "\
Type a question and press Enter. End a line with \\ to continue on the next line.
  /upload <path>   send a .txt or .pdf document for ingestion
  /health          show service health
  /dismiss         hide the current upload notice
  /transcript      print the whole conversation
  /quit            leave";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref()).context("failed to load settings")?;
    if let Some(api_url) = &args.api_url {
        settings = settings
            .with_api_url(api_url)
            .context("invalid --api-url")?;
    }
    if let Some(ms) = args.status_expiry_ms {
        settings = settings.with_status_expiry(Duration::from_millis(ms));
    }

    let backend =
        HttpAnalysisBackend::from_settings(&settings).context("failed to build http client")?;
    let controller = SessionController::new(Arc::new(backend), SessionPolicy::from(&settings));
    info!(
        api = %settings.api_base_url,
        session_id = %controller.session_id(),
        "session started"
    );

    let (stop_renderer, renderer_stopped) = oneshot::channel();
    let renderer = tokio::spawn(render::run(
        controller.subscribe(),
        renderer_stopped,
        std::io::stdout(),
    ));
    println!("{HELP}");

    let mut in_flight: Vec<JoinHandle<()>> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        in_flight.retain(|handle| !handle.is_finished());

        let draft_is_empty = controller.draft().await.is_empty();
        match input::parse_line(&line, draft_is_empty) {
            InputLine::Command(Command::Quit) => break,
            InputLine::Command(command) => {
                if let Some(handle) = run_command(&controller, command).await {
                    in_flight.push(handle);
                }
            }
            InputLine::Continue(text) => {
                if !compose(&controller, text).await {
                    continue;
                }
                controller
                    .press_key(ComposerInput::Enter { modified: true })
                    .await;
            }
            InputLine::Commit(text) => {
                if !compose(&controller, text).await {
                    continue;
                }
                let Some(outcome) = controller
                    .press_key(ComposerInput::Enter { modified: false })
                    .await
                else {
                    continue;
                };
                if let Some(hint) = outcome.rejection().and_then(render::rejection_hint) {
                    println!("({hint})");
                } else if args.wait {
                    outcome.settled().await;
                } else if let client_core::SubmitOutcome::Dispatched(handle) = outcome {
                    in_flight.push(handle);
                }
            }
        }
    }

    for handle in in_flight {
        if let Err(err) = handle.await {
            warn!(error = %err, "background task ended abnormally");
        }
    }
    // Every settlement is already queued; the renderer prints them and stops.
    let _ = stop_renderer.send(());
    if let Err(err) = renderer.await {
        warn!(error = %err, "renderer ended abnormally");
    }
    Ok(())
}

/// Appends typed text to the draft; false when input is currently disabled.
async fn compose(controller: &SessionController, text: String) -> bool {
    if !controller.input_enabled().await {
        println!("(input is disabled until the current answer arrives)");
        return false;
    }
    if !text.is_empty() {
        controller.press_key(ComposerInput::Text(text)).await;
    }
    true
}

async fn run_command(controller: &SessionController, command: Command) -> Option<JoinHandle<()>> {
    match command {
        Command::Upload(path) => match UploadFile::from_path(&path).await {
            Ok(file) => return Some(controller.upload(file).await),
            Err(err) => println!("[error] {}", err.user_message()),
        },
        Command::Health => match controller.backend().health().await {
            Ok(health) => println!("{}", render::format_health(&health)),
            Err(err) => println!("[error] {}", err.user_message()),
        },
        Command::Dismiss => controller.dismiss_status().await,
        Command::Transcript => {
            for entry in controller.transcript().await.iter() {
                println!("{}", render::format_entry(&entry_view(entry)));
            }
        }
        Command::Help => println!("{HELP}"),
        Command::Unknown(raw) => println!("unknown command '/{raw}'; try /help"),
        Command::Quit => {}
    }
    None
}
