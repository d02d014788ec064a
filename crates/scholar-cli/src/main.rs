use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use scholar_application::SessionController;
use scholar_core::session::UuidIdGenerator;
use scholar_infrastructure::{AppConfig, JsonSessionStore, ScholarPaths};
use scholar_interaction::HttpChatTransport;

mod app;
mod args;
mod commands;
mod helper;
mod logging;
mod render;
mod repl;

use app::{App, Flow};
use args::Args;
use repl::{Repl, ReplInput};

/// The main entry point for the Scholar REPL.
///
/// Sets up file logging and configuration, bootstraps the session
/// controller against the JSON store and the HTTP transport, then runs a
/// loop that reacts to whichever comes first: a line from the editor
/// thread or a reply from the assistant. Replies never block input, so
/// chats can be switched or deleted while a request is pending.
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_dir = ScholarPaths::log_dir()?;
    let _log_guard = logging::init(&log_dir, args.verbose)?;

    let config = load_config(&args)?;
    let sessions_file = config.sessions_file()?;
    tracing::info!(
        "Starting with sessions file {} and endpoint {}",
        sessions_file.display(),
        config.endpoint.base_url
    );

    let store = Arc::new(JsonSessionStore::new(sessions_file));
    let transport = Arc::new(HttpChatTransport::from_config(&config.endpoint)?);
    let controller = SessionController::bootstrap(store, Arc::new(UuidIdGenerator), transport);
    let mut app = App::new(controller);

    render::banner();
    app.show_active();

    let mut repl = Repl::spawn().context("failed to start line editor")?;

    loop {
        tokio::select! {
            input = repl.lines.recv() => match input {
                Some(ReplInput::Line(line)) => {
                    let flow = commands::parse(&line)
                        .map_or(Flow::Continue, |command| app.handle(command));
                    if flow == Flow::Quit {
                        break;
                    }
                    repl.ready();
                }
                Some(ReplInput::Interrupted) => {
                    render::warn("CTRL-C detected. Type 'quit' to exit.");
                    repl.ready();
                }
                Some(ReplInput::Failed(err)) => {
                    render::error(&format!("Line editor failed: {err}"));
                    break;
                }
                Some(ReplInput::Eof) | None => break,
            },
            Some(completion) = app.next_completion(), if app.pending() > 0 => {
                if let Some(text) = app.on_completion(completion) {
                    repl.print(text);
                }
            }
        }
    }

    if app.pending() > 0 {
        tracing::info!("Exiting with {} replies still pending", app.pending());
        render::info(&format!(
            "{} pending replies were abandoned; your messages are saved.",
            app.pending()
        ));
    }
    tracing::debug!("Exiting with {} sessions", app.controller().sessions().len());
    render::info("Goodbye!");

    Ok(())
}

/// Builds the effective configuration: file, then environment, then flags.
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let mut config = AppConfig::from_file(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            config.apply_env_overrides();
            config
        }
        None => AppConfig::load().context("failed to read config")?,
    };

    if let Some(base_url) = &args.base_url {
        config.endpoint.base_url = base_url.clone();
    }
    if let Some(model) = &args.model {
        config.endpoint.model = model.clone();
    }
    if let Some(path) = &args.sessions_file {
        config.storage.sessions_file = Some(path.clone());
    }

    Ok(config)
}
