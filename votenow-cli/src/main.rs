mod cli;
mod commands;
mod config;
mod output;

use std::path::Path;
use std::process;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{Level, debug, warn};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};
use votenow_client::{FileStorage, Session, SessionEvent, VoteNowClient};

use crate::{
    cli::{Args, Commands, ConfigCommand},
    commands::Context,
    config::AppConfig,
    output::OutputManager,
};

#[tokio::main]
async fn main() {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let format = args.output;
    let colored = !args.no_color;

    if let Err(e) = run(args).await {
        OutputManager::new(format, colored).error(&format!("{e:#}"));
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    init_logging(args.verbose, args.quiet);

    let out = OutputManager::new(args.output, !args.no_color);

    if let Commands::Completions { shell } = args.command {
        use clap::CommandFactory;
        use clap_complete::generate;

        let mut cmd = Args::command();
        let bin_name = cmd.get_name().to_string();
        generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
        return Ok(());
    }

    let config = AppConfig::load(args.config.as_deref())?;
    let client_config = config.client_config(args.base_url.as_deref(), args.timeout);
    let session_path = config.session_path(args.session_file.as_deref())?;

    if let Commands::Config(command) = &args.command {
        return match command {
            ConfigCommand::Path => {
                let path = match &args.config {
                    Some(path) => path.clone(),
                    None => AppConfig::default_path()?,
                };
                out.success(&path.display().to_string())
            }
            ConfigCommand::Show => {
                let effective = serde_json::json!({
                    "base_url": client_config.base_url,
                    "refresh_path": client_config.refresh_path,
                    "timeout_secs": client_config.timeout.as_secs(),
                    "single_flight_refresh": client_config.single_flight_refresh,
                    "session_file": session_path.display().to_string(),
                });
                out.emit(&effective, |v| toml::to_string_pretty(v).unwrap_or_default())
            }
        };
    }

    let session = Arc::new(load_session(&session_path)?);
    let client = VoteNowClient::with_session(client_config, session)?;
    let listener = watch_session(&client, OutputManager::new(args.output, !args.no_color));

    let ctx = Context::new(client, out);
    let result = execute(&ctx, args.command).await;

    // Dropping the client closes the event channel and ends the listener.
    drop(ctx);
    let _ = listener.await;

    result
}

async fn execute(ctx: &Context, command: Commands) -> Result<()> {
    match command {
        Commands::Register {
            username,
            email,
            password,
            role,
        } => commands::account::register(ctx, username, email, password, role).await,
        Commands::Login { username, password } => {
            commands::account::login(ctx, username, password).await
        }
        Commands::Logout => commands::account::logout(ctx),
        Commands::Whoami { refresh } => commands::account::whoami(ctx, refresh).await,
        Commands::Polls(command) => commands::polls::run(ctx, command).await,
        Commands::Banners(command) => commands::banners::run(ctx, command).await,
        Commands::Admin(command) => commands::admin::run(ctx, command).await,
        Commands::Dashboard(command) => commands::dashboard::run(ctx, command).await,
        // Handled before the client is built.
        Commands::Config(_) | Commands::Completions { .. } => Ok(()),
    }
}

/// Load the persisted session. An unreadable file is discarded so the user
/// can log in again instead of being stuck.
fn load_session(path: &Path) -> Result<Session> {
    match Session::load(Arc::new(FileStorage::new(path))) {
        Ok(session) => Ok(session),
        Err(e) => {
            warn!(error = %e, path = %path.display(), "Discarding unreadable session file");
            std::fs::remove_file(path)
                .with_context(|| format!("failed to remove {}", path.display()))?;
            Ok(Session::load(Arc::new(FileStorage::new(path)))?)
        }
    }
}

/// Tell the user when the session can no longer be refreshed.
fn watch_session(client: &VoteNowClient, out: OutputManager) -> JoinHandle<()> {
    let mut events = client.session().subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(SessionEvent::LoginRequired { login_path }) => {
                    debug!(%login_path, "Session expired");
                    out.notice("session expired; run `votenow login` to sign in again");
                }
                Ok(event) => debug!(?event, "Session event"),
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "Session events lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    })
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(verbose),
        )
        .init();
}
