//! CLI entrypoint for a2a-bridge
//!
//! This is the main binary that wires together all layers using
//! dependency injection. stdout carries the Host protocol, so every
//! diagnostic goes to stderr (or the optional log file).

mod args;

use anyhow::{Context, Result, anyhow};
use args::{Cli, Command, ServeArgs};
use bridge_application::{BridgeConfig, BridgeOrchestrator};
use bridge_domain::ToolSpec;
use bridge_infrastructure::host::tool_listing;
use bridge_infrastructure::{
    ConfigLoader, HttpMeshTransport, JsonlInteractionLogger, StdioHostServer,
};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE_NAME: &str = "a2a-bridge.log";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Held until exit so buffered file logs get flushed
    let _log_guard = init_tracing(cli.verbose, cli.log_dir.as_deref())?;

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("failed to load configuration: {}", e))?
    };
    let config = file_config
        .to_bridge_config()
        .context("invalid configuration")?;

    match cli.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Tools => {
            let listing = tool_listing(&ToolSpec::bridge_tools());
            println!("{}", serde_json::to_string_pretty(&listing)?);
            Ok(())
        }
        Command::Serve(args) => serve(config, args).await,
    }
}

/// Initialize logging based on verbosity level. `RUST_LOG` wins when set.
fn init_tracing(verbose: u8, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("cannot create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

async fn serve(config: BridgeConfig, args: ServeArgs) -> Result<()> {
    info!(identity = %config.identity, "Starting a2a-bridge");

    // === Dependency Injection ===
    let transport = Arc::new(HttpMeshTransport::new());
    let mut orchestrator = BridgeOrchestrator::new(&config, transport);

    if let Some(path) = &args.interaction_log {
        match JsonlInteractionLogger::new(path) {
            Some(logger) => {
                info!(path = %path.display(), "Interaction log enabled");
                orchestrator = orchestrator.with_logger(Arc::new(logger));
            }
            None => warn!(
                path = %path.display(),
                "Interaction log unavailable, continuing without it"
            ),
        }
    }

    let server = StdioHostServer::new(Arc::new(orchestrator)).with_caller(args.caller);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupted, shutting down");
                cancel.cancel();
            }
        });
    }

    server
        .serve(tokio::io::stdin(), tokio::io::stdout(), cancel)
        .await
        .context("host session failed")?;

    Ok(())
}
