//! tickr - Entry Point

use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;
use tickr_app::{AppConfig, Application, ConfigSource, UiMode};
use tickr_telemetry::LogTarget;
use tracing::{info, warn};

/// Live crypto price board
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via TICKR_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Print price changes as lines instead of drawing the board
    #[arg(long)]
    plain: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize TLS crypto provider (must be before any WS connections)
    tickr_ws::init_crypto();

    let args = Args::parse();

    // Config first: it decides where logs go
    let (config, source) = AppConfig::resolve(args.config.as_deref())?;

    let mode = if args.plain || !std::io::stdout().is_terminal() {
        UiMode::Plain
    } else {
        UiMode::Terminal
    };
    let log_target = match mode {
        UiMode::Plain => LogTarget::Stderr,
        UiMode::Terminal => LogTarget::File(config.telemetry.log_file.clone()),
    };
    tickr_telemetry::init_logging(config.telemetry.log_level.as_deref(), &log_target)?;

    info!("Starting tickr v{}", env!("CARGO_PKG_VERSION"));
    match &source {
        ConfigSource::File(path) => info!(path = %path.display(), "Configuration loaded"),
        ConfigSource::Defaults(path) => {
            warn!(path = %path.display(), "Config file not found, using defaults")
        }
    }

    let app = Application::new(config, mode)?;
    app.run().await?;

    info!("Goodbye");
    Ok(())
}
