//! pairmaker - entry point.
//!
//! Replays exchange events through the market making agent and writes the
//! resulting order commands to stdout as JSON lines. Logs go to stderr.

use anyhow::Result;
use clap::Parser;
use pairmaker_bot::{replay, AppConfig, Application, JsonLinesGateway};
use pairmaker_telemetry::Metrics;
use tracing::info;

/// Two-instrument market making agent
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "PAIRMAKER_CONFIG", default_value = "config/default.toml")]
    config: String,

    /// Event source (JSON lines file, `-` for stdin). Overrides `replay.path`.
    #[arg(short, long)]
    events: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    pairmaker_telemetry::init_logging()?;

    info!("Starting pairmaker v{}", env!("CARGO_PKG_VERSION"));
    info!(config_path = %args.config, "Loading configuration");

    let mut config = AppConfig::from_file(&args.config)?;
    if let Some(events) = args.events {
        config.replay.path = events;
    }
    info!(
        events = %config.replay.path,
        sweep = config.sweep.enabled,
        "Configuration loaded"
    );

    let events = replay::open(&config.replay.path).await?;
    let dump_metrics = config.telemetry.dump_metrics;

    let mut app = Application::new(config, JsonLinesGateway::stdout())?;
    let summary = app.run(events).await?;
    info!(
        ?summary,
        lines_written = app.gateway().written(),
        "Session complete"
    );

    if dump_metrics {
        eprint!("{}", Metrics::render()?);
    }

    Ok(())
}
