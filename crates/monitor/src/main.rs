//! Drowsiness Monitor - Main Entry Point

use alerting::{sink_from_config, AlertManager};
use anyhow::Context;
use clap::Parser;
use dms::{DmsModule, FrameAnalysis};
use monitor::{init_logging, replay, run_session, write_frame_line, Settings};
use std::path::PathBuf;
use tracing::{info, warn};

/// Real-time drowsiness detection over a stream of eye landmarks
#[derive(Parser, Debug)]
#[command(name = "drowsiness-monitor", version, about)]
struct Args {
    /// Settings file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON-lines landmark stream, `-` for stdin
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Emit JSON logs
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref()).context("Failed to load settings")?;
    if args.json {
        settings.logging.json = true;
    }
    init_logging(&settings.logging)?;

    info!("=== Drowsiness Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    let mut module = DmsModule::new(settings.detection.clone())?;
    let mut provider = replay::open(&args.input)
        .await
        .with_context(|| format!("Failed to open landmark stream `{}`", args.input))?;
    let mut alerts = AlertManager::new(sink_from_config(&settings.alert)?);

    let summary = run_session(
        &mut module,
        &mut provider,
        &mut alerts,
        shutdown_signal(),
        print_analysis,
    )
    .await?;

    info!(
        frames = summary.frames,
        alerts = summary.alerts_raised,
        alert_seconds = summary.alert_seconds,
        "Monitor stopped"
    );
    Ok(())
}

/// Write one analysis as a JSON line on stdout
fn print_analysis(analysis: &FrameAnalysis) {
    if let Err(e) = write_frame_line(std::io::stdout().lock(), analysis) {
        warn!(sequence = analysis.sequence, "Failed to write analysis: {}", e);
    }
}

/// Resolves on Ctrl-C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Ctrl-C handler unavailable: {}", e);
        std::future::pending::<()>().await;
    }
}
