mod app;
mod clock_font;
mod host;

use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use tidewatch_core::{
    catalog::Catalog,
    config::{self, AppConfig},
    load_catalog, LogTail, Tracker, TrackerSettings,
};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::{
    app::{Cadence, TidewatchApp},
    host::TerminalHost,
};

/// Ocean fishing cast timer and target board.
#[derive(Debug, Parser)]
#[command(name = "tidewatch", version)]
struct Cli {
    /// ACT network log file, or a directory holding `Network_*.log` files.
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,

    /// Catalog JSON to use instead of the built-in one.
    #[arg(long, value_name = "PATH")]
    catalog: Option<PathBuf>,

    /// Config file to read instead of the default location.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print every location and time of day with its targets, then exit.
    #[arg(long)]
    dump_catalog: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.dump_catalog)?;

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => {
            config::ensure_default_config()?;
            AppConfig::load()?
        }
    };
    if cli.log.is_some() {
        config.log_path = cli.log.clone();
    }
    if cli.catalog.is_some() {
        config.catalog_path = cli.catalog.clone();
    }

    let catalog = load_catalog(config.catalog_path.as_deref())?;
    if cli.dump_catalog {
        return dump_catalog(&catalog);
    }

    let feed = match &config.log_path {
        Some(path) => {
            let tail = LogTail::open(path)
                .with_context(|| format!("failed to open network log {}", path.display()))?;
            let (feed_tx, feed_rx) = mpsc::channel(256);
            tokio::spawn(async move {
                if let Err(err) = tail.run(feed_tx).await {
                    error!("Log tail task error: {err}");
                }
            });
            Some(feed_rx)
        }
        None => None,
    };

    let tracker = Tracker::new(
        TerminalHost::new(),
        catalog,
        TrackerSettings::from_config(&config),
    );
    let cadence = Cadence {
        frame: Duration::from_millis(config.frame_interval_ms.max(1)),
        idle: Duration::from_millis(config.idle_interval_ms.max(1)),
    };
    info!(zones = ?config.ocean_zone_ids, "Starting tidewatch");

    let mut app = TidewatchApp::new(tracker, cadence, config.log_path.clone());
    app.run(feed).await
}

fn dump_catalog(catalog: &Catalog) -> Result<()> {
    let scoring = catalog.scoring;
    let overview = catalog.overview()?;
    let mut out = io::stdout().lock();
    for info in overview {
        writeln!(
            out,
            "{}  bait: {}  spectral: {}",
            info.name, info.bait, info.spectral_bait
        )?;
        for fish in &info.targets {
            let marker = if fish.mooch { "*" } else { "" };
            writeln!(
                out,
                "  {:<4}{:>7}s {:>5}  {}{}",
                fish.tug_glyph(),
                fish.window_label(),
                scoring.points(fish),
                fish.name,
                marker
            )?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn init_logging(to_stderr: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("tidewatch.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let env_filter = EnvFilter::from_default_env();

    // The terminal UI owns stdout, so console output only goes to stderr
    // and only outside the UI.
    let stderr_layer = to_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .compact()
            .with_writer(io::stderr)
    });

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .compact()
        .with_ansi(false)
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}
