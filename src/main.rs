//! news-event-signals — Batch Pipeline Entrypoint
//! Periodic jobs turning financial-news articles into events, sentiment
//! scores and per-horizon return signals against an external REST store.
//!
//! See `README.md` for quickstart and `DESIGN.md` for architecture notes.

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use news_event_signals::config::StoreConfig;
use news_event_signals::pipeline::{self, BatchLimits};
use news_event_signals::sentiment::{self, SentimentBackend};
use news_event_signals::store::RestStore;
use news_event_signals::{detect, ingest, report, signals};

#[derive(Parser)]
#[command(name = "news-event-signals")]
#[command(about = "Financial-news event detection and signal generation", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch configured RSS feeds and upsert articles
    Ingest,
    /// Detect events in recent articles
    Detect,
    /// Score sentiment for events that have none yet
    Score,
    /// Generate signals for recent events
    Signal,
    /// Run the full pipeline once, or repeatedly with --every
    Run {
        /// Repeat interval in seconds; omit to run once
        #[arg(long)]
        every: Option<u64>,
    },
    /// Print a report of recent events and forecasts
    Report {
        /// Look-back window in hours
        #[arg(long, default_value_t = 24)]
        hours: i64,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

/// Backend selection happens once per process; `primary` being unavailable
/// is fatal, `auto` degrades inside `build_backend`.
async fn backend_from_env() -> anyhow::Result<Arc<dyn SentimentBackend>> {
    let mode = sentiment::mode_from_env()?;
    sentiment::build_backend(mode).await
}

async fn run_pipeline(
    store: &RestStore,
    backend: Arc<dyn SentimentBackend>,
    limits: BatchLimits,
    every: Option<u64>,
) -> anyhow::Result<()> {
    let feeds = ingest::config::load_feeds_default()?;
    match every {
        None => pipeline::run_all(store, backend.as_ref(), &feeds, limits).await,
        Some(secs) => pipeline::run_scheduled(store, backend.as_ref(), &feeds, limits, secs).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();

    // Missing store credentials are fatal: nothing is attempted.
    let store_cfg = match StoreConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(error = ?e, "store configuration missing");
            return ExitCode::FAILURE;
        }
    };
    let store = match RestStore::new(&store_cfg) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = ?e, "store client construction failed");
            return ExitCode::FAILURE;
        }
    };
    let limits = BatchLimits::default();

    let result: anyhow::Result<()> = match cli.command {
        Commands::Ingest => match ingest::config::load_feeds_default() {
            Ok(feeds) => ingest::run_ingest(&store, &feeds)
                .await
                .map(|s| info!(%s, "ingest done")),
            Err(e) => Err(e),
        },
        Commands::Detect => {
            detect::run_detection(&store, limits.article_window_hours, limits.article_limit)
                .await
                .map(|s| info!(%s, "detection done"))
        }
        Commands::Score => match backend_from_env().await {
            Ok(backend) => {
                sentiment::run_scoring(&store, backend.as_ref(), limits.score_limit)
                    .await
                    .map(|s| info!(%s, "scoring done"))
            }
            Err(e) => {
                tracing::error!(error = ?e, "sentiment backend unavailable");
                return ExitCode::FAILURE;
            }
        },
        Commands::Signal => {
            signals::run_signal_generation(&store, limits.event_window_hours, limits.event_limit)
                .await
                .map(|s| info!(%s, "signal generation done"))
        }
        Commands::Run { every } => match backend_from_env().await {
            Ok(backend) => run_pipeline(&store, backend, limits, every).await,
            Err(e) => {
                tracing::error!(error = ?e, "sentiment backend unavailable");
                return ExitCode::FAILURE;
            }
        },
        Commands::Report { hours } => report::run_report(&store, hours, limits.event_limit).await,
    };

    // Transient job failures are logged but not fatal; the next scheduled
    // run retries naturally.
    if let Err(e) = result {
        tracing::error!(error = ?e, "job did not complete");
    }
    ExitCode::SUCCESS
}
