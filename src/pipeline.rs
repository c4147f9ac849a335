// src/pipeline.rs
//! Batch driver glue: per-job outcome counters, the full sequential pass,
//! and the interval scheduler. Stages are idempotent per key (article for
//! detection, event for scoring and signals), so processing order and
//! re-runs do not change the final persisted state.

use std::fmt;

use anyhow::Result;
use metrics::{counter, gauge};
use tracing::{error, info};

use crate::sentiment::{run_scoring, SentimentBackend};
use crate::store::PipelineStore;
use crate::{detect, ingest, signals};

/// Outcome counters every job reports, failure or not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobSummary {
    pub fetched: usize,
    pub created: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl JobSummary {
    pub fn fetched(n: usize) -> Self {
        Self {
            fetched: n,
            ..Self::default()
        }
    }
}

impl fmt::Display for JobSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fetched={} created={} skipped={} errors={}",
            self.fetched, self.created, self.skipped, self.errors
        )
    }
}

/// Row caps and look-back windows keeping each run finite.
#[derive(Debug, Clone, Copy)]
pub struct BatchLimits {
    pub article_window_hours: i64,
    pub article_limit: usize,
    pub score_limit: usize,
    pub event_window_hours: i64,
    pub event_limit: usize,
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self {
            article_window_hours: 6,
            article_limit: 300,
            score_limit: 100,
            event_window_hours: 12,
            event_limit: 200,
        }
    }
}

/// One full pass: ingest → detect → score → signal. Stages read and write
/// disjoint fields, so a failing stage is logged and the rest still run;
/// every stage that completes logs its summary.
pub async fn run_all(
    store: &dyn PipelineStore,
    backend: &dyn SentimentBackend,
    feeds: &[String],
    limits: BatchLimits,
) -> Result<()> {
    counter!("pipeline_runs_total").increment(1);

    match ingest::run_ingest(store, feeds).await {
        Ok(s) => info!(%s, "ingest done"),
        Err(e) => error!(error = ?e, "ingest did not complete"),
    }
    match detect::run_detection(store, limits.article_window_hours, limits.article_limit).await {
        Ok(s) => info!(%s, "detection done"),
        Err(e) => error!(error = ?e, "detection did not complete"),
    }
    match run_scoring(store, backend, limits.score_limit).await {
        Ok(s) => info!(%s, "scoring done"),
        Err(e) => error!(error = ?e, "scoring did not complete"),
    }
    match signals::run_signal_generation(store, limits.event_window_hours, limits.event_limit).await
    {
        Ok(s) => info!(%s, "signal generation done"),
        Err(e) => error!(error = ?e, "signal generation did not complete"),
    }

    gauge!("pipeline_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);
    Ok(())
}

/// Drive the full pipeline forever on a fixed interval. The first tick fires
/// immediately.
pub async fn run_scheduled(
    store: &dyn PipelineStore,
    backend: &dyn SentimentBackend,
    feeds: &[String],
    limits: BatchLimits,
    interval_secs: u64,
) -> Result<()> {
    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
    loop {
        ticker.tick().await;
        run_all(store, backend, feeds, limits).await?;
        info!(interval_secs, "pipeline tick complete");
    }
}
