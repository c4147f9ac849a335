// src/sentiment/mod.rs
//! Sentiment scoring behind a pluggable backend. The backend is selected
//! exactly once at process start: `auto` tries the finance model and
//! degrades to the lexicon scorer on any load failure, so a batch run never
//! hard-fails merely because the heavyweight model is unavailable.

pub mod finance_model;
pub mod lexicon;

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use tracing::{info, warn};

use crate::pipeline::JobSummary;
use crate::store::PipelineStore;

pub use finance_model::FinanceModelBackend;
pub use lexicon::LexiconBackend;

/// Scalar score in [-1, 1], confidence in [0, 1], plus a per-backend
/// breakdown (label probabilities, lexicon counters, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentScore {
    pub value: f64,
    pub confidence: f64,
    pub detail: BTreeMap<String, f64>,
}

#[async_trait]
pub trait SentimentBackend: Send + Sync {
    async fn score(&self, text: &str) -> Result<SentimentScore>;
    /// Backend name for diagnostics.
    fn name(&self) -> &'static str;
}

pub const ENV_BACKEND_MODE: &str = "SENTIMENT_BACKEND";

/// Which backend to use, decided once at process start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendMode {
    /// Finance model only; an unavailable model is fatal.
    Primary,
    /// Lexicon scorer only.
    Fallback,
    /// Try the finance model, substitute the lexicon on any load failure.
    #[default]
    Auto,
}

impl FromStr for BackendMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "primary" => Ok(Self::Primary),
            "fallback" => Ok(Self::Fallback),
            "auto" | "" => Ok(Self::Auto),
            other => bail!("unknown sentiment backend mode: {other}"),
        }
    }
}

/// Read the backend mode from the environment (default `auto`).
pub fn mode_from_env() -> Result<BackendMode> {
    std::env::var(ENV_BACKEND_MODE).unwrap_or_default().parse()
}

/// Select the backend for the process lifetime. In `auto` mode any failure
/// to construct or probe the finance model logs a diagnostic and substitutes
/// the lexicon scorer; the choice is never revisited per-call.
pub async fn build_backend(mode: BackendMode) -> Result<Arc<dyn SentimentBackend>> {
    match mode {
        BackendMode::Fallback => Ok(Arc::new(LexiconBackend::new())),
        BackendMode::Primary => {
            let backend = FinanceModelBackend::from_env()?;
            backend.probe().await.context("probing sentiment model")?;
            Ok(Arc::new(backend))
        }
        BackendMode::Auto => match FinanceModelBackend::from_env() {
            Ok(backend) => match backend.probe().await {
                Ok(()) => {
                    info!("sentiment backend: finance model");
                    Ok(Arc::new(backend))
                }
                Err(e) => {
                    warn!(error = ?e, "sentiment model unreachable, using lexicon fallback");
                    Ok(Arc::new(LexiconBackend::new()))
                }
            },
            Err(e) => {
                warn!(error = ?e, "sentiment model unavailable, using lexicon fallback");
                Ok(Arc::new(LexiconBackend::new()))
            }
        },
    }
}

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("score_events_total", "Events scored and persisted.");
        describe_counter!("score_skipped_total", "Events skipped for empty headlines.");
        describe_counter!("score_errors_total", "Per-event scoring/persist errors.");
    });
}

/// One scoring pass over events with null sentiment, newest first. An empty
/// headline is skipped without error; a failure scoring or persisting one
/// event is logged, counted, and does not stop the batch.
pub async fn run_scoring(
    store: &dyn PipelineStore,
    backend: &dyn SentimentBackend,
    limit: usize,
) -> Result<JobSummary> {
    ensure_metrics_described();

    let events = store.unscored_events(limit).await?;
    let mut summary = JobSummary::fetched(events.len());
    for event in &events {
        let headline = event.headline();
        if headline.trim().is_empty() {
            summary.skipped += 1;
            counter!("score_skipped_total").increment(1);
            continue;
        }

        let scored = match backend.score(headline).await {
            Ok(s) => s,
            Err(e) => {
                warn!(error = ?e, event_id = %event.event_id, "scoring failed");
                summary.errors += 1;
                counter!("score_errors_total").increment(1);
                continue;
            }
        };
        let value = scored.value.clamp(-1.0, 1.0);
        let confidence = scored.confidence.clamp(0.0, 1.0);
        match store
            .update_event_sentiment(&event.event_id, value, confidence)
            .await
        {
            Ok(()) => {
                summary.created += 1;
                counter!("score_events_total").increment(1);
            }
            Err(e) => {
                warn!(error = ?e, event_id = %event.event_id, "sentiment persist failed");
                summary.errors += 1;
                counter!("score_errors_total").increment(1);
            }
        }
    }
    Ok(summary)
}
