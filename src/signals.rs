// src/signals.rs
//! Sentiment-adjusted signal generation from baseline priors. The scaling
//! core is pure and fully testable; the batch job around it only adds the
//! idempotency pre-check and persistence.

use anyhow::Result;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use tracing::warn;

use crate::pipeline::JobSummary;
use crate::priors::{prior_for, sector_for, PriorEntry};
use crate::store::types::{Event, NewSignal};
use crate::store::PipelineStore;

/// Sensitivity of the scale factor to sentiment.
pub const ALPHA: f64 = 0.75;
/// Hard cap on per-horizon predicted returns, in absolute value. A sanity
/// bound against runaway extrapolation, not a statistically derived limit.
pub const RETURN_CAP: f64 = 0.05;
/// Fixed per-signal uncertainty; sentiment confidence is not propagated yet.
pub const UNCERTAINTY: f64 = 0.02;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("signal_events_total", "Events considered for signals.");
        describe_counter!("signals_created_total", "Signal rows inserted.");
        describe_counter!("signal_errors_total", "Per-event signal persist errors.");
    });
}

/// `1 + α·sentiment`; absent sentiment is treated as neutral.
pub fn scale_factor(sentiment: Option<f64>) -> f64 {
    1.0 + ALPHA * sentiment.unwrap_or(0.0)
}

/// Sign with exact zero mapping to 0.
pub fn direction_of(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

/// Scale every horizon of a prior entry and clamp into the cap. The output
/// covers exactly the horizons of the entry, once each.
pub fn scaled_signals(event: &Event, priors: PriorEntry) -> Vec<NewSignal> {
    let scale = scale_factor(event.sentiment);
    priors
        .iter()
        .map(|(horizon, base)| {
            let adjusted = (base * scale).clamp(-RETURN_CAP, RETURN_CAP);
            NewSignal {
                event_id: event.event_id.clone(),
                ticker: event.primary_ticker.clone(),
                horizon: *horizon,
                predicted_return: adjusted,
                uncertainty: UNCERTAINTY,
                direction: direction_of(adjusted),
            }
        })
        .collect()
}

/// Signals for one event, or `None` when its type/sector has no prior entry
/// ("no forecast available", not an error).
pub fn generate(event: &Event) -> Option<Vec<NewSignal>> {
    let sector = sector_for(event.primary_ticker.as_deref());
    let priors = prior_for(event.event_type, sector)?;
    Some(scaled_signals(event, priors))
}

/// One signal-generation pass over recent events. Events that already have
/// signal rows are skipped whole (all-or-nothing per event); events without
/// a prior entry are skipped silently; insert failures are logged, counted,
/// and the batch continues.
pub async fn run_signal_generation(
    store: &dyn PipelineStore,
    window_hours: i64,
    limit: usize,
) -> Result<JobSummary> {
    ensure_metrics_described();

    let events = store.recent_events(window_hours, limit).await?;
    counter!("signal_events_total").increment(events.len() as u64);

    let mut summary = JobSummary::fetched(events.len());
    for event in &events {
        match store.has_signals_for_event(&event.event_id).await {
            Ok(true) => {
                summary.skipped += 1;
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                warn!(error = ?e, event_id = %event.event_id, "signal pre-check failed");
                summary.errors += 1;
                counter!("signal_errors_total").increment(1);
                continue;
            }
        }

        let Some(rows) = generate(event) else {
            summary.skipped += 1;
            continue;
        };
        match store.insert_signals(&rows).await {
            Ok(()) => {
                summary.created += 1;
                counter!("signals_created_total").increment(rows.len() as u64);
            }
            Err(e) => {
                warn!(error = ?e, event_id = %event.event_id, "signal insert failed");
                summary.errors += 1;
                counter!("signal_errors_total").increment(1);
            }
        }
    }
    Ok(summary)
}
