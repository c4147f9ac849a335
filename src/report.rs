// src/report.rs
//! Terminal report over recent events: sentiment, sector prior, the
//! sentiment-adjusted forecast, persisted signal rows and a simple hedge
//! suggestion. Rendering is pure so it can be asserted on; printing happens
//! in one place at the edge.

use anyhow::Result;
use chrono::Utc;

use crate::priors::{prior_for, sector_for, PriorEntry};
use crate::signals::{scale_factor, RETURN_CAP};
use crate::store::types::{Event, EventType, Horizon, Signal};
use crate::store::PipelineStore;

const HEADLINE_PREVIEW: usize = 80;

pub fn fmt_pct(x: Option<f64>) -> String {
    match x {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => "-".to_string(),
    }
}

/// Simple narration + hedge suggestion keyed off the 1-day forecast.
pub fn suggest_trade(ticker: &str, one_day: Option<f64>) -> String {
    match one_day {
        None => "No suggestion.".to_string(),
        Some(d) if d < -0.002 => format!(
            "SHORT {ticker}, hedge sector via XLF (beta ~ 1.1) to isolate idiosyncratic move."
        ),
        Some(d) if d > 0.002 => format!("LONG {ticker}, hedge with short XLF (beta ~ 1.1)."),
        Some(_) => {
            "Small/neutral edge; monitor for follow-ups (successor named, guidance).".to_string()
        }
    }
}

/// Sentiment-adjusted forecast for display; mirrors the signal job's scaling
/// and clamp.
pub fn adjusted_forecast(event: &Event, priors: PriorEntry) -> Vec<(Horizon, f64)> {
    let scale = scale_factor(event.sentiment);
    priors
        .iter()
        .map(|(h, base)| (*h, (base * scale).clamp(-RETURN_CAP, RETURN_CAP)))
        .collect()
}

fn fmt_horizons(values: &[(Horizon, f64)]) -> String {
    values
        .iter()
        .map(|(h, v)| format!("{h}: {}", fmt_pct(Some(*v))))
        .collect::<Vec<_>>()
        .join(", ")
}

fn headline_preview(headline: &str) -> String {
    let mut out: String = headline.chars().take(HEADLINE_PREVIEW).collect();
    if headline.chars().count() > HEADLINE_PREVIEW {
        out.push('…');
    }
    out
}

/// Render one event section of the report.
pub fn render_event(idx: usize, event: &Event, signals: &[Signal]) -> String {
    let ticker = event.primary_ticker.as_deref().unwrap_or("-");
    let sector = sector_for(event.primary_ticker.as_deref());
    let priors = prior_for(event.event_type, sector);

    let mut out = String::new();
    out.push_str(&format!(
        "{idx}) {} - {ticker} ({})\n",
        event.event_type,
        headline_preview(event.headline())
    ));
    out.push_str(&format!(
        "   Sentiment: {} (conf {})\n",
        event
            .sentiment
            .map(|s| format!("{s:.3}"))
            .unwrap_or_else(|| "-".to_string()),
        event
            .confidence
            .map(|c| format!("{c:.2}"))
            .unwrap_or_else(|| "-".to_string()),
    ));

    match priors {
        Some(entry) => {
            out.push_str(&format!(
                "   Historical prior ({sector}, {}): {}\n",
                event.event_type,
                fmt_horizons(entry)
            ));
            let forecast = adjusted_forecast(event, entry);
            out.push_str(&format!(
                "   Forecast (sentiment-adjusted): {}\n",
                fmt_horizons(&forecast)
            ));
            let one_day = forecast
                .iter()
                .find(|(h, _)| *h == Horizon::OneDay)
                .map(|(_, v)| *v);
            out.push_str(&format!(
                "   Suggested trade idea: {}\n",
                suggest_trade(ticker, one_day)
            ));
        }
        None => {
            out.push_str(&format!("   Historical prior: (none for sector={sector})\n"));
            out.push_str("   Forecast: not available (missing priors for this sector/ticker).\n");
        }
    }

    if !signals.is_empty() {
        let mut rows = signals.to_vec();
        rows.sort_by_key(|s| s.horizon);
        out.push_str("   Stored signals:\n");
        for s in &rows {
            out.push_str(&format!(
                "     {}  {}  dir {}\n",
                s.horizon,
                fmt_pct(Some(s.predicted_return)),
                s.direction
            ));
        }
    }

    out
}

/// Fetch recent events and print the report.
pub async fn run_report(
    store: &dyn PipelineStore,
    window_hours: i64,
    limit: usize,
) -> Result<()> {
    let now = Utc::now().format("%Y-%m-%d %H:%M UTC");
    println!("[EVENT SIGNAL REPORT @ {now}]\n");

    let events = store.recent_events(window_hours, limit).await?;
    if events.is_empty() {
        println!("No recent events. Ingestion/detection may still be populating.");
        return Ok(());
    }

    let mut shown = 0usize;
    for event in &events {
        // Extend with more types as detection grows.
        if event.event_type != EventType::CeoChange {
            continue;
        }
        shown += 1;
        let signals = store
            .signals_for_event(&event.event_id)
            .await
            .unwrap_or_default();
        println!("{}", render_event(shown, event, &signals));
    }

    if shown == 0 {
        println!(
            "No supported events in the last {window_hours}h (looking for CEO_CHANGE)."
        );
    }
    Ok(())
}
