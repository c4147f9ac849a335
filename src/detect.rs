// src/detect.rs
//! Rule-based event detection over article headlines. Each event type is an
//! ordered set of case-insensitive regexes; any match classifies the blob
//! (logical OR, first match short-circuits).

use anyhow::Result;
use metrics::{counter, describe_counter};
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use tracing::warn;

use crate::pipeline::JobSummary;
use crate::resolve::resolve_ticker;
use crate::store::types::{Article, EventType, Extracted, NewEvent};
use crate::store::PipelineStore;

/// Confidence assigned to a pattern match absent any further signal.
pub const DEFAULT_CONFIDENCE: f64 = 0.6;

/// Departure/retirement/appointment verb phrase co-occurring with an
/// explicit "as CEO" qualifier.
static CEO_CHANGE_RULES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b(steps?\s+down|resign(?:ed|s)?|to\s+resign)\b.*\bas\s+CEO\b",
        r"(?i)\b(retire(?:s|ment))\b.*\bas\s+CEO\b",
        r"(?i)\bappoint(?:ed|s)\b.*\bas\s+CEO\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid detection rule"))
    .collect()
});

/// One-time metrics registration (so series show up on any recorder).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("detect_articles_total", "Articles evaluated by detection.");
        describe_counter!("detect_events_created_total", "Events created by detection.");
        describe_counter!("detect_errors_total", "Per-article detection/persist errors.");
    });
}

/// Classify a text blob into a supported event type.
pub fn classify(text: &str) -> Option<EventType> {
    if CEO_CHANGE_RULES.iter().any(|re| re.is_match(text)) {
        return Some(EventType::CeoChange);
    }
    None
}

/// Title + summary concatenation evaluated by the rules and stored as the
/// event headline.
pub fn detection_text(article: &Article) -> String {
    format!("{}. {}", article.title, article.summary)
}

/// Build the event row for a qualifying article, or None when no rule
/// matches.
pub fn detect(article: &Article) -> Option<NewEvent> {
    let text = detection_text(article);
    let event_type = classify(&text)?;
    let primary_ticker = resolve_ticker(&text).map(str::to_string);
    Some(NewEvent {
        article_id: article.article_id.clone(),
        event_type,
        primary_ticker,
        affected_tickers: Vec::new(),
        sentiment: None,
        novelty: 0.0,
        confidence: DEFAULT_CONFIDENCE,
        extracted: Extracted::with_headline(text),
        occurred_at: article.published_at.or(article.first_seen_at),
    })
}

/// One detection pass: recent articles → skip those already linked to an
/// event → insert new events. A failed pre-check or insert is logged and the
/// batch continues; one bad record never blocks the rest.
pub async fn run_detection(
    store: &dyn PipelineStore,
    window_hours: i64,
    limit: usize,
) -> Result<JobSummary> {
    ensure_metrics_described();

    let articles = store.recent_articles(window_hours, limit).await?;
    counter!("detect_articles_total").increment(articles.len() as u64);

    let mut summary = JobSummary::fetched(articles.len());
    for article in &articles {
        match store.has_event_for_article(&article.article_id).await {
            Ok(true) => {
                summary.skipped += 1;
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                warn!(error = ?e, article_id = %article.article_id, "event pre-check failed");
                summary.errors += 1;
                counter!("detect_errors_total").increment(1);
                continue;
            }
        }

        let Some(event) = detect(article) else {
            continue;
        };
        match store.insert_event(&event).await {
            Ok(()) => {
                summary.created += 1;
                counter!("detect_events_created_total").increment(1);
            }
            Err(e) => {
                warn!(error = ?e, article_id = %article.article_id, "event insert failed");
                summary.errors += 1;
                counter!("detect_errors_total").increment(1);
            }
        }
    }
    Ok(summary)
}
