// src/ingest/mod.rs
//! Feed ingestion: fetch the configured RSS sources, normalize item text,
//! and upsert articles into the store (identity = URL; duplicates merge).

pub mod config;
pub mod rss;

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;
use tracing::warn;

use crate::pipeline::JobSummary;
use crate::store::PipelineStore;

/// One-time metrics registration (so series show up on any recorder).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_articles_total", "Articles upserted from feeds.");
        describe_counter!("ingest_feed_errors_total", "Feed fetch/parse failures.");
        describe_counter!("ingest_errors_total", "Per-article upsert errors.");
        describe_histogram!("ingest_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!("ingest_last_run_ts", "Unix ts when ingest last ran.");
    });
}

/// Normalize text: collapse whitespace, trim, strip stray punctuation.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // 5) Strip trailing sentence punctuation (keep quotes)
    while let Some(last) = out.chars().last() {
        if matches!(last, '!' | '?' | '.' | ',') {
            out.pop();
        } else {
            break;
        }
    }

    out
}

/// Run ingestion once over the given feed URLs. A feed that stays down after
/// its retries is abandoned for this run and the rest continue; a failing
/// upsert skips that article only.
pub async fn run_ingest(store: &dyn PipelineStore, feeds: &[String]) -> Result<JobSummary> {
    ensure_metrics_described();

    let http = reqwest::Client::builder()
        .user_agent("news-event-signals/0.1")
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30))
        .build()
        .context("building feed http client")?;

    let mut summary = JobSummary::default();
    for feed in feeds {
        let body = match rss::fetch_feed(&http, feed).await {
            Ok(b) => b,
            Err(e) => {
                warn!(error = ?e, feed, "feed unavailable this run");
                counter!("ingest_feed_errors_total").increment(1);
                summary.errors += 1;
                continue;
            }
        };

        let t0 = std::time::Instant::now();
        let articles =
            match rss::articles_from_xml(feed, &body, Utc::now(), config::PER_FEED_LIMIT) {
                Ok(a) => a,
                Err(e) => {
                    warn!(error = ?e, feed, "feed parse failed");
                    counter!("ingest_feed_errors_total").increment(1);
                    summary.errors += 1;
                    continue;
                }
            };
        histogram!("ingest_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

        summary.fetched += articles.len();
        for article in &articles {
            match store.upsert_article(article).await {
                Ok(()) => summary.created += 1,
                Err(e) => {
                    warn!(error = ?e, url = %article.url, "article upsert failed");
                    summary.errors += 1;
                    counter!("ingest_errors_total").increment(1);
                }
            }
        }
    }

    counter!("ingest_articles_total").increment(summary.created as u64);
    gauge!("ingest_last_run_ts").set(Utc::now().timestamp().max(0) as f64);
    Ok(summary)
}
