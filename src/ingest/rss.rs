// src/ingest/rss.rs
//! RSS fetching and parsing into article rows.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use quick_xml::de::from_str;
use serde::Deserialize;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};
use tracing::warn;

use crate::ingest::normalize_text;
use crate::store::types::NewArticle;

const TITLE_MAX: usize = 1000;
const SUMMARY_MAX: usize = 5000;

/// Feed fetches get a bounded retry with linear backoff before the source is
/// abandoned for the run.
const FETCH_ATTEMPTS: u32 = 3;
const BACKOFF_STEP: Duration = Duration::from_secs(2);

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

fn parse_rfc2822_utc(ts: &str) -> Option<DateTime<Utc>> {
    let unix = OffsetDateTime::parse(ts, &Rfc2822)
        .ok()?
        .to_offset(UtcOffset::UTC)
        .unix_timestamp();
    DateTime::<Utc>::from_timestamp(unix, 0)
}

fn cap_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Map parsed feed items to article rows. Items without a link have no
/// identity and are dropped.
pub fn articles_from_xml(
    source: &str,
    xml: &str,
    now: DateTime<Utc>,
    per_feed_limit: usize,
) -> Result<Vec<NewArticle>> {
    let rss: Rss = from_str(xml).context("parsing rss xml")?;

    let mut out = Vec::new();
    for it in rss.channel.item.into_iter().take(per_feed_limit) {
        let Some(url) = it.link else {
            continue;
        };
        let title = cap_chars(&normalize_text(it.title.as_deref().unwrap_or_default()), TITLE_MAX);
        let summary = cap_chars(
            &normalize_text(it.description.as_deref().unwrap_or_default()),
            SUMMARY_MAX,
        );
        out.push(NewArticle {
            source: source.to_string(),
            url,
            title,
            summary,
            published_at: it.pub_date.as_deref().and_then(parse_rfc2822_utc),
            first_seen_at: now,
            raw_path: None,
            language: "en".to_string(),
        });
    }
    Ok(out)
}

/// GET a feed with a fixed number of attempts; sleeps `attempt * step`
/// between tries.
pub async fn fetch_feed(http: &reqwest::Client, url: &str) -> Result<String> {
    let mut last_err = None;
    for attempt in 1..=FETCH_ATTEMPTS {
        match try_fetch(http, url).await {
            Ok(body) => return Ok(body),
            Err(e) => {
                warn!(error = ?e, url, attempt, "feed fetch failed");
                last_err = Some(e);
                if attempt < FETCH_ATTEMPTS {
                    tokio::time::sleep(BACKOFF_STEP * attempt).await;
                }
            }
        }
    }
    Err(last_err.unwrap_or_else(|| anyhow::anyhow!("feed fetch failed: {url}")))
}

async fn try_fetch(http: &reqwest::Client, url: &str) -> Result<String> {
    let resp = http
        .get(url)
        .send()
        .await
        .with_context(|| format!("GET {url}"))?;
    let status = resp.status();
    if !status.is_success() {
        bail!("feed {url} returned {status}");
    }
    resp.text()
        .await
        .with_context(|| format!("reading body from {url}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test Wire</title>
    <item>
      <title>Jane Doe steps down as CEO of JPMorgan Chase</title>
      <link>https://example.test/ceo-change</link>
      <pubDate>Mon, 01 Sep 2025 12:00:00 GMT</pubDate>
      <description>&lt;p&gt;Succession &amp;amp; transition underway.&lt;/p&gt;</description>
    </item>
    <item>
      <title>Item without a link is dropped</title>
      <description>no identity</description>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn items_map_to_articles_with_normalized_fields() {
        let now = Utc::now();
        let articles = articles_from_xml("test-wire", SAMPLE, now, 30).unwrap();
        assert_eq!(articles.len(), 1);
        let a = &articles[0];
        assert_eq!(a.url, "https://example.test/ceo-change");
        assert_eq!(a.title, "Jane Doe steps down as CEO of JPMorgan Chase");
        assert_eq!(a.summary, "Succession & transition underway");
        assert_eq!(a.language, "en");
        assert_eq!(a.first_seen_at, now);
        let published = a.published_at.expect("pubDate parses");
        assert_eq!(published.timestamp(), 1_756_728_000);
    }

    #[test]
    fn per_feed_limit_caps_items() {
        let many: String = (0..5)
            .map(|i| {
                format!(
                    "<item><title>t{i}</title><link>https://example.test/{i}</link></item>"
                )
            })
            .collect();
        let xml = format!("<rss><channel>{many}</channel></rss>");
        let articles = articles_from_xml("test-wire", &xml, Utc::now(), 3).unwrap();
        assert_eq!(articles.len(), 3);
    }

    #[test]
    fn unparseable_dates_become_none() {
        assert!(parse_rfc2822_utc("not a date").is_none());
        assert!(parse_rfc2822_utc("Mon, 01 Sep 2025 12:00:00 GMT").is_some());
    }

    #[test]
    fn broken_xml_is_an_error() {
        assert!(articles_from_xml("x", "<rss><channel>", Utc::now(), 30).is_err());
    }
}
