// src/store/types.rs
//! Row shapes for the articles/events/signals tables. Read types tolerate
//! missing or null fields (the store schema can grow without breaking us);
//! `New*` types are the exact insert payloads.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// The store returns explicit `null` for nullable columns; map those onto
/// the field's default instead of failing the row.
fn null_to_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let opt = Option::<T>::deserialize(d)?;
    Ok(opt.unwrap_or_default())
}

/// Supported event classifications. Unrecognized values coming back from the
/// store land in `Unknown` and are skipped downstream rather than erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "CEO_CHANGE")]
    CeoChange,
    #[serde(other)]
    Unknown,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CeoChange => "CEO_CHANGE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl Default for EventType {
    fn default() -> Self {
        Self::Unknown
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Forward-looking time bucket a predicted return applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Horizon {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "5D")]
    FiveDay,
    #[serde(rename = "20D")]
    TwentyDay,
}

impl Horizon {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneDay => "1D",
            Self::FiveDay => "5D",
            Self::TwentyDay => "20D",
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sparse key/value payload attached to an event. Only `headline` is
/// required; consumers must tolerate missing keys so the set can grow
/// without a schema change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Extracted(serde_json::Map<String, serde_json::Value>);

impl Extracted {
    pub const HEADLINE: &'static str = "headline";

    pub fn with_headline(headline: impl Into<String>) -> Self {
        let mut map = serde_json::Map::new();
        map.insert(
            Self::HEADLINE.to_string(),
            serde_json::Value::String(headline.into()),
        );
        Self(map)
    }

    pub fn headline(&self) -> Option<&str> {
        self.0.get(Self::HEADLINE).and_then(|v| v.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.0.insert(key.into(), value);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub article_id: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub summary: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub first_seen_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub language: Option<String>,
}

/// Insert payload for an article; identity is the URL (the store merges
/// duplicates on conflict).
#[derive(Debug, Clone, Serialize)]
pub struct NewArticle {
    pub source: String,
    pub url: String,
    pub title: String,
    pub summary: String,
    pub published_at: Option<DateTime<Utc>>,
    pub first_seen_at: DateTime<Utc>,
    pub raw_path: Option<String>,
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub event_id: String,
    #[serde(default)]
    pub article_id: Option<String>,
    #[serde(default)]
    pub event_type: EventType,
    #[serde(default)]
    pub primary_ticker: Option<String>,
    #[serde(default)]
    pub affected_tickers: Option<Vec<String>>,
    #[serde(default)]
    pub sentiment: Option<f64>,
    #[serde(default)]
    pub novelty: Option<f64>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub extracted: Option<Extracted>,
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Event {
    /// Headline from the extracted payload; empty when absent.
    pub fn headline(&self) -> &str {
        self.extracted
            .as_ref()
            .and_then(Extracted::headline)
            .unwrap_or("")
    }
}

/// Insert payload for a detected event. Sentiment starts null so the scoring
/// job (which selects on null) touches each event exactly once.
#[derive(Debug, Clone, Serialize)]
pub struct NewEvent {
    pub article_id: String,
    pub event_type: EventType,
    pub primary_ticker: Option<String>,
    pub affected_tickers: Vec<String>,
    pub sentiment: Option<f64>,
    pub novelty: f64,
    pub confidence: f64,
    pub extracted: Extracted,
    pub occurred_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    #[serde(default)]
    pub signal_id: String,
    #[serde(default)]
    pub event_id: String,
    #[serde(default)]
    pub ticker: Option<String>,
    pub horizon: Horizon,
    #[serde(default, deserialize_with = "null_to_default")]
    pub predicted_return: f64,
    #[serde(default, deserialize_with = "null_to_default")]
    pub uncertainty: f64,
    #[serde(default, deserialize_with = "null_to_default")]
    pub direction: i8,
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewSignal {
    pub event_id: String,
    pub ticker: Option<String>,
    pub horizon: Horizon,
    pub predicted_return: f64,
    pub uncertainty: f64,
    pub direction: i8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_tolerates_unknown_values() {
        let known: EventType = serde_json::from_str(r#""CEO_CHANGE""#).unwrap();
        assert_eq!(known, EventType::CeoChange);
        let other: EventType = serde_json::from_str(r#""MERGER""#).unwrap();
        assert_eq!(other, EventType::Unknown);
    }

    #[test]
    fn horizon_round_trips_wire_labels() {
        for (h, label) in [
            (Horizon::OneDay, "\"1D\""),
            (Horizon::FiveDay, "\"5D\""),
            (Horizon::TwentyDay, "\"20D\""),
        ] {
            assert_eq!(serde_json::to_string(&h).unwrap(), label);
            assert_eq!(serde_json::from_str::<Horizon>(label).unwrap(), h);
        }
    }

    #[test]
    fn extracted_payload_keeps_unknown_keys() {
        let mut payload = Extracted::with_headline("Jane Doe steps down as CEO");
        payload.insert("novelty_hint", serde_json::json!(0.4));
        let json = serde_json::to_string(&payload).unwrap();
        let back: Extracted = serde_json::from_str(&json).unwrap();
        assert_eq!(back.headline(), Some("Jane Doe steps down as CEO"));
        assert_eq!(back.get("novelty_hint"), Some(&serde_json::json!(0.4)));
    }

    #[test]
    fn nullable_store_columns_deserialize_to_defaults() {
        let a: Article = serde_json::from_str(
            r#"{"article_id":"a1","url":"https://x.test","title":null,"summary":null,"published_at":null,"language":null}"#,
        )
        .unwrap();
        assert_eq!(a.title, "");
        assert_eq!(a.summary, "");
        assert!(a.published_at.is_none());

        let s: Signal = serde_json::from_str(
            r#"{"signal_id":"s1","event_id":"e1","ticker":null,"horizon":"1D","predicted_return":null,"uncertainty":null,"direction":null}"#,
        )
        .unwrap();
        assert_eq!(s.predicted_return, 0.0);
        assert_eq!(s.direction, 0);
    }

    #[test]
    fn event_headline_defaults_to_empty() {
        let ev: Event = serde_json::from_str(r#"{"event_id":"e1","event_type":"CEO_CHANGE","extracted":null}"#).unwrap();
        assert_eq!(ev.headline(), "");
    }
}
