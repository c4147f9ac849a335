// src/store/mod.rs
//! External store seam: the operations the pipeline needs from the
//! articles/events/signals tables, plus the REST implementation. Jobs are
//! written against the trait so tests can swap in an in-memory store.

pub mod rest;
pub mod types;

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait PipelineStore: Send + Sync {
    /// Insert-or-merge an article keyed by URL; a duplicate is success.
    async fn upsert_article(&self, article: &NewArticle) -> Result<()>;

    /// Recent articles, newest first, bounded by window and row cap.
    async fn recent_articles(&self, window_hours: i64, limit: usize) -> Result<Vec<Article>>;

    /// Detection dedupe: does any event already reference this article?
    async fn has_event_for_article(&self, article_id: &str) -> Result<bool>;

    async fn insert_event(&self, event: &NewEvent) -> Result<()>;

    /// Events whose sentiment is still null, newest first.
    async fn unscored_events(&self, limit: usize) -> Result<Vec<Event>>;

    /// Partial update writing exactly the two scoring fields.
    async fn update_event_sentiment(
        &self,
        event_id: &str,
        sentiment: f64,
        confidence: f64,
    ) -> Result<()>;

    /// Recent events, newest first, bounded by window and row cap.
    async fn recent_events(&self, window_hours: i64, limit: usize) -> Result<Vec<Event>>;

    /// Signal-generation dedupe: does this event already have signal rows?
    async fn has_signals_for_event(&self, event_id: &str) -> Result<bool>;

    async fn insert_signals(&self, signals: &[NewSignal]) -> Result<()>;

    /// All signal rows for one event (reporting).
    async fn signals_for_event(&self, event_id: &str) -> Result<Vec<Signal>>;
}

pub use rest::RestStore;
pub use types::{Article, Event, EventType, Extracted, Horizon, NewArticle, NewEvent, NewSignal, Signal};
