// tests/common/mod.rs
// In-memory store used by the integration tests; implements the same trait
// seam the REST client does, with URL-keyed article upserts and
// monotonically assigned row ids.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use news_event_signals::store::types::{
    Article, Event, EventType, Extracted, NewArticle, NewEvent, NewSignal, Signal,
};
use news_event_signals::store::PipelineStore;

#[derive(Default)]
pub struct MemStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    articles: Vec<Article>,
    events: Vec<Event>,
    signals: Vec<Signal>,
    next_id: u64,
}

impl Inner {
    fn next(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_article(&self, title: &str, summary: &str) -> String {
        let mut g = self.inner.lock();
        let id = g.next("article");
        g.articles.push(Article {
            article_id: id.clone(),
            source: "test-feed".to_string(),
            url: format!("https://example.test/{id}"),
            title: title.to_string(),
            summary: summary.to_string(),
            published_at: Some(Utc::now()),
            first_seen_at: Some(Utc::now()),
            language: Some("en".to_string()),
        });
        id
    }

    pub fn seed_event(
        &self,
        event_type: EventType,
        ticker: Option<&str>,
        sentiment: Option<f64>,
        headline: &str,
    ) -> String {
        let mut g = self.inner.lock();
        let id = g.next("event");
        g.events.push(Event {
            event_id: id.clone(),
            article_id: None,
            event_type,
            primary_ticker: ticker.map(str::to_string),
            affected_tickers: Some(Vec::new()),
            sentiment,
            novelty: Some(0.0),
            confidence: Some(0.6),
            extracted: Some(Extracted::with_headline(headline)),
            occurred_at: Some(Utc::now()),
            created_at: Some(Utc::now()),
        });
        id
    }

    pub fn articles(&self) -> Vec<Article> {
        self.inner.lock().articles.clone()
    }

    pub fn events(&self) -> Vec<Event> {
        self.inner.lock().events.clone()
    }

    pub fn signals(&self) -> Vec<Signal> {
        self.inner.lock().signals.clone()
    }
}

#[async_trait]
impl PipelineStore for MemStore {
    async fn upsert_article(&self, article: &NewArticle) -> anyhow::Result<()> {
        let mut g = self.inner.lock();
        if let Some(existing) = g.articles.iter_mut().find(|a| a.url == article.url) {
            // Merge-on-conflict: identity fields stay, the rest refresh.
            existing.title = article.title.clone();
            existing.summary = article.summary.clone();
            existing.published_at = article.published_at;
            return Ok(());
        }
        let id = g.next("article");
        g.articles.push(Article {
            article_id: id,
            source: article.source.clone(),
            url: article.url.clone(),
            title: article.title.clone(),
            summary: article.summary.clone(),
            published_at: article.published_at,
            first_seen_at: Some(article.first_seen_at),
            language: Some(article.language.clone()),
        });
        Ok(())
    }

    async fn recent_articles(
        &self,
        _window_hours: i64,
        limit: usize,
    ) -> anyhow::Result<Vec<Article>> {
        let g = self.inner.lock();
        Ok(g.articles.iter().rev().take(limit).cloned().collect())
    }

    async fn has_event_for_article(&self, article_id: &str) -> anyhow::Result<bool> {
        let g = self.inner.lock();
        Ok(g.events
            .iter()
            .any(|e| e.article_id.as_deref() == Some(article_id)))
    }

    async fn insert_event(&self, event: &NewEvent) -> anyhow::Result<()> {
        let mut g = self.inner.lock();
        let id = g.next("event");
        g.events.push(Event {
            event_id: id,
            article_id: Some(event.article_id.clone()),
            event_type: event.event_type,
            primary_ticker: event.primary_ticker.clone(),
            affected_tickers: Some(event.affected_tickers.clone()),
            sentiment: event.sentiment,
            novelty: Some(event.novelty),
            confidence: Some(event.confidence),
            extracted: Some(event.extracted.clone()),
            occurred_at: event.occurred_at,
            created_at: Some(Utc::now()),
        });
        Ok(())
    }

    async fn unscored_events(&self, limit: usize) -> anyhow::Result<Vec<Event>> {
        let g = self.inner.lock();
        Ok(g.events
            .iter()
            .rev()
            .filter(|e| e.sentiment.is_none())
            .take(limit)
            .cloned()
            .collect())
    }

    async fn update_event_sentiment(
        &self,
        event_id: &str,
        sentiment: f64,
        confidence: f64,
    ) -> anyhow::Result<()> {
        let mut g = self.inner.lock();
        match g.events.iter_mut().find(|e| e.event_id == event_id) {
            Some(event) => {
                event.sentiment = Some(sentiment);
                event.confidence = Some(confidence);
                Ok(())
            }
            None => anyhow::bail!("no event {event_id}"),
        }
    }

    async fn recent_events(&self, _window_hours: i64, limit: usize) -> anyhow::Result<Vec<Event>> {
        let g = self.inner.lock();
        Ok(g.events.iter().rev().take(limit).cloned().collect())
    }

    async fn has_signals_for_event(&self, event_id: &str) -> anyhow::Result<bool> {
        let g = self.inner.lock();
        Ok(g.signals.iter().any(|s| s.event_id == event_id))
    }

    async fn insert_signals(&self, signals: &[NewSignal]) -> anyhow::Result<()> {
        let mut g = self.inner.lock();
        for s in signals {
            let id = g.next("signal");
            g.signals.push(Signal {
                signal_id: id,
                event_id: s.event_id.clone(),
                ticker: s.ticker.clone(),
                horizon: s.horizon,
                predicted_return: s.predicted_return,
                uncertainty: s.uncertainty,
                direction: s.direction,
                generated_at: Some(Utc::now()),
            });
        }
        Ok(())
    }

    async fn signals_for_event(&self, event_id: &str) -> anyhow::Result<Vec<Signal>> {
        let g = self.inner.lock();
        Ok(g.signals
            .iter()
            .filter(|s| s.event_id == event_id)
            .cloned()
            .collect())
    }
}
