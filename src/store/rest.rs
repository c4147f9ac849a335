// src/store/rest.rs
//! REST client for the article/event/signal store (PostgREST-style
//! filtering). Every write treats a 409 conflict as success so jobs stay
//! safely re-runnable; reads are list-and-filter with a fixed row cap.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::StoreConfig;
use crate::store::types::{Article, Event, NewArticle, NewEvent, NewSignal, Signal};
use crate::store::PipelineStore;

pub struct RestStore {
    http: reqwest::Client,
    base: String,
    service_key: String,
}

impl RestStore {
    pub fn new(cfg: &StoreConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("news-event-signals/0.1")
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .context("building store http client")?;
        Ok(Self {
            http,
            base: cfg.base_url.trim_end_matches('/').to_string(),
            service_key: cfg.service_key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base, table)
    }

    async fn get_rows<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>> {
        let resp = self
            .http
            .get(url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("GET {url} failed {status}: {}", snippet(&body));
        }
        resp.json::<Vec<T>>()
            .await
            .with_context(|| format!("decoding rows from {url}"))
    }

    async fn post_rows<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        merge_duplicates: bool,
    ) -> Result<()> {
        let mut req = self
            .http
            .post(url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .json(body);
        if merge_duplicates {
            req = req.header("Prefer", "resolution=merge-duplicates");
        }
        let resp = req.send().await.with_context(|| format!("POST {url}"))?;
        ok_or_conflict(resp, "POST", url).await
    }

    async fn patch_rows<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<()> {
        let resp = self
            .http
            .patch(url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .json(body)
            .send()
            .await
            .with_context(|| format!("PATCH {url}"))?;
        ok_or_conflict(resp, "PATCH", url).await
    }
}

/// Conflict means the row already exists; re-runs must not fail on it.
async fn ok_or_conflict(resp: reqwest::Response, method: &str, url: &str) -> Result<()> {
    let status = resp.status();
    if status.is_success() || status == StatusCode::CONFLICT {
        return Ok(());
    }
    let body = resp.text().await.unwrap_or_default();
    bail!("{method} {url} failed {status}: {}", snippet(&body));
}

/// First 300 chars of an error body, enough to diagnose without flooding logs.
fn snippet(body: &str) -> String {
    body.chars().take(300).collect()
}

#[async_trait]
impl PipelineStore for RestStore {
    async fn upsert_article(&self, article: &NewArticle) -> Result<()> {
        let url = self.table_url("articles");
        self.post_rows(&url, &[article], true).await
    }

    async fn recent_articles(&self, window_hours: i64, limit: usize) -> Result<Vec<Article>> {
        let url = format!(
            "{}?select=*&order=first_seen_at.desc&limit={limit}",
            self.table_url("articles")
        );
        let rows: Vec<Article> = self.get_rows(&url).await?;
        let cutoff = Utc::now() - chrono::Duration::hours(window_hours);
        Ok(rows
            .into_iter()
            .filter(|a| a.first_seen_at.is_some_and(|t| t >= cutoff))
            .collect())
    }

    async fn has_event_for_article(&self, article_id: &str) -> Result<bool> {
        let url = format!(
            "{}?select=event_id&article_id=eq.{article_id}&limit=1",
            self.table_url("events")
        );
        let rows: Vec<serde_json::Value> = self.get_rows(&url).await?;
        Ok(!rows.is_empty())
    }

    async fn insert_event(&self, event: &NewEvent) -> Result<()> {
        let url = self.table_url("events");
        self.post_rows(&url, &[event], false).await
    }

    async fn unscored_events(&self, limit: usize) -> Result<Vec<Event>> {
        let url = format!(
            "{}?select=*&sentiment=is.null&order=created_at.desc&limit={limit}",
            self.table_url("events")
        );
        self.get_rows(&url).await
    }

    async fn update_event_sentiment(
        &self,
        event_id: &str,
        sentiment: f64,
        confidence: f64,
    ) -> Result<()> {
        let url = format!("{}?event_id=eq.{event_id}", self.table_url("events"));
        let body = serde_json::json!({ "sentiment": sentiment, "confidence": confidence });
        self.patch_rows(&url, &body).await
    }

    async fn recent_events(&self, window_hours: i64, limit: usize) -> Result<Vec<Event>> {
        let url = format!(
            "{}?select=*&order=created_at.desc&limit={limit}",
            self.table_url("events")
        );
        let rows: Vec<Event> = self.get_rows(&url).await?;
        let cutoff = Utc::now() - chrono::Duration::hours(window_hours);
        Ok(rows
            .into_iter()
            .filter(|e| e.created_at.is_some_and(|t| t >= cutoff))
            .collect())
    }

    async fn has_signals_for_event(&self, event_id: &str) -> Result<bool> {
        let url = format!(
            "{}?select=signal_id&event_id=eq.{event_id}&limit=1",
            self.table_url("signals")
        );
        let rows: Vec<serde_json::Value> = self.get_rows(&url).await?;
        Ok(!rows.is_empty())
    }

    async fn insert_signals(&self, signals: &[NewSignal]) -> Result<()> {
        if signals.is_empty() {
            return Ok(());
        }
        let url = self.table_url("signals");
        self.post_rows(&url, signals, false).await
    }

    async fn signals_for_event(&self, event_id: &str) -> Result<Vec<Signal>> {
        let url = format!(
            "{}?select=*&event_id=eq.{event_id}",
            self.table_url("signals")
        );
        self.get_rows(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;

    fn store() -> RestStore {
        RestStore::new(&StoreConfig {
            base_url: "https://store.example.test".to_string(),
            service_key: "svc".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn table_urls_follow_rest_convention() {
        let s = store();
        assert_eq!(
            s.table_url("articles"),
            "https://store.example.test/rest/v1/articles"
        );
        assert_eq!(
            s.table_url("signals"),
            "https://store.example.test/rest/v1/signals"
        );
    }

    #[test]
    fn snippet_caps_error_bodies() {
        let long = "x".repeat(1000);
        assert_eq!(snippet(&long).len(), 300);
        assert_eq!(snippet("short"), "short");
    }
}
