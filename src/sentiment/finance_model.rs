// src/sentiment/finance_model.rs
//! Primary backend: a hosted finance-tuned text classifier returning a
//! three-way positive/neutral/negative distribution. Score is
//! `P(positive) − P(negative)`; confidence is `1 − P(neutral)`, so a
//! strongly-neutral headline yields low confidence regardless of the
//! pos/neg split.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{SentimentBackend, SentimentScore};

pub const ENV_API_TOKEN: &str = "SENTIMENT_API_TOKEN";
pub const ENV_ENDPOINT: &str = "SENTIMENT_ENDPOINT";

const DEFAULT_ENDPOINT: &str = "https://api-inference.huggingface.co/models/ProsusAI/finbert";

pub struct FinanceModelBackend {
    http: reqwest::Client,
    endpoint: String,
    api_token: String,
}

#[derive(Debug, Clone, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

impl FinanceModelBackend {
    /// Fails fast when the API token is absent; `auto` mode catches this and
    /// falls back to the lexicon scorer.
    pub fn from_env() -> Result<Self> {
        let api_token = std::env::var(ENV_API_TOKEN).unwrap_or_default();
        if api_token.trim().is_empty() {
            bail!("missing {ENV_API_TOKEN}");
        }
        let endpoint =
            std::env::var(ENV_ENDPOINT).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let http = reqwest::Client::builder()
            .user_agent("news-event-signals/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(20))
            .build()
            .context("building sentiment http client")?;
        Ok(Self {
            http,
            endpoint,
            api_token,
        })
    }

    /// One tiny classification request, used at startup to verify the model
    /// is actually reachable before committing to this backend.
    pub async fn probe(&self) -> Result<()> {
        self.classify("markets steady").await.map(|_| ())
    }

    async fn classify(&self, text: &str) -> Result<Vec<LabelScore>> {
        #[derive(Serialize)]
        struct Req<'a> {
            inputs: &'a str,
        }

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_token)
            .json(&Req { inputs: text })
            .send()
            .await
            .context("sentiment model request")?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!(
                "sentiment model returned {status}: {}",
                body.chars().take(200).collect::<String>()
            );
        }

        // Response shape: [[{"label": "positive", "score": 0.9}, ...]]
        let mut batches: Vec<Vec<LabelScore>> =
            resp.json().await.context("decoding label scores")?;
        if batches.is_empty() {
            bail!("sentiment model returned no scores");
        }
        Ok(batches.swap_remove(0))
    }
}

/// Map the three-way distribution onto (score, confidence, detail).
fn map_label_scores(labels: &[LabelScore]) -> SentimentScore {
    let mut pos = 0.0;
    let mut neu = 0.0;
    let mut neg = 0.0;
    for ls in labels {
        match ls.label.to_ascii_lowercase().as_str() {
            "positive" => pos = ls.score,
            "neutral" => neu = ls.score,
            "negative" => neg = ls.score,
            _ => {}
        }
    }
    let mut detail = BTreeMap::new();
    detail.insert("positive".to_string(), pos);
    detail.insert("neutral".to_string(), neu);
    detail.insert("negative".to_string(), neg);
    SentimentScore {
        value: pos - neg,
        confidence: 1.0 - neu,
        detail,
    }
}

#[async_trait]
impl SentimentBackend for FinanceModelBackend {
    async fn score(&self, text: &str) -> Result<SentimentScore> {
        let labels = self.classify(text).await?;
        Ok(map_label_scores(&labels))
    }

    fn name(&self) -> &'static str {
        "finance-model"
    }
}
