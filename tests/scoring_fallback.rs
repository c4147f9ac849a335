// tests/scoring_fallback.rs
mod common;

use common::MemStore;
use news_event_signals::sentiment::{
    build_backend, finance_model, run_scoring, BackendMode, SentimentBackend,
};
use news_event_signals::store::types::EventType;

#[serial_test::serial]
#[tokio::test]
async fn auto_mode_degrades_to_lexicon_without_a_model() {
    std::env::remove_var(finance_model::ENV_API_TOKEN);

    let backend = build_backend(BackendMode::Auto).await.unwrap();
    assert_eq!(backend.name(), "lexicon");

    // The degraded backend still produces a usable (score, confidence) pair.
    let s = backend
        .score("CEO resigns abruptly amid fraud probe")
        .await
        .unwrap();
    assert!((-1.0..=1.0).contains(&s.value));
    assert!(s.value < 0.0);
    assert!((s.confidence - s.value.abs()).abs() < 1e-12);
}

#[serial_test::serial]
#[tokio::test]
async fn primary_mode_without_a_model_is_fatal() {
    std::env::remove_var(finance_model::ENV_API_TOKEN);
    assert!(build_backend(BackendMode::Primary).await.is_err());
}

#[tokio::test]
async fn scoring_job_scores_each_event_once_and_skips_blank_headlines() {
    let store = MemStore::new();
    store.seed_event(
        EventType::CeoChange,
        Some("JPM"),
        None,
        "CEO resigns amid accounting fraud probe",
    );
    store.seed_event(EventType::CeoChange, Some("GS"), None, "   ");

    let backend = build_backend(BackendMode::Fallback).await.unwrap();
    let summary = run_scoring(&store, backend.as_ref(), 100).await.unwrap();
    assert_eq!(summary.fetched, 2);
    assert_eq!(summary.created, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.errors, 0);

    let scored: Vec<_> = store
        .events()
        .into_iter()
        .filter(|e| e.sentiment.is_some())
        .collect();
    assert_eq!(scored.len(), 1);
    let value = scored[0].sentiment.unwrap();
    assert!((-1.0..=1.0).contains(&value));
    assert!(value < 0.0);

    // Second pass only sees the blank-headline event, and writes nothing.
    let again = run_scoring(&store, backend.as_ref(), 100).await.unwrap();
    assert_eq!(again.fetched, 1);
    assert_eq!(again.created, 0);
    assert_eq!(again.skipped, 1);
}
