// tests/detection_rerun.rs
mod common;

use common::MemStore;
use news_event_signals::detect::run_detection;
use news_event_signals::store::types::EventType;

#[tokio::test]
async fn detects_ceo_change_and_resolves_ticker() {
    let store = MemStore::new();
    store.seed_article(
        "Jane Doe steps down as CEO of JPMorgan Chase",
        "Succession planning underway.",
    );
    store.seed_article("Quarterly earnings beat expectations", "Revenue up 4%.");

    let summary = run_detection(&store, 6, 300).await.unwrap();
    assert_eq!(summary.fetched, 2);
    assert_eq!(summary.created, 1);
    assert_eq!(summary.errors, 0);

    let events = store.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, EventType::CeoChange);
    assert_eq!(events[0].primary_ticker.as_deref(), Some("JPM"));
    assert!(events[0].sentiment.is_none());
    assert!(events[0].headline().contains("steps down as CEO"));
}

#[tokio::test]
async fn rerun_creates_no_duplicate_events() {
    let store = MemStore::new();
    store.seed_article(
        "Board appoints Jane Doe as CEO of Microsoft",
        "Effective immediately.",
    );

    let first = run_detection(&store, 6, 300).await.unwrap();
    assert_eq!(first.created, 1);

    let second = run_detection(&store, 6, 300).await.unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.skipped, 1);
    assert_eq!(store.events().len(), 1);
}

#[tokio::test]
async fn board_departure_without_ceo_qualifier_is_ignored() {
    let store = MemStore::new();
    store.seed_article("Jane Doe steps down from the board", "");

    let summary = run_detection(&store, 6, 300).await.unwrap();
    assert_eq!(summary.created, 0);
    assert!(store.events().is_empty());
}
