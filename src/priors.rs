// src/priors.rs
//! Static sector and prior tables, exposed through lookup functions only so
//! a later move to config-file or store-backed data is non-breaking. The
//! prior values are illustrative placeholders, not fitted estimates.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::store::types::{EventType, Horizon};

/// Baseline expected return per horizon, before sentiment adjustment.
pub type PriorEntry = &'static [(Horizon, f64)];

pub const UNKNOWN_SECTOR: &str = "Unknown";

static SECTORS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("JPM", "Financials"),
        ("GS", "Financials"),
        ("MS", "Financials"),
        ("C", "Financials"),
        ("BAC", "Financials"),
        ("WFC", "Financials"),
        ("BLK", "Financials"),
        ("BX", "Financials"),
        ("AAPL", "Information Technology"),
        ("MSFT", "Information Technology"),
        ("NVDA", "Information Technology"),
        ("GOOGL", "Communication Services"),
        ("META", "Communication Services"),
        ("AMZN", "Consumer Discretionary"),
        ("TSLA", "Consumer Discretionary"),
    ])
});

/// Sector for a ticker. Unmapped (or absent) tickers land in "Unknown",
/// which has no prior entry: the explicit no-forecast branch.
pub fn sector_for(ticker: Option<&str>) -> &'static str {
    ticker
        .and_then(|t| SECTORS.get(t).copied())
        .unwrap_or(UNKNOWN_SECTOR)
}

/// Baseline priors for `(event type, sector)`; `None` means no forecast is
/// available for the combination (unsupported type or unmapped sector).
pub fn prior_for(event_type: EventType, sector: &str) -> Option<PriorEntry> {
    use Horizon::*;
    match (event_type, sector) {
        (EventType::CeoChange, "Financials") => {
            Some(&[(OneDay, -0.012), (FiveDay, -0.004), (TwentyDay, 0.000)])
        }
        (EventType::CeoChange, "Information Technology") => {
            Some(&[(OneDay, -0.008), (FiveDay, -0.003), (TwentyDay, 0.000)])
        }
        (EventType::CeoChange, "Communication Services") => {
            Some(&[(OneDay, -0.010), (FiveDay, -0.003), (TwentyDay, 0.000)])
        }
        (EventType::CeoChange, "Consumer Discretionary") => {
            Some(&[(OneDay, -0.010), (FiveDay, -0.004), (TwentyDay, 0.000)])
        }
        _ => None,
    }
}
