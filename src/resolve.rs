// src/resolve.rs
//! Company-mention → ticker resolution over a fixed alias table.

use once_cell::sync::Lazy;

/// Alias table in definition order; the first alias found in the text wins.
/// Overlapping aliases ("Google" and "Alphabet" both map to GOOGL) are fine.
/// No longest-match preference: a longer alias contained in another does not
/// beat a shorter one listed earlier.
static ALIASES: &[(&str, &str)] = &[
    ("JPMorgan", "JPM"),
    ("JP Morgan", "JPM"),
    ("JPMorgan Chase", "JPM"),
    ("JPM", "JPM"),
    ("Goldman Sachs", "GS"),
    ("Morgan Stanley", "MS"),
    ("Citigroup", "C"),
    ("Bank of America", "BAC"),
    ("Wells Fargo", "WFC"),
    ("BlackRock", "BLK"),
    ("Blackstone", "BX"),
    ("Apple", "AAPL"),
    ("Microsoft", "MSFT"),
    ("Alphabet", "GOOGL"),
    ("Google", "GOOGL"),
    ("Meta", "META"),
    ("Amazon", "AMZN"),
    ("Tesla", "TSLA"),
    ("Nvidia", "NVDA"),
];

static ALIASES_LC: Lazy<Vec<(String, &'static str)>> = Lazy::new(|| {
    ALIASES
        .iter()
        .map(|(alias, ticker)| (alias.to_ascii_lowercase(), *ticker))
        .collect()
});

/// Case-insensitive substring scan in table order. Pure function over the
/// static table and the input text.
pub fn resolve_ticker(text: &str) -> Option<&'static str> {
    let haystack = text.to_ascii_lowercase();
    ALIASES_LC
        .iter()
        .find(|(alias, _)| haystack.contains(alias.as_str()))
        .map(|(_, ticker)| *ticker)
}
