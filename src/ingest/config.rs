// src/ingest/config.rs
//! Feed list configuration. Supports TOML or JSON files with an env-var
//! override; falls back to the built-in source list when no file exists.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

pub const ENV_FEEDS_PATH: &str = "INGEST_FEEDS_PATH";

/// Built-in feed list used when no config file is present.
pub const DEFAULT_FEEDS: &[&str] = &[
    "https://www.businesswire.com/portal/site/home/news/subject/?vnsId=31373&rss=1",
    "https://www.prnewswire.com/rss/finance-latest-news.rss",
    "https://feeds.a.dj.com/rss/RSSMarketsMain.xml",
    "https://www.ft.com/companies?format=rss",
];

/// Max feed entries considered per source per run.
pub const PER_FEED_LIMIT: usize = 30;

/// Load the feed list from an explicit path. Supports TOML or JSON formats.
pub fn load_feeds_from(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading feeds from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_feeds(&content, ext.as_str())
}

/// Load the feed list using env var + fallbacks:
/// 1) $INGEST_FEEDS_PATH
/// 2) config/feeds.toml
/// 3) config/feeds.json
/// 4) the built-in defaults
pub fn load_feeds_default() -> Result<Vec<String>> {
    if let Ok(p) = std::env::var(ENV_FEEDS_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_feeds_from(&pb);
        }
        return Err(anyhow!("{ENV_FEEDS_PATH} points to non-existent path"));
    }
    let toml_p = PathBuf::from("config/feeds.toml");
    if toml_p.exists() {
        return load_feeds_from(&toml_p);
    }
    let json_p = PathBuf::from("config/feeds.json");
    if json_p.exists() {
        return load_feeds_from(&json_p);
    }
    Ok(DEFAULT_FEEDS.iter().map(|s| s.to_string()).collect())
}

fn parse_feeds(s: &str, hint_ext: &str) -> Result<Vec<String>> {
    // Try TOML first if hinted or content looks like toml.
    let try_toml = hint_ext == "toml" || s.contains("feeds");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    // Try JSON array
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    // Fallback: also try TOML if not attempted
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported feeds format"))
}

fn parse_toml(s: &str) -> Result<Vec<String>> {
    #[derive(serde::Deserialize)]
    struct TomlFeeds {
        feeds: Vec<String>,
    }
    let v: TomlFeeds = toml::from_str(s)?;
    Ok(clean_list(v.feeds))
}

fn parse_json(s: &str) -> Result<Vec<String>> {
    let v: Vec<String> = serde_json::from_str(s)?;
    Ok(clean_list(v))
}

/// Trim, drop empties, dedup while keeping first-seen order (feed order is
/// the fetch order).
fn clean_list(items: Vec<String>) -> Vec<String> {
    use std::collections::HashSet;
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for it in items {
        let t = it.trim();
        if !t.is_empty() && seen.insert(t.to_string()) {
            out.push(t.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn dedup_trim_and_formats_work() {
        let toml = r#"feeds = [" https://a.test/rss ", "", "https://b.test/rss", "https://b.test/rss"]"#;
        let json = r#"["https://c.test/rss", "  https://a.test/rss  ", ""]"#;
        let toml_out = parse_toml(toml).unwrap();
        assert_eq!(
            toml_out,
            vec!["https://a.test/rss".to_string(), "https://b.test/rss".to_string()]
        );
        let json_out = parse_json(json).unwrap();
        assert_eq!(
            json_out,
            vec!["https://c.test/rss".to_string(), "https://a.test/rss".to_string()]
        );
    }

    #[serial_test::serial]
    #[test]
    fn env_path_takes_precedence() {
        let p = env::temp_dir().join("news_event_signals_feeds_test.json");
        fs::write(&p, r#"["https://x.test/rss"]"#).unwrap();
        env::set_var(ENV_FEEDS_PATH, p.display().to_string());
        let v = load_feeds_default().unwrap();
        assert_eq!(v, vec!["https://x.test/rss".to_string()]);
        env::remove_var(ENV_FEEDS_PATH);
        let _ = fs::remove_file(&p);
    }

    #[serial_test::serial]
    #[test]
    fn missing_env_path_is_an_error() {
        env::set_var(ENV_FEEDS_PATH, "/definitely/not/here.toml");
        assert!(load_feeds_default().is_err());
        env::remove_var(ENV_FEEDS_PATH);
    }
}
