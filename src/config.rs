// src/config.rs
//! Process configuration. Store credentials are required and checked before
//! any job runs; everything else carries a default.

use anyhow::{bail, Result};

pub const ENV_STORE_URL: &str = "STORE_URL";
pub const ENV_STORE_SERVICE_KEY: &str = "STORE_SERVICE_KEY";

#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL of the REST store, without a trailing slash.
    pub base_url: String,
    pub service_key: String,
}

impl StoreConfig {
    /// Missing or empty credentials are fatal: jobs must not start
    /// half-configured.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var(ENV_STORE_URL).unwrap_or_default();
        let service_key = std::env::var(ENV_STORE_SERVICE_KEY).unwrap_or_default();
        if base_url.trim().is_empty() || service_key.trim().is_empty() {
            bail!("missing {ENV_STORE_URL} or {ENV_STORE_SERVICE_KEY}");
        }
        Ok(Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            service_key: service_key.trim().to_string(),
        })
    }
}
