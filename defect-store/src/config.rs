use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the vehicle cache and flattened complaint store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// SQLite file holding both the payload cache and flattened complaints
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Freshness window for cached payloads, in hours
    #[serde(default = "default_cache_ttl_hours")]
    pub cache_ttl_hours: u32,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("cache.db")
}

fn default_cache_ttl_hours() -> u32 {
    24
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            cache_ttl_hours: default_cache_ttl_hours(),
        }
    }
}

impl StoreConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.db_path.as_os_str().is_empty() {
            return Err("Database path must not be empty".to_string());
        }

        Ok(())
    }

    pub fn cache_ttl(&self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.cache_ttl_hours))
    }
}
