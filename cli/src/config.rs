use anyhow::{Context, Result};
use recallscope_geo_indexer::GeoIndexConfig;
use recallscope_store::StoreConfig;
use recallscope_symptom_search::SearchConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "recallscope.toml";

/// Settings for every command, one table per subsystem.
///
/// ```toml
/// [store]
/// db_path = "cache.db"
/// cache_ttl_hours = 24
///
/// [geo]
/// input_path = "data/FLAT_CMPL.txt"
/// db_path = "data/geo_state_counts.sqlite"
/// chunk_size = 250000
///
/// [search]
/// default_limit = 50
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub geo: GeoIndexConfig,

    #[serde(default)]
    pub search: SearchConfig,
}

impl AppConfig {
    /// Load from an explicit path, else from [`DEFAULT_CONFIG_FILE`] when it
    /// exists, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.is_file()),
        };

        let config = match path {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                Self::from_toml(&text)
                    .with_context(|| format!("Invalid config {}", path.display()))?
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.store
            .validate()
            .map_err(|e| anyhow::anyhow!("[store] {e}"))?;
        self.geo.validate().map_err(|e| anyhow::anyhow!("[geo] {e}"))?;
        self.search
            .validate()
            .map_err(|e| anyhow::anyhow!("[search] {e}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = AppConfig::from_toml(
            "[store]\ncache_ttl_hours = 6\n\n[geo]\nchunk_size = 1000\n",
        )
        .unwrap();

        assert_eq!(config.store.cache_ttl_hours, 6);
        assert_eq!(config.store.db_path, PathBuf::from("cache.db"));
        assert_eq!(config.geo.chunk_size, 1000);
        assert_eq!(config.search, SearchConfig::default());
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(AppConfig::from_toml("").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("recallscope.toml");
        std::fs::write(&path, "[search]\ndefault_limit = 0\n").unwrap();

        let err = AppConfig::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("[search]"));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        assert!(AppConfig::load(Some(&temp_dir.path().join("nope.toml"))).is_err());
    }
}
