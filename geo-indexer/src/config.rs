use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for building the offline state-count index
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeoIndexConfig {
    /// Tab-delimited complaint dump (no header row)
    #[serde(default = "default_input_path")]
    pub input_path: PathBuf,

    /// SQLite file holding the accumulated counts
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Rows read per chunk; bounds peak memory
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_input_path() -> PathBuf {
    PathBuf::from("data").join("FLAT_CMPL.txt")
}

fn default_db_path() -> PathBuf {
    PathBuf::from("data").join("geo_state_counts.sqlite")
}

fn default_chunk_size() -> usize {
    250_000
}

impl Default for GeoIndexConfig {
    fn default() -> Self {
        Self {
            input_path: default_input_path(),
            db_path: default_db_path(),
            chunk_size: default_chunk_size(),
        }
    }
}

impl GeoIndexConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("Chunk size must be > 0".to_string());
        }

        if self.db_path.as_os_str().is_empty() {
            return Err("Database path must not be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = GeoIndexConfig::default();
        assert_eq!(config.chunk_size, 250_000);
        assert_eq!(config.input_path, PathBuf::from("data/FLAT_CMPL.txt"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = GeoIndexConfig::default();
        config.chunk_size = 0;
        assert!(config.validate().is_err());
    }
}
