use serde::{Deserialize, Serialize};

/// Configuration for keyword search over flattened complaints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchConfig {
    /// Number of rows returned when the caller does not ask for a limit
    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

fn default_limit() -> usize {
    50
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
        }
    }
}

impl SearchConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.default_limit == 0 {
            return Err("Default limit must be > 0".to_string());
        }
        Ok(())
    }
}
