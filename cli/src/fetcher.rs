use recallscope_records::{ProviderPayload, VehicleKey};
use recallscope_store::Fetcher;
use std::path::{Path, PathBuf};

pub const RECALLS_FILE: &str = "recalls.json";
pub const COMPLAINTS_FILE: &str = "complaints.json";

/// Serves provider payloads saved as JSON files in one directory.
///
/// The directory stands in for the remote registry, so every vehicle key
/// gets the same two files.
#[derive(Debug, Clone)]
pub struct DirFetcher {
    dir: PathBuf,
}

impl DirFetcher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn load(&self, name: &str) -> ProviderPayload {
        let path = self.dir.join(name);
        match read_json(&path) {
            Ok(value) => ProviderPayload::from_value(value),
            Err(reason) => {
                tracing::warn!("{reason}");
                ProviderPayload::failure(reason)
            }
        }
    }
}

fn read_json(path: &Path) -> Result<serde_json::Value, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("invalid JSON in {}: {e}", path.display()))
}

impl Fetcher for DirFetcher {
    fn fetch_recalls(&self, _key: &VehicleKey) -> ProviderPayload {
        self.load(RECALLS_FILE)
    }

    fn fetch_complaints(&self, _key: &VehicleKey) -> ProviderPayload {
        self.load(COMPLAINTS_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn key() -> VehicleKey {
        VehicleKey::parse("2020", "Honda", "Accord").unwrap()
    }

    #[test]
    fn test_reads_both_files() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(RECALLS_FILE), r#"{"results": [{"id": 1}]}"#).unwrap();
        std::fs::write(temp_dir.path().join(COMPLAINTS_FILE), r#"{"Results": []}"#).unwrap();

        let fetcher = DirFetcher::new(temp_dir.path());
        assert_eq!(fetcher.fetch_recalls(&key()).record_count(), 1);
        assert!(!fetcher.fetch_complaints(&key()).is_failed());
    }

    #[test]
    fn test_missing_or_invalid_file_is_failure() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(COMPLAINTS_FILE), "not json").unwrap();

        let fetcher = DirFetcher::new(temp_dir.path());
        let recalls = fetcher.fetch_recalls(&key());
        let complaints = fetcher.fetch_complaints(&key());

        assert!(recalls.is_failed());
        assert!(recalls.failure_reason().unwrap().contains("cannot read"));
        assert!(complaints.failure_reason().unwrap().contains("invalid JSON"));
    }
}
