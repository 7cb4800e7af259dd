use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk snapshots of assembled aggregates, used in development mode to
/// replay a run without touching the network.
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Create a snapshot store rooted at `dir`, creating it if needed
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).context("Failed to create snapshot directory")?;
        Ok(Self { dir })
    }

    /// Save aggregates under `key`
    pub fn save<T: Serialize>(&self, key: &str, data: &T) -> Result<()> {
        let file_path = self.build_json_path(key);
        self.write_json(&file_path, data)?;
        info!("Saved snapshot: {}", file_path.display());
        Ok(())
    }

    /// Load aggregates saved under `key`
    pub fn load<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Result<Option<T>> {
        let file_path = self.build_json_path(key);
        let data = self.read_json_opt(&file_path)?;
        if data.is_some() {
            info!("Loaded snapshot: {}", file_path.display());
        }
        Ok(data)
    }

    pub fn exists(&self, key: &str) -> bool {
        self.build_json_path(key).exists()
    }

    /// Write a plain-text artifact (e.g. the SQL journal) next to the snapshots
    pub fn write_text(&self, file_name: &str, text: &str) -> Result<PathBuf> {
        let file_path = self.dir.join(file_name);
        fs::write(&file_path, text)
            .with_context(|| format!("Failed to write {}", file_path.display()))?;
        Ok(file_path)
    }

    // --- Helper Methods ---

    fn build_json_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn write_json<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data).context("Failed to serialize snapshot")?;
        fs::write(path, json).context("Failed to write snapshot file")?;
        Ok(())
    }

    fn read_json_opt<T: for<'de> Deserialize<'de>>(&self, path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(path)?;
        let data = serde_json::from_str(&json).with_context(|| {
            format!(
                "Failed to parse JSON from {:?}. First 200 chars: {}",
                path,
                json.chars().take(200).collect::<String>()
            )
        })?;
        Ok(Some(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestData {
        value: String,
    }

    #[test]
    fn test_snapshot_save_and_load() {
        let temp_dir = std::env::temp_dir().join("wpt_scraper_test_snapshots");
        let store = SnapshotStore::new(&temp_dir).unwrap();

        let data = TestData {
            value: "test".to_string(),
        };

        store.save("test_key", &data).unwrap();
        let loaded: Option<TestData> = store.load("test_key").unwrap();

        assert_eq!(loaded, Some(data));
        assert!(store.exists("test_key"));

        let missing: Option<TestData> = store.load("missing_key").unwrap();
        assert!(missing.is_none());

        fs::remove_dir_all(&temp_dir).unwrap();
    }
}
