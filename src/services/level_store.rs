use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{info, warn};

use crate::errors::LevelStoreError;
use crate::models::{DailyRecord, Level};

/// Flat-file store: one JSON array of daily records per level,
/// at `{data_dir}/{level_id}.json`
#[derive(Debug, Clone)]
pub struct LevelStore {
    data_dir: PathBuf,
}

impl LevelStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub async fn load_level(&self, level_id: &str) -> Result<Level, LevelStoreError> {
        let path = self.level_path(level_id)?;

        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Level file not found: {}", path.display());
                return Err(LevelStoreError::NotFound(level_id.to_string()));
            }
            Err(source) => {
                return Err(LevelStoreError::Io {
                    level_id: level_id.to_string(),
                    source,
                })
            }
        };

        let records: Vec<DailyRecord> =
            serde_json::from_str(&raw).map_err(|source| LevelStoreError::Corrupt {
                level_id: level_id.to_string(),
                source,
            })?;

        Ok(Level {
            level_id: level_id.to_string(),
            records,
        })
    }

    pub async fn save_level(&self, level_id: &str, records: &[DailyRecord]) -> Result<PathBuf, LevelStoreError> {
        let path = self.level_path(level_id)?;
        let io_err = |source| LevelStoreError::Io {
            level_id: level_id.to_string(),
            source,
        };

        tokio::fs::create_dir_all(&self.data_dir).await.map_err(io_err)?;

        let body = serde_json::to_vec(records).map_err(|source| LevelStoreError::Corrupt {
            level_id: level_id.to_string(),
            source,
        })?;
        tokio::fs::write(&path, body).await.map_err(io_err)?;

        info!("Saved {} turns for {} to {}", records.len(), level_id, path.display());
        Ok(path)
    }

    /// Sorted ids of every stored level. A missing data directory is an empty catalog.
    pub async fn list_levels(&self) -> Result<Vec<String>, LevelStoreError> {
        let io_err = |source| LevelStoreError::Io {
            level_id: "*".to_string(),
            source,
        };

        let mut entries = match tokio::fs::read_dir(&self.data_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_err(e)),
        };

        let mut levels = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if is_valid_level_id(stem) {
                    levels.push(stem.to_string());
                }
            }
        }

        levels.sort();
        Ok(levels)
    }

    fn level_path(&self, level_id: &str) -> Result<PathBuf, LevelStoreError> {
        if !is_valid_level_id(level_id) {
            warn!("Rejected level id {:?}", level_id);
            return Err(LevelStoreError::NotFound(level_id.to_string()));
        }
        Ok(self.data_dir.join(format!("{}.json", level_id)))
    }
}

/// Letters, digits, underscore and hyphen only
pub fn is_valid_level_id(level_id: &str) -> bool {
    static LEVEL_ID: OnceLock<Regex> = OnceLock::new();
    LEVEL_ID
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("level id pattern is valid"))
        .is_match(level_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_records() -> Vec<DailyRecord> {
        vec![
            DailyRecord::new(NaiveDate::from_ymd_opt(2020, 2, 18).unwrap(), 336.73, -0.27, 66_000_000),
            DailyRecord::new(NaiveDate::from_ymd_opt(2020, 2, 19).unwrap(), 338.34, 0.48, 48_000_000),
        ]
    }

    #[test]
    fn test_level_id_validation() {
        assert!(is_valid_level_id("level_1"));
        assert!(is_valid_level_id("crypto-winter"));
        assert!(!is_valid_level_id(""));
        assert!(!is_valid_level_id("../secrets"));
        assert!(!is_valid_level_id("level 1"));
        assert!(!is_valid_level_id("level_1.json"));
        assert!(!is_valid_level_id("a/b"));
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = LevelStore::new(dir.path().join("data"));

        store.save_level("level_1", &sample_records()).await.unwrap();
        let level = store.load_level("level_1").await.unwrap();

        assert_eq!(level.level_id, "level_1");
        assert_eq!(level.day_count(), 2);
        assert_eq!(level.records, sample_records());
    }

    #[tokio::test]
    async fn test_load_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = LevelStore::new(dir.path());
        store.save_level("level_2", &sample_records()).await.unwrap();

        let first = store.load_level("level_2").await.unwrap();
        let second = store.load_level("level_2").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_missing_level_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = LevelStore::new(dir.path());

        let err = store.load_level("nonexistent").await.unwrap_err();
        assert!(matches!(err, LevelStoreError::NotFound(id) if id == "nonexistent"));
    }

    #[tokio::test]
    async fn test_traversal_id_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("secret.json"), "[]").unwrap();
        let store = LevelStore::new(dir.path().join("data"));

        let err = store.load_level("../secret").await.unwrap_err();
        assert!(matches!(err, LevelStoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_malformed_level_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "[{\"date\": ").unwrap();
        let store = LevelStore::new(dir.path());

        let err = store.load_level("broken").await.unwrap_err();
        assert!(matches!(err, LevelStoreError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_list_levels_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let store = LevelStore::new(dir.path());
        store.save_level("level_3", &sample_records()).await.unwrap();
        store.save_level("level_1", &sample_records()).await.unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();
        std::fs::write(dir.path().join("bad name.json"), "[]").unwrap();

        assert_eq!(store.list_levels().await.unwrap(), vec!["level_1", "level_3"]);
    }

    #[tokio::test]
    async fn test_list_levels_without_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = LevelStore::new(dir.path().join("missing"));
        assert!(store.list_levels().await.unwrap().is_empty());
    }
}
