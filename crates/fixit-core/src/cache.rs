use fixit_types::SolutionRecord;

use crate::error::StoreError;
use crate::normalize::normalize;
use crate::store::KnowledgeStore;

/// Writes solutions back into the knowledge base under the normalized text.
///
/// Each call is a full load/insert/save cycle with no locking: two overlapping
/// writers can lose an update, the last save wins.
#[derive(Debug, Clone)]
pub struct CacheWriter {
    store: KnowledgeStore,
}

impl CacheWriter {
    pub fn new(store: KnowledgeStore) -> Self {
        Self { store }
    }

    /// Store `record` under `normalize(raw_text)` and return that key
    pub fn store(&self, raw_text: &str, record: &SolutionRecord) -> Result<String, StoreError> {
        let key = normalize(raw_text);
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }

        let mut base = self.store.load()?;
        if base.insert(key.clone(), record) {
            tracing::debug!("Overwriting existing entry '{}'", key);
        }
        self.store.save(&base)?;

        tracing::info!("Cached '{}' solution under '{}'", record.category, key);
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_store_uses_normalized_key() {
        let dir = TempDir::new().unwrap();
        let store = KnowledgeStore::new(dir.path().join("errors_db.json"));
        let writer = CacheWriter::new(store.clone());

        let key = writer
            .store("  Access DENIED!\n", &SolutionRecord::ai_generated("Run as admin"))
            .unwrap();
        assert_eq!(key, "access denied");

        let base = store.load().unwrap();
        let record = base.record("access denied").unwrap().unwrap();
        assert_eq!(record, SolutionRecord::ai_generated("Run as admin"));
    }

    #[test]
    fn test_later_write_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = KnowledgeStore::new(dir.path().join("errors_db.json"));
        let writer = CacheWriter::new(store.clone());

        writer.store("disk full", &SolutionRecord::new("a", "first")).unwrap();
        writer.store("DISK FULL", &SolutionRecord::new("b", "second")).unwrap();

        let base = store.load().unwrap();
        assert_eq!(base.len(), 1);
        assert_eq!(base.record("disk full").unwrap().unwrap().solution, "second");
    }

    #[test]
    fn test_existing_entries_are_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("errors_db.json");
        fs::write(
            &path,
            r#"{ "printer offline": { "category": "hw", "solution": "Power cycle" } }"#,
        )
        .unwrap();
        let writer = CacheWriter::new(KnowledgeStore::new(&path));

        writer.store("disk full", &SolutionRecord::new("storage", "Free space")).unwrap();

        let base = KnowledgeStore::new(&path).load().unwrap();
        assert_eq!(base.len(), 2);
        assert!(base.contains_key("printer offline"));
    }

    #[test]
    fn test_empty_key_is_rejected() {
        let dir = TempDir::new().unwrap();
        let writer = CacheWriter::new(KnowledgeStore::new(dir.path().join("errors_db.json")));

        let err = writer.store("!!!", &SolutionRecord::new("c", "s")).unwrap_err();
        assert!(matches!(err, StoreError::EmptyKey));
        assert!(!dir.path().join("errors_db.json").exists());
    }

    #[test]
    fn test_unwritable_location_is_reported() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be
        let kb_dir = dir.path().join("kb");
        fs::create_dir(&kb_dir).unwrap();
        let writer = CacheWriter::new(KnowledgeStore::new(&kb_dir));

        let err = writer.store("disk full", &SolutionRecord::new("c", "s")).unwrap_err();
        assert!(matches!(err, StoreError::StorageUnavailable { .. }));
    }
}
