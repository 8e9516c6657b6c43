use std::cmp::Reverse;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use fixit_types::SolutionRecord;
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::error::StoreError;

/// Knowledge base snapshot: signature -> raw record, in file order.
///
/// Records stay as JSON until they are read so a hand-edited entry with a
/// missing field only fails when that entry is actually returned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnowledgeBase {
    entries: Map<String, Value>,
}

impl KnowledgeBase {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Insert or overwrite in place; new keys go last. Returns `true` if the
    /// key already existed.
    pub fn insert(&mut self, key: String, record: &SolutionRecord) -> bool {
        let value = json!({
            "category": record.category,
            "solution": record.solution,
        });
        self.entries.insert(key, value).is_some()
    }

    /// Decode the record stored under `key`
    pub fn record(&self, key: &str) -> Option<Result<SolutionRecord, StoreError>> {
        self.entries.get(key).map(|value| decode_record(key, value))
    }

    /// Keys in scan order: longest first, ties in ascending key order
    pub fn keys_by_specificity(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_by_key(|key| (Reverse(key.len()), *key));
        keys
    }
}

fn decode_record(key: &str, value: &Value) -> Result<SolutionRecord, StoreError> {
    let field = |name: &str| {
        value
            .get(name)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| StoreError::MalformedRecord {
                key: key.to_string(),
                reason: format!("missing string field '{name}'"),
            })
    };

    Ok(SolutionRecord {
        category: field("category")?,
        solution: field("solution")?,
    })
}

/// Flat JSON file holding the knowledge base
#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    path: PathBuf,
}

impl KnowledgeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot. A missing file is an empty knowledge base.
    pub fn load(&self) -> Result<KnowledgeBase, StoreError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No knowledge base at {}, starting empty", self.path.display());
                return Ok(KnowledgeBase::default());
            }
            Err(source) => return Err(self.unavailable(source)),
        };

        if data.trim().is_empty() {
            return Ok(KnowledgeBase::default());
        }

        let raw: Map<String, Value> =
            serde_json::from_str(&data).map_err(|e| StoreError::Corrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        let entries: Map<String, Value> = raw
            .into_iter()
            .map(|(key, value)| (key.to_lowercase(), value))
            .collect();

        tracing::debug!("Loaded {} knowledge entries", entries.len());
        Ok(KnowledgeBase { entries })
    }

    /// Rewrite the whole snapshot as 4-space indented JSON
    pub fn save(&self, base: &KnowledgeBase) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| self.unavailable(e))?;
        }

        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        base.entries
            .serialize(&mut serializer)
            .map_err(|e| self.unavailable(io::Error::from(e)))?;

        // Write beside the target and rename so readers never see half a file
        let staging = self.staging_path();
        fs::write(&staging, &buffer).map_err(|e| self.unavailable(e))?;
        if let Err(e) = fs::rename(&staging, &self.path) {
            let _ = fs::remove_file(&staging);
            return Err(self.unavailable(e));
        }

        tracing::debug!("Saved {} knowledge entries", base.len());
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn unavailable(&self, source: io::Error) -> StoreError {
        StoreError::StorageUnavailable {
            path: self.path.clone(),
            source,
        }
    }
}
