use fixit_types::SolutionRecord;

use crate::error::StoreError;
use crate::normalize::normalize;
use crate::similarity::ratio;
use crate::store::{KnowledgeBase, KnowledgeStore};

/// Fuzzy matches must score strictly above this
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchKind {
    /// The stored signature appears verbatim in the query
    Substring,
    /// Similarity ratio above the threshold
    Fuzzy { ratio: f64 },
}

#[derive(Debug, Clone)]
pub struct Match {
    pub key: String,
    pub kind: MatchKind,
    pub record: SolutionRecord,
}

/// Looks up OCR text in the knowledge base.
///
/// Keys are scanned longest first and the first key that is a substring of
/// the normalized query, or scores above the threshold, wins. It is not a
/// best-score search.
#[derive(Debug, Clone)]
pub struct Matcher {
    store: KnowledgeStore,
    threshold: f64,
}

impl Matcher {
    pub fn new(store: KnowledgeStore) -> Self {
        Self {
            store,
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn find(&self, raw_text: &str) -> Result<Option<SolutionRecord>, StoreError> {
        Ok(self.find_match(raw_text)?.map(|m| m.record))
    }

    /// Like [`Matcher::find`], also reporting which key matched and how
    pub fn find_match(&self, raw_text: &str) -> Result<Option<Match>, StoreError> {
        let normalized = normalize(raw_text);
        tracing::debug!("Normalized query: '{}'", normalized);

        if normalized.is_empty() {
            return Ok(None);
        }

        // Re-read on every lookup so hand edits and cache writes are visible
        let base = self.store.load()?;

        let Some((key, kind)) = scan(&base, &normalized, self.threshold) else {
            tracing::debug!("No match among {} entries", base.len());
            return Ok(None);
        };

        match kind {
            MatchKind::Substring => tracing::info!("Exact match for key: {}", key),
            MatchKind::Fuzzy { ratio } => {
                tracing::info!("Fuzzy match for key: {} (score {:.2})", key, ratio)
            }
        }

        let record = match base.record(key) {
            Some(record) => record?,
            None => return Ok(None),
        };

        Ok(Some(Match {
            key: key.to_string(),
            kind,
            record,
        }))
    }
}

/// First key that matches `normalized`, in specificity order
fn scan<'a>(
    base: &'a KnowledgeBase,
    normalized: &str,
    threshold: f64,
) -> Option<(&'a str, MatchKind)> {
    for key in base.keys_by_specificity() {
        if !key.is_empty() && normalized.contains(key) {
            return Some((key, MatchKind::Substring));
        }

        let score = ratio(key, normalized);
        if score > threshold {
            return Some((key, MatchKind::Fuzzy { ratio: score }));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn matcher_with(dir: &TempDir, entries: &[(&str, &str)]) -> Matcher {
        let store = KnowledgeStore::new(dir.path().join("errors_db.json"));
        let mut base = KnowledgeBase::default();
        for (key, solution) in entries {
            base.insert(key.to_string(), &SolutionRecord::new("test", *solution));
        }
        store.save(&base).unwrap();
        Matcher::new(store)
    }

    #[test]
    fn test_substring_after_normalization() {
        let dir = TempDir::new().unwrap();
        let matcher = matcher_with(&dir, &[("disk full", "Free some space")]);

        let found = matcher.find_match("Error: Disk Full on C:").unwrap().unwrap();
        assert_eq!(found.key, "disk full");
        assert_eq!(found.kind, MatchKind::Substring);
        assert_eq!(found.record.solution, "Free some space");
    }

    #[test]
    fn test_threshold_is_strict() {
        let dir = TempDir::new().unwrap();
        let matcher = matcher_with(&dir, &[("abcde", "five")]);

        // ratio("abcde", "abcxy") == 0.6 exactly
        assert!(matcher.find("abcxy").unwrap().is_none());
    }

    #[test]
    fn test_just_above_threshold_matches() {
        let dir = TempDir::new().unwrap();
        let matcher = matcher_with(&dir, &[("abcdef", "six")]);

        // ratio("abcdef", "abcdxyz") == 8/13, about 0.615
        let found = matcher.find_match("ABCDXYZ").unwrap().unwrap();
        assert_eq!(found.record.solution, "six");
        assert!(matches!(found.kind, MatchKind::Fuzzy { ratio } if ratio > 0.6 && ratio < 0.62));
    }

    #[test]
    fn test_custom_threshold() {
        let dir = TempDir::new().unwrap();
        let matcher = matcher_with(&dir, &[("abcdef", "six")]).with_threshold(0.7);

        assert!(matcher.find("abcdxyz").unwrap().is_none());
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        let dir = TempDir::new().unwrap();
        let matcher = matcher_with(&dir, &[("", "empty key"), ("disk full", "x")]);

        assert!(matcher.find("").unwrap().is_none());
        assert!(matcher.find(" ?! ").unwrap().is_none());
    }

    #[test]
    fn test_more_specific_key_wins() {
        let dir = TempDir::new().unwrap();
        let matcher = matcher_with(
            &dir,
            &[("error", "generic"), ("access denied error", "permissions")],
        );

        let record = matcher.find("ACCESS DENIED ERROR (5)").unwrap().unwrap();
        assert_eq!(record.solution, "permissions");
    }

    #[test]
    fn test_unrelated_text_misses() {
        let dir = TempDir::new().unwrap();
        let matcher = matcher_with(&dir, &[("disk full", "x")]);

        assert!(matcher.find("Welcome to the login screen").unwrap().is_none());
    }

    #[test]
    fn test_lookup_sees_latest_file_content() {
        let dir = TempDir::new().unwrap();
        let matcher = matcher_with(&dir, &[]);
        assert!(matcher.find("printer offline").unwrap().is_none());

        fs::write(
            dir.path().join("errors_db.json"),
            r#"{ "printer offline": { "category": "hw", "solution": "Power cycle" } }"#,
        )
        .unwrap();
        assert_eq!(
            matcher.find("Printer offline!").unwrap().unwrap().solution,
            "Power cycle"
        );
    }

    #[test]
    fn test_malformed_match_is_reported() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("errors_db.json"),
            r#"{ "disk full": { "solution": "no category" } }"#,
        )
        .unwrap();
        let matcher = Matcher::new(KnowledgeStore::new(dir.path().join("errors_db.json")));

        assert!(matches!(
            matcher.find("disk full"),
            Err(StoreError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn test_missing_store_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let matcher = Matcher::new(KnowledgeStore::new(dir.path().join("absent.json")));

        assert!(matcher.find("anything").unwrap().is_none());
    }
}
