use std::env;

use serde::{Deserialize, Serialize};

fn default_path() -> String {
    env::var("FIXIT_DB_PATH").unwrap_or_else(|_| "errors_db.json".to_string())
}

fn default_similarity_threshold() -> f64 {
    0.6
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// Knowledge base JSON file
    #[serde(default = "default_path")]
    pub path: String,
    /// Fuzzy matches must score strictly above this ratio
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            similarity_threshold: default_similarity_threshold(),
        }
    }
}
