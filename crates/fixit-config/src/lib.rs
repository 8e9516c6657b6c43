use serde::{Deserialize, Serialize};

use self::completion::CompletionConfig;
use self::knowledge::KnowledgeConfig;
use self::watch::WatchConfig;

pub mod completion;
pub mod knowledge;
pub mod watch;

#[derive(Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub knowledge: KnowledgeConfig,
    pub completion: CompletionConfig,
    pub watch: WatchConfig,
}

impl Config {
    /// Defaults with environment overrides applied
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{ "knowledge": { "path": "kb.json" } }"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert_eq!(config.knowledge.path, "kb.json");
        assert!((config.knowledge.similarity_threshold - 0.6).abs() < f64::EPSILON);
        assert_eq!(config.completion.max_tokens, 256);
        assert_eq!(config.completion.local.timeout_secs, 60);
    }

    #[test]
    fn test_empty_object_is_valid_config() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.watch.poll_interval_ms, 500);
    }
}
