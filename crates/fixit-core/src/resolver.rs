use fixit_completion::{CompletionBackend, backend_from_config, build_prompt};
use fixit_config::Config;
use fixit_types::SolutionRecord;

use crate::cache::CacheWriter;
use crate::error::StoreError;
use crate::matcher::{Match, Matcher};
use crate::normalize::normalize;
use crate::store::KnowledgeStore;

/// Outcome of one capture; always a value, never an error
#[derive(Debug, Clone)]
pub enum Resolution {
    /// Found in the knowledge base
    Matched(Match),
    /// Produced by the completion backend. `cache_error` is set when the
    /// answer could not be written back.
    Generated {
        record: SolutionRecord,
        cache_error: Option<String>,
    },
    /// No record; `error` describes the last failure
    Failed { error: String },
}

impl Resolution {
    pub fn record(&self) -> Option<&SolutionRecord> {
        match self {
            Resolution::Matched(m) => Some(&m.record),
            Resolution::Generated { record, .. } => Some(record),
            Resolution::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Resolution::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// Knowledge-base lookup with completion fallback and write-back
pub struct Resolver {
    matcher: Matcher,
    cache: CacheWriter,
    backend: Box<dyn CompletionBackend>,
    max_tokens: u32,
}

impl Resolver {
    pub fn new(store: KnowledgeStore, backend: Box<dyn CompletionBackend>) -> Self {
        Self {
            matcher: Matcher::new(store.clone()),
            cache: CacheWriter::new(store),
            backend,
            max_tokens: 256,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let store = KnowledgeStore::new(&config.knowledge.path);
        let backend = backend_from_config(&config.completion);

        Self::new(store, backend)
            .with_threshold(config.knowledge.similarity_threshold)
            .with_max_tokens(config.completion.max_tokens)
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.matcher = self.matcher.with_threshold(threshold);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn backend(&self) -> &dyn CompletionBackend {
        self.backend.as_ref()
    }

    /// Knowledge-base lookup only
    pub fn find(&self, raw_text: &str) -> Result<Option<Match>, StoreError> {
        self.matcher.find_match(raw_text)
    }

    /// Look up `raw_text`, asking the backend on a miss and caching its answer
    pub async fn resolve(&self, raw_text: &str) -> Resolution {
        if normalize(raw_text).is_empty() {
            return Resolution::Failed {
                error: "no text to resolve".to_string(),
            };
        }

        match self.matcher.find_match(raw_text) {
            Ok(Some(found)) => return Resolution::Matched(found),
            Ok(None) => {
                tracing::info!(
                    "No match in knowledge base, using {} fallback",
                    self.backend.metadata().name
                );
            }
            Err(e) => {
                tracing::warn!("Knowledge base lookup failed, using fallback: {}", e);
            }
        }

        let prompt = build_prompt(raw_text);
        let completion = match self.backend.generate(&prompt, self.max_tokens).await {
            Ok(completion) => completion,
            Err(e) => {
                tracing::error!("Fallback failed: {}", e);
                return Resolution::Failed {
                    error: e.to_string(),
                };
            }
        };

        let record = SolutionRecord::ai_generated(completion.text);
        let cache_error = match self.cache.store(raw_text, &record) {
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Could not cache fallback answer: {}", e);
                Some(e.to_string())
            }
        };

        Resolution::Generated {
            record,
            cache_error,
        }
    }

    /// Add a hand-written entry
    pub fn curate(
        &self,
        raw_text: &str,
        category: &str,
        solution: &str,
    ) -> Result<String, StoreError> {
        self.cache
            .store(raw_text, &SolutionRecord::new(category, solution))
    }
}
