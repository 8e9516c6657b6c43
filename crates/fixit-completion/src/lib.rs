use fixit_config::completion::{CompletionConfig, Provider};

pub mod cloud;
pub mod local;
pub mod prompt;

#[cfg(test)]
mod test_server;

pub use cloud::CloudBackend;
pub use local::{ChatMessage, LocalBackend};
pub use prompt::build_prompt;

/// Text-generation provider interface
///
/// Every backend failure comes back as a [`CompletionError`]; callers never
/// see backend-specific transport errors.
#[async_trait::async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Generate a completion for `prompt`, capped at `max_tokens`
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<Completion, CompletionError>;

    /// Provider metadata
    fn metadata(&self) -> BackendMetadata;
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub backend: String,
}

#[derive(Debug, Clone)]
pub struct BackendMetadata {
    pub name: String,
    pub model: String,
    pub requires_api_key: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Empty response from backend")]
    EmptyResponse,

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Provider error: {0}")]
    ProviderError(String),
}

impl From<reqwest::Error> for CompletionError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CompletionError::Timeout
        } else if e.is_connect() {
            CompletionError::ConnectionError(e.to_string())
        } else {
            CompletionError::ProviderError(e.to_string())
        }
    }
}

/// Build the backend selected by `config.provider`
pub fn backend_from_config(config: &CompletionConfig) -> Box<dyn CompletionBackend> {
    match config.provider {
        Provider::Local => Box::new(LocalBackend::new(&config.local)),
        Provider::Cloud => Box::new(CloudBackend::new(&config.cloud)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_config_picks_provider() {
        let mut config = CompletionConfig::default();

        config.provider = Provider::Local;
        assert_eq!(backend_from_config(&config).metadata().name, "ollama");

        config.provider = Provider::Cloud;
        let metadata = backend_from_config(&config).metadata();
        assert_eq!(metadata.name, "azure-openai");
        assert!(metadata.requires_api_key);
    }
}
