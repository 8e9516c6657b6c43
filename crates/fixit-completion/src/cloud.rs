use std::time::Duration;

use async_trait::async_trait;
use fixit_config::completion::CloudBackendConfig;
use serde::Deserialize;
use serde_json::json;

use crate::{BackendMetadata, Completion, CompletionBackend, CompletionError};

/// Azure OpenAI chat-completions client, one request per call
#[derive(Clone)]
pub struct CloudBackend {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    api_version: String,
    deployment: String,
    timeout: Duration,
}

impl CloudBackend {
    pub fn new(config: &CloudBackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            deployment: config.deployment.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Send a short probe prompt to verify credentials and deployment
    pub async fn check_connection(&self) -> Result<Completion, CompletionError> {
        self.generate("Hello, are you connected?", 16).await
    }

    fn validate(&self) -> Result<(), CompletionError> {
        if is_placeholder(&self.api_key) {
            return Err(CompletionError::AuthError("API key is not set".to_string()));
        }
        if is_placeholder(&self.endpoint) {
            return Err(CompletionError::ConfigError("endpoint is not set".to_string()));
        }
        if is_placeholder(&self.deployment) {
            return Err(CompletionError::ConfigError(
                "deployment name is not set".to_string(),
            ));
        }
        Ok(())
    }

    fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }

    async fn request(&self, prompt: &str, max_tokens: u32) -> Result<String, CompletionError> {
        let body = json!({
            "messages": [{ "role": "user", "content": prompt }],
            "max_tokens": max_tokens,
        });

        let response = self
            .client
            .post(self.url())
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == 401 || status == 403 {
            return Err(CompletionError::AuthError(format!("HTTP {}", status)));
        }
        if status == 429 {
            return Err(CompletionError::RateLimited);
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(CompletionError::ProviderError(format!(
                "HTTP {}: {}",
                status,
                detail.trim()
            )));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            CompletionError::ProviderError(format!("Failed to parse response: {}", e))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(CompletionError::EmptyResponse)
    }
}

#[async_trait]
impl CompletionBackend for CloudBackend {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<Completion, CompletionError> {
        self.validate()?;

        let text = tokio::time::timeout(self.timeout, self.request(prompt, max_tokens))
            .await
            .map_err(|_| CompletionError::Timeout)??;

        tracing::info!("Cloud response received ({} chars)", text.len());
        Ok(Completion {
            text,
            backend: "azure-openai".to_string(),
        })
    }

    fn metadata(&self) -> BackendMetadata {
        BackendMetadata {
            name: "azure-openai".to_string(),
            model: self.deployment.clone(),
            requires_api_key: true,
        }
    }
}

fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.contains("YOUR_")
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}
