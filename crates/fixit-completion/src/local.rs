use std::time::Duration;

use async_trait::async_trait;
use fixit_config::completion::LocalBackendConfig;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{BackendMetadata, Completion, CompletionBackend, CompletionError};

/// Client for an Ollama-compatible server running on this machine.
///
/// Replies arrive as newline-delimited JSON; fragments are concatenated
/// until a chunk carries `"done": true`. The whole exchange, including the
/// stream, is bounded by the configured timeout.
#[derive(Clone)]
pub struct LocalBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
    timeout: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

impl LocalBackend {
    pub fn new(config: &LocalBackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check that the server answers on its root endpoint
    pub async fn check_connection(&self) -> Result<String, CompletionError> {
        let request = async {
            let response = self.client.get(self.url("")).send().await?;
            let response = check_status(response).await?;
            Ok::<_, CompletionError>(response.text().await?.trim().to_string())
        };

        tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| CompletionError::Timeout)?
    }

    /// Names of the models the server has pulled
    pub async fn list_models(&self) -> Result<Vec<String>, CompletionError> {
        let request = async {
            let response = self.client.get(self.url("api/tags")).send().await?;
            let response = check_status(response).await?;
            let tags: TagsResponse = response.json().await.map_err(|e| {
                CompletionError::ProviderError(format!("Failed to parse model list: {e}"))
            })?;
            Ok::<_, CompletionError>(tags.models.into_iter().map(|m| m.name).collect())
        };

        tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| CompletionError::Timeout)?
    }

    /// Chat-style exchange over `/api/chat`
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<Completion, CompletionError> {
        let body = json!({
            "model": self.model,
            "messages": messages,
        });

        let text = self.stream("api/chat", body).await?;
        Ok(Completion {
            text,
            backend: "ollama".to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn stream(&self, path: &str, body: serde_json::Value) -> Result<String, CompletionError> {
        let url = self.url(path);
        tracing::debug!("POST {} (model {})", url, self.model);

        let text = tokio::time::timeout(self.timeout, self.read_stream(&url, &body))
            .await
            .map_err(|_| CompletionError::Timeout)??;

        if text.trim().is_empty() {
            return Err(CompletionError::EmptyResponse);
        }

        Ok(text)
    }

    async fn read_stream(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<String, CompletionError> {
        let response = self.client.post(url).json(body).send().await?;
        let mut response = check_status(response).await?;

        let mut lines = LineBuffer::default();
        let mut text = String::new();

        while let Some(chunk) = response.chunk().await? {
            for line in lines.push(&chunk) {
                if apply_line(&line, &mut text)? {
                    return Ok(text);
                }
            }
        }

        if let Some(line) = lines.finish()
            && apply_line(&line, &mut text)?
        {
            return Ok(text);
        }

        tracing::warn!("Stream from {} closed before completion flag", url);
        Ok(text)
    }
}

#[async_trait]
impl CompletionBackend for LocalBackend {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<Completion, CompletionError> {
        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "options": { "num_predict": max_tokens },
        });

        let text = self.stream("api/generate", body).await?;
        tracing::info!("Local model response received ({} chars)", text.len());

        Ok(Completion {
            text,
            backend: "ollama".to_string(),
        })
    }

    fn metadata(&self) -> BackendMetadata {
        BackendMetadata {
            name: "ollama".to_string(),
            model: self.model.clone(),
            requires_api_key: false,
        }
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, CompletionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(CompletionError::ProviderError(format!(
        "HTTP {}: {}",
        status,
        body.trim()
    )))
}

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    message: Option<ChatFragment>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ChatFragment {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

/// Append the fragment carried by one NDJSON line. Returns `true` once the
/// completion flag is seen.
fn apply_line(line: &[u8], text: &mut String) -> Result<bool, CompletionError> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim();
    if line.is_empty() {
        return Ok(false);
    }

    let chunk: StreamChunk = serde_json::from_str(line)
        .map_err(|e| CompletionError::ProviderError(format!("Invalid stream chunk: {e}")))?;

    if let Some(error) = chunk.error {
        return Err(CompletionError::ProviderError(error));
    }

    if let Some(fragment) = chunk.response {
        text.push_str(&fragment);
    }
    if let Some(message) = chunk.message {
        text.push_str(&message.content);
    }

    Ok(chunk.done)
}

/// Splits a byte stream into newline-terminated lines across chunk boundaries
#[derive(Default)]
struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    fn push(&mut self, bytes: &[u8]) -> Vec<Vec<u8>> {
        self.pending.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
            line.pop();
            lines.push(line);
        }
        lines
    }

    fn finish(&mut self) -> Option<Vec<u8>> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }
}
