use std::env;

use serde::{Deserialize, Serialize};

pub const PLACEHOLDER_API_KEY: &str = "YOUR_AZURE_OPENAI_API_KEY";
pub const PLACEHOLDER_ENDPOINT: &str = "https://YOUR_RESOURCE_NAME.openai.azure.com/";
pub const PLACEHOLDER_DEPLOYMENT: &str = "YOUR_DEPLOYMENT_NAME";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Ollama-compatible server on this machine
    Local,
    /// Azure OpenAI deployment
    Cloud,
}

fn default_provider() -> Provider {
    match env::var("FIXIT_PROVIDER").as_deref() {
        Ok("cloud") => Provider::Cloud,
        _ => Provider::Local,
    }
}

fn default_max_tokens() -> u32 {
    256
}

fn default_timeout_secs() -> u64 {
    60
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CompletionConfig {
    #[serde(default = "default_provider")]
    pub provider: Provider,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    pub local: LocalBackendConfig,
    pub cloud: CloudBackendConfig,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            max_tokens: default_max_tokens(),
            local: LocalBackendConfig::default(),
            cloud: CloudBackendConfig::default(),
        }
    }
}

fn default_local_url() -> String {
    env::var("OLLAMA_URL").unwrap_or_else(|_| "http://localhost:11434".to_string())
}

fn default_local_model() -> String {
    env::var("OLLAMA_MODEL").unwrap_or_else(|_| "mistral".to_string())
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LocalBackendConfig {
    #[serde(default = "default_local_url")]
    pub base_url: String,
    #[serde(default = "default_local_model")]
    pub model: String,
    /// Upper bound for the whole streamed exchange
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LocalBackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_local_url(),
            model: default_local_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_key() -> String {
    env::var("AZURE_OPENAI_API_KEY").unwrap_or_else(|_| PLACEHOLDER_API_KEY.to_string())
}

fn default_endpoint() -> String {
    env::var("AZURE_OPENAI_ENDPOINT").unwrap_or_else(|_| PLACEHOLDER_ENDPOINT.to_string())
}

fn default_api_version() -> String {
    env::var("AZURE_OPENAI_API_VERSION").unwrap_or_else(|_| "2024-02-15-preview".to_string())
}

fn default_deployment() -> String {
    env::var("AZURE_OPENAI_DEPLOYMENT").unwrap_or_else(|_| PLACEHOLDER_DEPLOYMENT.to_string())
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CloudBackendConfig {
    #[serde(default = "default_api_key")]
    pub api_key: String,
    /// Resource URL, e.g. `https://<resource>.openai.azure.com/`
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Deployed model name
    #[serde(default = "default_deployment")]
    pub deployment: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CloudBackendConfig {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
            endpoint: default_endpoint(),
            api_version: default_api_version(),
            deployment: default_deployment(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_is_lowercase_in_json() {
        let json = serde_json::to_string(&Provider::Cloud).unwrap();
        assert_eq!(json, "\"cloud\"");

        let provider: Provider = serde_json::from_str("\"local\"").unwrap();
        assert_eq!(provider, Provider::Local);
    }

    #[test]
    fn test_cloud_section_overrides() {
        let json = r#"{
            "provider": "cloud",
            "cloud": { "api_key": "k", "endpoint": "https://x.openai.azure.com/", "deployment": "gpt" }
        }"#;
        let config: CompletionConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.provider, Provider::Cloud);
        assert_eq!(config.cloud.api_key, "k");
        assert_eq!(config.cloud.deployment, "gpt");
        assert_eq!(config.cloud.timeout_secs, 60);
    }
}
