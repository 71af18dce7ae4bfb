//! Generation Provider
//!
//! Client for the external generative API. One call per slot: send the prompt as a
//! chat-style message list, pull the completion text out of the response envelope and
//! parse it into a `ParsedResult`. Retry policy belongs to the scheduler.

use crate::error::EngineError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::debug;

pub mod extract;
pub mod response;

pub use extract::parse_completion;
pub use response::{ParsedProduct, ParsedRecommendation, ParsedResult};

pub const DEFAULT_ENDPOINT: &str =
    "https://dashscope.aliyuncs.com/api/v1/services/aigc/text-generation/generation";

/// Chat message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

/// Generation provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider label recorded in result provenance
    #[serde(default = "default_provider_name")]
    pub provider_name: String,

    /// Bearer credential. Absence fails every generation call, not the process.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Whole-request timeout. Unset means the transport default (no timeout).
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_provider_name() -> String {
    "qwen".to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    "qwen-max".to_string()
}

fn default_temperature() -> f32 {
    0.8
}

fn default_max_tokens() -> u32 {
    2000
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_name: default_provider_name(),
            api_key: None,
            endpoint: default_endpoint(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: None,
        }
    }
}

impl ProviderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("Model name cannot be empty".to_string());
        }
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(format!(
                "Endpoint must be an http(s) URL, got '{}'",
                self.endpoint
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "Temperature must be within 0.0-2.0, got {}",
                self.temperature
            ));
        }
        Ok(())
    }

    /// Credential with blank values treated as absent.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// Generation client trait
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Generate and parse a result for one prompt.
    async fn generate(&self, prompt: &str) -> Result<ParsedResult, EngineError>;

    /// Provider label recorded in provenance
    fn provider_name(&self) -> &str;

    /// Model name recorded in provenance
    fn model_name(&self) -> &str;
}

#[derive(Serialize)]
struct GenerationRequest<'a> {
    model: &'a str,
    input: GenerationInput,
    parameters: GenerationParameters,
}

#[derive(Serialize)]
struct GenerationInput {
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct GenerationParameters {
    temperature: f32,
    max_tokens: u32,
    result_format: &'static str,
}

const PROVIDER_HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const ERROR_BODY_EXCERPT_CHARS: usize = 200;

fn build_provider_http_client(config: &ProviderConfig) -> Result<Client, EngineError> {
    let mut builder = Client::builder().connect_timeout(PROVIDER_HTTP_CONNECT_TIMEOUT);
    if let Some(secs) = config.request_timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder
        .build()
        .map_err(|e| EngineError::Config(format!("Failed to create HTTP client: {}", e)))
}

// Helper function to map HTTP errors to EngineError
fn map_http_error(error: reqwest::Error) -> EngineError {
    if error.is_timeout() {
        EngineError::Transport(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        EngineError::Transport(format!("Connection error: {}", error))
    } else {
        EngineError::Transport(format!("HTTP error: {}", error))
    }
}

/// Pull the completion text out of a provider envelope.
///
/// Every level of `output.choices[0].message.content` may be missing. `output.text`
/// (plain result format) and OpenAI-style top-level `choices` are accepted as well.
pub fn completion_text(envelope: &Value) -> Option<String> {
    [
        "/output/choices/0/message/content",
        "/output/text",
        "/choices/0/message/content",
    ]
    .iter()
    .filter_map(|pointer| envelope.pointer(pointer))
    .filter_map(Value::as_str)
    .map(str::trim)
    .find(|text| !text.is_empty())
    .map(str::to_string)
}

/// DashScope (Qwen) text-generation client.
pub struct DashScopeClient {
    client: Client,
    config: ProviderConfig,
}

impl DashScopeClient {
    pub fn new(config: ProviderConfig) -> Result<Self, EngineError> {
        let client = build_provider_http_client(&config)?;
        Ok(Self { client, config })
    }

    fn messages(prompt: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage {
                role: MessageRole::System,
                content: crate::prompt::SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: MessageRole::User,
                content: prompt.to_string(),
            },
        ]
    }
}

#[async_trait]
impl GenerationClient for DashScopeClient {
    async fn generate(&self, prompt: &str) -> Result<ParsedResult, EngineError> {
        let api_key = self.config.credential().ok_or_else(|| {
            EngineError::Config(
                "No provider credential configured (provider.api_key or QWEN_API_KEY)"
                    .to_string(),
            )
        })?;

        let request = GenerationRequest {
            model: &self.config.model,
            input: GenerationInput {
                messages: Self::messages(prompt),
            },
            parameters: GenerationParameters {
                temperature: self.config.temperature,
                max_tokens: self.config.max_tokens,
                result_format: "message",
            },
        };

        let start = Instant::now();
        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(map_http_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let excerpt: String = error_text.chars().take(ERROR_BODY_EXCERPT_CHARS).collect();
            return Err(EngineError::Transport(format!(
                "Request failed with status {}: {}",
                status, excerpt
            )));
        }

        let body = response.text().await.map_err(map_http_error)?;
        let envelope: Value = serde_json::from_str(&body).map_err(|e| {
            EngineError::MalformedResponse(format!("Response envelope is not JSON: {}", e))
        })?;
        let content = completion_text(&envelope).ok_or(EngineError::EmptyResponse)?;

        debug!(
            model = %self.config.model,
            duration_ms = start.elapsed().as_millis(),
            response_chars = content.chars().count(),
            "Provider response received"
        );

        parse_completion(&content)
    }

    fn provider_name(&self) -> &str {
        &self.config.provider_name
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
