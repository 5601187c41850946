//! Chat-completion provider adapter.
//!
//! Requests are sent in the OpenAI chat-completions shape and only
//! `choices[0].message.content` of the answer is read.

use async_trait::async_trait;
use language_utils::text_cleanup::strip_code_fences;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, temperature: f32) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature,
        }
    }

    pub fn system(mut self, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage {
            role: "system".to_string(),
            content: content.into(),
        });
        self
    }

    pub fn user(mut self, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage {
            role: "user".to_string(),
            content: content.into(),
        });
        self
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Completion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Completion provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Completion provider returned no message content")]
    EmptyContent,
}

/// The answer text could not be parsed as the expected JSON.
#[derive(Debug, thiserror::Error)]
#[error("Failed to parse completion as JSON: {source}")]
pub struct ContentParseError {
    #[source]
    pub source: serde_json::Error,
    pub raw: String,
}

/// Parse a completion answer as strict JSON, tolerating a Markdown code fence around it.
pub fn parse_json_content<T: DeserializeOwned>(content: &str) -> Result<T, ContentParseError> {
    serde_json::from_str(strip_code_fences(content)).map_err(|source| ContentParseError {
        source,
        raw: content.to_string(),
    })
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send `request` and return the text of the first choice.
    async fn complete(&self, request: ChatRequest) -> Result<String, ProviderError>;
}

pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    async fn complete(&self, request: ChatRequest) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            log::error!("Completion provider returned {status}: {body}");
            return Err(ProviderError::Status { status, body });
        }

        let response: ChatResponse = response.json().await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ProviderError::EmptyContent)
    }
}
