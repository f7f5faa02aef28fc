use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::NarratorConfig;
use crate::errors::LlmError;

const SYSTEM_PROMPT: &str = "You are the royal chronicler of a fantasy kingdom whose fortunes follow the stock market. Answer with a single vivid sentence.";

/// One interchangeable text-generation backend in the model roster
#[async_trait]
pub trait TextBackend: Send + Sync {
    /// Identifier reported as the narrative source
    fn id(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

/// OpenAI API request/response structures
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// A single model behind an OpenAI-compatible chat-completions endpoint
pub struct OpenAiCompatibleBackend {
    client: Client,
    api_key: Arc<str>,
    base_url: Arc<str>,
    model: String,
    max_tokens: usize,
    temperature: f32,
}

impl OpenAiCompatibleBackend {
    pub fn new(
        client: Client,
        api_key: Arc<str>,
        base_url: Arc<str>,
        model: String,
        max_tokens: usize,
        temperature: f32,
    ) -> Self {
        Self {
            client,
            api_key,
            base_url,
            model,
            max_tokens,
            temperature,
        }
    }
}

#[async_trait]
impl TextBackend for OpenAiCompatibleBackend {
    fn id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        debug!("Requesting completion from {}", self.model);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: prompt },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&*self.base_url)
            .bearer_auth(&*self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited);
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::ApiError(format!("HTTP {}: {}", status, error_text)));
        }

        let body = response
            .json::<ChatResponse>()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(LlmError::EmptyCompletion)
    }
}

/// One backend per roster model, sharing a single HTTP client.
/// Empty when no credential is configured.
pub fn build_roster(config: &NarratorConfig) -> Result<Vec<Arc<dyn TextBackend>>, LlmError> {
    let Some(api_key) = config.api_key.as_deref() else {
        return Ok(Vec::new());
    };

    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| LlmError::NetworkError(e.to_string()))?;

    let api_key: Arc<str> = Arc::from(api_key);
    let base_url: Arc<str> = Arc::from(config.base_url.as_str());

    let roster = config
        .models
        .iter()
        .map(|model| {
            Arc::new(OpenAiCompatibleBackend::new(
                client.clone(),
                api_key.clone(),
                base_url.clone(),
                model.clone(),
                config.max_tokens,
                config.temperature,
            )) as Arc<dyn TextBackend>
        })
        .collect();

    Ok(roster)
}
