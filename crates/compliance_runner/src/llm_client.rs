use std::collections::VecDeque;
use std::time::Duration;

use compliance_context::PromptPair;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LlmMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub messages: Vec<LlmMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl LlmRequest {
    /// System + user messages for one prompt pair.
    pub fn from_prompt(prompt: &PromptPair, max_tokens: u32, timeout: Duration) -> Self {
        Self {
            messages: vec![
                LlmMessage {
                    role: "system".to_string(),
                    content: prompt.system_prompt.clone(),
                },
                LlmMessage {
                    role: "user".to_string(),
                    content: prompt.user_content.clone(),
                },
            ],
            temperature: prompt.temperature,
            max_tokens,
            timeout,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub total_tokens: Option<u64>,
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("http error: {0}")]
    Http(String),
    #[error("openai error: {0}")]
    OpenAi(String),
    #[error("empty response")]
    EmptyResponse,
    #[error("mock responses exhausted")]
    MockExhausted,
}

pub struct OpenAiClient {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: String, base_url: String) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| LlmError::Http(e.to_string()))?;
        Ok(Self {
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        let body = OpenAiRequest {
            model: self.model.clone(),
            messages: req.messages,
            temperature: req.temperature,
            max_tokens: req.max_tokens,
        };
        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .timeout(req.timeout)
            .send()
            .await
            .map_err(|e| LlmError::Http(e.to_string()))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(LlmError::OpenAi(format!("{status} {text}")));
        }
        let parsed: OpenAiResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Http(e.to_string()))?;
        let total_tokens = parsed.usage.map(|u| u.total_tokens);
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)?;
        Ok(LlmResponse {
            content,
            total_tokens,
        })
    }
}

/// Scripted client for tests: replays `responses` in order and keeps every
/// request it was given.
pub struct MockLlm {
    responses: Mutex<VecDeque<String>>,
    seen: Mutex<Vec<LlmRequest>>,
}

impl MockLlm {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        self.seen.lock().await.push(req);
        let mut guard = self.responses.lock().await;
        let content = guard.pop_front().ok_or(LlmError::MockExhausted)?;
        Ok(LlmResponse {
            content,
            total_tokens: None,
        })
    }

    pub async fn requests(&self) -> Vec<LlmRequest> {
        self.seen.lock().await.clone()
    }
}

pub enum LlmClient {
    OpenAi(OpenAiClient),
    Mock(MockLlm),
}

impl LlmClient {
    pub async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        match self {
            LlmClient::OpenAi(client) => client.complete(req).await,
            LlmClient::Mock(client) => client.complete(req).await,
        }
    }

    pub fn model_name(&self) -> &str {
        match self {
            LlmClient::OpenAi(client) => client.model(),
            LlmClient::Mock(_) => "mock",
        }
    }
}

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<LlmMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    total_tokens: u64,
}
