// AI Provider Service
// Shared HTTP client, provider errors and credential lookup

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::time::{Duration, Instant};
use thiserror::Error;

use super::config_store::AppConfig;

pub const OPENAI_DEFAULT_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("Missing field in response: {0}")]
    MissingField(&'static str),
    #[error("JSON parse error: {0}")]
    JsonError(String),
    #[error("API key not configured")]
    MissingApiKey,
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: i32,
    temperature: f64,
    response_format: ResponseFormat,
}

#[derive(Debug, Clone, Serialize)]
struct ResponseFormat {
    r#type: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessageResponse>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResult {
    pub content: String,
    pub latency_ms: u64,
}

/// A decoded JSON body and how long the round trip took.
#[derive(Debug, Clone)]
pub struct JsonReply {
    pub body: Value,
    pub latency_ms: u64,
}

#[derive(Clone)]
pub struct ProviderClient {
    client: Client,
}

impl Default for ProviderClient {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl ProviderClient {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { client }
    }

    pub fn http(&self) -> &Client {
        &self.client
    }

    /// POST a JSON body with extra headers; non-2xx statuses become `ApiError`.
    pub async fn post_json(
        &self,
        url: &str,
        headers: &[(&'static str, String)],
        body: &Value,
    ) -> Result<JsonReply, ProviderError> {
        let mut request = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(body);
        for (name, value) in headers {
            request = request.header(*name, value);
        }

        let start = Instant::now();
        let response = request.send().await?;
        let latency_ms = start.elapsed().as_millis() as u64;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::JsonError(e.to_string()))?;

        Ok(JsonReply { body, latency_ms })
    }

    /// OpenAI-compatible chat completion forced into JSON-object mode.
    pub async fn call_openai_chat(
        &self,
        url: &str,
        model: &str,
        api_key: &str,
        system: &str,
        user: &str,
        max_tokens: i32,
    ) -> Result<ChatResult, ProviderError> {
        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            max_tokens,
            temperature: 0.0,
            response_format: ResponseFormat {
                r#type: "json_object".to_string(),
            },
        };
        let body = serde_json::to_value(&request).map_err(|e| ProviderError::JsonError(e.to_string()))?;

        let reply = self
            .post_json(url, &[("Authorization", format!("Bearer {}", api_key))], &body)
            .await?;

        let data: ChatResponse =
            serde_json::from_value(reply.body).map_err(|e| ProviderError::JsonError(e.to_string()))?;

        let content = data
            .choices
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or(ProviderError::MissingField("choices[0].message.content"))?;

        Ok(ChatResult {
            content,
            latency_ms: reply.latency_ms,
        })
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Look up a credential: `NAME`, then `CONTENTGUARD_NAME`, then the config file's `apiKeys[config_key]`.
pub fn get_credential(env_name: &str, config_key: &str, config: &AppConfig) -> Option<String> {
    non_empty_env(env_name)
        .or_else(|| non_empty_env(&format!("CONTENTGUARD_{}", env_name)))
        .or_else(|| {
            config
                .api_keys
                .get(config_key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        })
}

/// API key for a provider id such as `zerogpt` or `openai`.
pub fn get_api_key(provider: &str, config: &AppConfig) -> Option<String> {
    let env_name = format!("{}_API_KEY", provider.to_uppercase());
    get_credential(&env_name, provider, config)
}

/// Pull the first `{...}` object out of a model reply.
pub fn extract_json(content: &str) -> Result<&str, ProviderError> {
    let trimmed = content.trim();
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if end > start => Ok(&trimmed[start..=end]),
        _ => Err(ProviderError::JsonError("No JSON in response".to_string())),
    }
}
