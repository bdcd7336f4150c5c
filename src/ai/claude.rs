//! Claude API backend
//!
//! Implements the Anthropic Messages API. Only the first content block of
//! the answer is used.

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{GenerationBackend, GenerationError, ModelParameters, Prompt};
use crate::config::ProviderConfig;

const CLAUDE_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const REQUEST_TIMEOUT_SECS: u64 = 60;
const PROVIDER: &str = "claude";

/// Claude API Client
pub struct ClaudeClient {
    client: Client,
    api_key: Option<String>,
    api_key_env: String,
    url: String,
}

/// Message role in conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Role {
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Message {
    role: Role,
    content: String,
}

/// Request body for Claude API
#[derive(Debug, Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message>,
    system: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Response from Claude API
#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

/// Error response from Claude API
#[derive(Debug, Deserialize)]
struct ClaudeError {
    error: ErrorDetails,
}

#[derive(Debug, Deserialize)]
struct ErrorDetails {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
}

impl ClaudeClient {
    /// Create a new Claude client
    pub fn new(api_key: Option<String>) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| GenerationError::transport(PROVIDER, format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            url: CLAUDE_API_URL.to_string(),
        })
    }

    /// Create a client from the provider section of the config
    pub fn from_config(config: &ProviderConfig) -> Result<Self, GenerationError> {
        let mut client = Self::new(config.credential())?;
        client.api_key_env = config.api_key_env.clone();
        if let Some(endpoint) = &config.endpoint {
            client.url = endpoint.trim_end_matches('/').to_string();
        }
        Ok(client)
    }
}

#[async_trait]
impl GenerationBackend for ClaudeClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn complete(
        &self,
        prompt: &Prompt,
        params: &ModelParameters,
    ) -> Result<String, GenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GenerationError::MissingCredential {
                provider: PROVIDER.to_string(),
                credential: self.api_key_env.clone(),
            })?;

        let request = ClaudeRequest {
            model: &params.model,
            max_tokens: params.max_tokens,
            messages: vec![Message {
                role: Role::User,
                content: prompt.user.clone(),
            }],
            system: prompt.system,
            temperature: params.temperature,
        };

        debug!(model = %params.model, "Sending request to Claude");

        let response = self
            .client
            .post(&self.url)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::transport(PROVIDER, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::transport(PROVIDER, e.to_string()))?;

        if !status.is_success() {
            return Err(error_from_body(status, &body));
        }

        first_text(&body)
    }
}

fn error_from_body(status: reqwest::StatusCode, body: &str) -> GenerationError {
    let message = match serde_json::from_str::<ClaudeError>(body) {
        Ok(claude_error) => format!(
            "HTTP {} ({}): {}",
            status.as_u16(),
            claude_error.error.error_type,
            claude_error.error.message
        ),
        Err(_) => format!("HTTP {}: {}", status.as_u16(), body),
    };
    GenerationError::transport(PROVIDER, message)
}

/// Text of the first content block; an empty string when it carries none
fn first_text(body: &str) -> Result<String, GenerationError> {
    let response: ClaudeResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::transport(PROVIDER, format!("unreadable response: {e}")))?;

    Ok(response
        .content
        .into_iter()
        .next()
        .filter(|block| block.block_type == "text")
        .and_then(|block| block.text)
        .unwrap_or_default())
}
