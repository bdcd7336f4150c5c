//! OpenAI-compatible backend
//!
//! Talks to `/chat/completions`, so it also works with any endpoint that
//! mirrors the OpenAI API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{GenerationBackend, GenerationError, ModelParameters, Prompt};
use crate::config::ProviderConfig;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const REQUEST_TIMEOUT_SECS: u64 = 60;
const PROVIDER: &str = "openai";

pub struct OpenAiClient {
    client: Client,
    api_key: Option<String>,
    api_key_env: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetails,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetails {
    message: String,
}

impl OpenAiClient {
    pub fn new(api_key: Option<String>, base_url: &str) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| GenerationError::transport(PROVIDER, format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self, GenerationError> {
        let base_url = config.endpoint.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let mut client = Self::new(config.credential(), base_url)?;
        client.api_key_env = config.api_key_env.clone();
        Ok(client)
    }
}

#[async_trait]
impl GenerationBackend for OpenAiClient {
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

        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &params.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        };

        debug!(model = %params.model, url = %url, "Sending request to OpenAI");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
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
            let detail = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(GenerationError::transport(
                PROVIDER,
                format!("HTTP {}: {}", status.as_u16(), detail),
            ));
        }

        first_choice(&body)
    }
}

fn first_choice(body: &str) -> Result<String, GenerationError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::transport(PROVIDER, format!("unreadable response: {e}")))?;

    Ok(response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .unwrap_or_default())
}
