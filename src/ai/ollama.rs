//! Ollama backend - local models
//!
//! No API key needed; the model runs on the user's machine.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{GenerationBackend, GenerationError, ModelParameters, Prompt};
use crate::config::LocalProviderConfig;

/// Local inference can be slow on first load
const REQUEST_TIMEOUT_SECS: u64 = 300;

const PROVIDER: &str = "ollama";

const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Request for chat completion
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
    options: ModelOptions,
}

/// Chat message
#[derive(Debug, Serialize, Deserialize, Clone)]
struct Message {
    role: String,
    content: String,
}

/// Model options
#[derive(Debug, Serialize)]
struct ModelOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    num_predict: u32,
}

/// Chat response
#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Message,
}

/// Ollama client for local inference
pub struct OllamaClient {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaClient {
    pub fn with_url(url: &str) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| GenerationError::transport(PROVIDER, format!("HTTP client: {e}")))?;

        Ok(Self {
            base_url: url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &LocalProviderConfig) -> Result<Self, GenerationError> {
        let url = resolve_endpoint(config.endpoint.as_deref(), std::env::var("OLLAMA_HOST").ok());
        Self::with_url(&url)
    }
}

/// Configured endpoint, then `OLLAMA_HOST`, then the local default
fn resolve_endpoint(configured: Option<&str>, ollama_host: Option<String>) -> String {
    if let Some(endpoint) = configured {
        return endpoint.to_string();
    }
    match ollama_host.filter(|host| !host.trim().is_empty()) {
        Some(host) if host.starts_with("http") => host,
        Some(host) => format!("http://{}", host),
        None => DEFAULT_ENDPOINT.to_string(),
    }
}

fn parse_response(status: reqwest::StatusCode, body: &str) -> Result<String, GenerationError> {
    if !status.is_success() {
        return Err(GenerationError::transport(
            PROVIDER,
            format!("HTTP {}: {}", status.as_u16(), body),
        ));
    }

    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::transport(PROVIDER, format!("unreadable response: {e}")))?;
    Ok(response.message.content)
}

fn chat_request(prompt: &Prompt, params: &ModelParameters) -> ChatRequest {
    ChatRequest {
        model: params.model.clone(),
        messages: vec![
            Message {
                role: "system".to_string(),
                content: prompt.system.to_string(),
            },
            Message {
                role: "user".to_string(),
                content: prompt.user.clone(),
            },
        ],
        stream: false,
        options: ModelOptions {
            temperature: params.temperature,
            num_predict: params.max_tokens,
        },
    }
}

#[async_trait]
impl GenerationBackend for OllamaClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn complete(
        &self,
        prompt: &Prompt,
        params: &ModelParameters,
    ) -> Result<String, GenerationError> {
        let url = format!("{}/api/chat", self.base_url);

        debug!(model = %params.model, url = %url, "Sending request to Ollama");

        let response = self
            .client
            .post(&url)
            .json(&chat_request(prompt, params))
            .send()
            .await
            .map_err(|e| {
                GenerationError::transport(PROVIDER, format!("{e} (is Ollama running?)"))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::transport(PROVIDER, e.to_string()))?;

        parse_response(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FilteredContext;

    use crate::ai::FailureKind;
    use reqwest::StatusCode;

    #[test]
    fn test_endpoint_precedence() {
        assert_eq!(resolve_endpoint(None, None), "http://localhost:11434");
        assert_eq!(resolve_endpoint(None, Some("gpu-box:11434".to_string())), "http://gpu-box:11434");
        assert_eq!(
            resolve_endpoint(None, Some("https://ollama.internal".to_string())),
            "https://ollama.internal"
        );
        assert_eq!(
            resolve_endpoint(Some("http://configured:11434"), Some("gpu-box:11434".to_string())),
            "http://configured:11434"
        );
        assert_eq!(resolve_endpoint(None, Some("  ".to_string())), "http://localhost:11434");
    }

    #[test]
    fn test_with_url_trims_slash() {
        let client = OllamaClient::with_url("http://gpu-box:11434/").unwrap();
        assert_eq!(client.base_url, "http://gpu-box:11434");
    }

    #[test]
    fn test_request_disables_streaming_and_caps_output() {
        let prompt = crate::ai::prompt::assemble("free disk", &FilteredContext::default());
        let params = ModelParameters {
            model: "codellama".to_string(),
            max_tokens: 200,
            temperature: None,
        };

        let json = serde_json::to_value(chat_request(&prompt, &params)).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 200);
        assert!(json["options"].get("temperature").is_none());
        assert_eq!(json["messages"][1]["content"], "Request: free disk");
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{"model":"codellama","message":{"role":"assistant","content":"ps aux"},"done":true}"#;
        assert_eq!(parse_response(StatusCode::OK, body).unwrap(), "ps aux");
    }

    #[test]
    fn test_error_status_is_transport_failure() {
        let err = parse_response(StatusCode::NOT_FOUND, r#"{"error":"model 'codellama' not found"}"#)
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::TransportFailure);
        assert!(err.to_string().contains("HTTP 404"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_unreadable_body_is_transport_failure() {
        let err = parse_response(StatusCode::OK, "<html>proxy error</html>").unwrap_err();
        assert_eq!(err.kind(), FailureKind::TransportFailure);
    }
}
