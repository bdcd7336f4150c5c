//! Generation backends and prompt assembly
//!
//! Every provider implements [`GenerationBackend`]; the rest of the crate
//! never learns which one is active.

pub mod claude;
pub mod ollama;
pub mod openai;
pub mod prompt;
pub mod router;

use async_trait::async_trait;
use thiserror::Error;

pub use prompt::Prompt;

/// Per-request model settings
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParameters {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

/// A command ready for delivery: trimmed and never empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCommand {
    pub command: String,
    pub provider: String,
}

/// Coarse failure classes shared by every provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    MissingCredential,
    TransportFailure,
    EmptyResponse,
}

#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("{provider} needs a credential: set {credential} or add api_key to the config")]
    MissingCredential { provider: String, credential: String },

    #[error("{provider} request failed: {message}")]
    TransportFailure { provider: String, message: String },

    #[error("{provider} returned an empty command")]
    EmptyResponse { provider: String },
}

impl GenerationError {
    pub fn kind(&self) -> FailureKind {
        match self {
            GenerationError::MissingCredential { .. } => FailureKind::MissingCredential,
            GenerationError::TransportFailure { .. } => FailureKind::TransportFailure,
            GenerationError::EmptyResponse { .. } => FailureKind::EmptyResponse,
        }
    }

    pub(crate) fn transport(provider: &str, message: impl Into<String>) -> Self {
        GenerationError::TransportFailure {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}

/// A language-model provider that turns a prompt into a command
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Human-readable provider name, e.g. "claude"
    fn name(&self) -> &str;

    /// Send the prompt and return the text of the first content block.
    async fn complete(
        &self,
        prompt: &Prompt,
        params: &ModelParameters,
    ) -> Result<String, GenerationError>;

    /// Complete the prompt and normalise the answer into a deliverable command.
    async fn generate(
        &self,
        prompt: &Prompt,
        params: &ModelParameters,
    ) -> Result<GeneratedCommand, GenerationError> {
        let text = self.complete(prompt, params).await?;
        let command = clean_command(&text);

        if command.is_empty() {
            return Err(GenerationError::EmptyResponse {
                provider: self.name().to_string(),
            });
        }

        Ok(GeneratedCommand {
            command,
            provider: self.name().to_string(),
        })
    }
}

/// Trim the answer and unwrap a markdown code fence if the model added one
pub fn clean_command(response: &str) -> String {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        if let Some(first_newline) = trimmed.find('\n') {
            let rest = &trimmed[first_newline + 1..];
            if let Some(end_pos) = rest.rfind("```") {
                return rest[..end_pos].trim().to_string();
            }
        }
        return trimmed.trim_matches('`').trim().to_string();
    }

    trimmed.to_string()
}

/// Backend that replays canned answers, for tests
#[cfg(test)]
pub(crate) struct ScriptedBackend {
    pub answer: Result<String, GenerationError>,
    pub calls: std::sync::Arc<std::sync::atomic::AtomicUsize>,
    pub last_prompt: std::sync::Arc<std::sync::Mutex<Option<Prompt>>>,
}

#[cfg(test)]
impl ScriptedBackend {
    pub fn answering(answer: &str) -> Self {
        Self::with_result(Ok(answer.to_string()))
    }

    pub fn with_result(answer: Result<String, GenerationError>) -> Self {
        Self {
            answer,
            calls: Default::default(),
            last_prompt: Default::default(),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl GenerationBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        prompt: &Prompt,
        _params: &ModelParameters,
    ) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.clone());
        self.answer.clone()
    }
}
