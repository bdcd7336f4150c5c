//! Provider selection
//!
//! Exactly one backend is active per session, chosen from configuration.

use anyhow::Result;

use super::claude::ClaudeClient;
use super::ollama::OllamaClient;
use super::openai::OpenAiClient;
use super::{GenerationBackend, ModelParameters};
use crate::config::Config;

/// Providers the router knows how to build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Claude,
    OpenAi,
    Ollama,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [ProviderKind::Claude, ProviderKind::OpenAi, ProviderKind::Ollama];

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "claude" | "anthropic" => Some(ProviderKind::Claude),
            "openai" | "gpt" => Some(ProviderKind::OpenAi),
            "ollama" | "local" => Some(ProviderKind::Ollama),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::Claude => "claude",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Ollama => "ollama",
        }
    }
}

/// The provider named by `ai.provider`
pub fn active_provider(config: &Config) -> Result<ProviderKind> {
    ProviderKind::from_name(&config.ai.provider).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown provider '{}'. Supported: claude, openai, ollama",
            config.ai.provider
        )
    })
}

/// Build the configured backend together with its model parameters
pub fn select_backend(config: &Config) -> Result<(Box<dyn GenerationBackend>, ModelParameters)> {
    let kind = active_provider(config)?;
    let providers = &config.ai.providers;

    let backend: Box<dyn GenerationBackend> = match kind {
        ProviderKind::Claude => Box::new(ClaudeClient::from_config(&providers.claude)?),
        ProviderKind::OpenAi => Box::new(OpenAiClient::from_config(&providers.openai)?),
        ProviderKind::Ollama => Box::new(OllamaClient::from_config(&providers.ollama)?),
    };

    let (model, temperature) = match kind {
        ProviderKind::Claude => (providers.claude.model.clone(), providers.claude.temperature),
        ProviderKind::OpenAi => (providers.openai.model.clone(), providers.openai.temperature),
        ProviderKind::Ollama => (providers.ollama.model.clone(), providers.ollama.temperature),
    };

    tracing::debug!(provider = kind.name(), model = %model, "Selected generation backend");

    let params = ModelParameters {
        model,
        max_tokens: config.ai.max_tokens,
        temperature,
    };
    Ok((backend, params))
}

/// Whether the provider has the credential it needs
pub fn is_configured(config: &Config, kind: ProviderKind) -> bool {
    match kind {
        ProviderKind::Claude => config.ai.providers.claude.credential().is_some(),
        ProviderKind::OpenAi => config.ai.providers.openai.credential().is_some(),
        ProviderKind::Ollama => true,
    }
}
