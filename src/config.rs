//! Configuration management for cmd-forge

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ai: AiConfig,
    pub context: ContextConfig,
    #[serde(skip)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Active provider: claude, openai or ollama
    pub provider: String,
    /// Output cap sent with every generation request
    pub max_tokens: u32,
    pub providers: AiProviders,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiProviders {
    pub claude: ProviderConfig,
    pub openai: ProviderConfig,
    pub ollama: LocalProviderConfig,
}

/// A hosted provider. Fields left out of the user's table fall back to that
/// provider's defaults (see [`AiProviders::fill_defaults`]).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub api_key_env: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalProviderConfig {
    pub model: String,
    /// Takes precedence over `OLLAMA_HOST`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Which ambient signals are collected and forwarded
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    pub enabled: bool,
    /// Selections with this many characters or more are dropped
    pub selection_limit: usize,
    /// Applications worth naming to the model
    pub developer_apps: Vec<String>,
    /// Applications whose working directory can be probed
    pub terminals: Vec<String>,
}

impl ProviderConfig {
    /// Resolve the credential: inline key first, then the named environment variable.
    pub fn credential(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: "claude".to_string(),
            max_tokens: 256,
            providers: AiProviders::default(),
        }
    }
}

impl Default for AiProviders {
    fn default() -> Self {
        Self {
            claude: ProviderConfig {
                api_key_env: "ANTHROPIC_API_KEY".to_string(),
                api_key: None,
                model: "claude-sonnet-4-20250514".to_string(),
                temperature: Some(0.2),
                endpoint: None,
            },
            openai: ProviderConfig {
                api_key_env: "OPENAI_API_KEY".to_string(),
                api_key: None,
                model: "gpt-4o-mini".to_string(),
                temperature: Some(0.2),
                endpoint: Some("https://api.openai.com/v1".to_string()),
            },
            ollama: LocalProviderConfig::default(),
        }
    }
}

impl Default for LocalProviderConfig {
    fn default() -> Self {
        Self {
            model: "codellama".to_string(),
            endpoint: None,
            temperature: Some(0.2),
        }
    }
}

impl AiProviders {
    /// Complete partially written provider tables
    fn fill_defaults(&mut self) {
        let defaults = AiProviders::default();
        self.claude.fill_blanks(defaults.claude);
        self.openai.fill_blanks(defaults.openai);
    }
}

impl ProviderConfig {
    fn fill_blanks(&mut self, defaults: ProviderConfig) {
        if self.api_key_env.is_empty() {
            self.api_key_env = defaults.api_key_env;
        }
        if self.model.is_empty() {
            self.model = defaults.model;
        }
        if self.temperature.is_none() {
            self.temperature = defaults.temperature;
        }
        if self.endpoint.is_none() {
            self.endpoint = defaults.endpoint;
        }
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        let developer_apps = [
            "Terminal",
            "iTerm2",
            "Warp",
            "Alacritty",
            "kitty",
            "WezTerm",
            "Hyper",
            "Ghostty",
            "Visual Studio Code",
            "Code",
            "Cursor",
            "Zed",
            "Xcode",
            "Sublime Text",
            "Nova",
            "IntelliJ IDEA",
            "PyCharm",
            "WebStorm",
            "GoLand",
            "RustRover",
            "CLion",
            "Android Studio",
        ];
        let terminals = [
            "Terminal", "iTerm2", "Warp", "Alacritty", "kitty", "WezTerm", "Hyper", "Ghostty",
        ];

        Self {
            enabled: true,
            selection_limit: 2000,
            developer_apps: developer_apps.iter().map(|s| s.to_string()).collect(),
            terminals: terminals.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "cmdforge", "cmdforge")
        .context("Failed to determine home directory")
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.toml"))
}

impl Config {
    /// Directory holding persisted history
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(project_dirs()?.data_dir().to_path_buf()),
        }
    }
}

/// Load configuration from file or use defaults
pub fn load_config(custom_path: Option<&str>) -> Result<Config> {
    let path = if let Some(p) = custom_path {
        PathBuf::from(p)
    } else {
        config_path()?
    };

    if path.exists() {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        parse_config(&content).with_context(|| format!("Failed to parse config from {:?}", path))
    } else {
        Ok(Config::default())
    }
}

fn parse_config(content: &str) -> Result<Config> {
    let mut config: Config = toml::from_str(content)?;
    config.ai.providers.fill_defaults();
    Ok(config)
}

/// Initialize configuration file with defaults
pub fn init_config() -> Result<()> {
    let path = config_path()?;

    if path.exists() {
        eprintln!("Configuration file already exists at {:?}", path);
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {:?}", parent))?;
    }

    let content = toml::to_string_pretty(&Config::default())
        .context("Failed to serialize default config")?;

    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write config to {:?}", path))?;

    eprintln!("Configuration initialized at {:?}", path);
    Ok(())
}

/// Show current configuration
pub fn show_config(config: &Config) -> Result<()> {
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    println!("{}", content);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = parse_config(
            r#"
            [ai]
            provider = "ollama"

            [context]
            selection_limit = 500
            "#,
        )
        .unwrap();

        assert_eq!(config.ai.provider, "ollama");
        assert_eq!(config.ai.max_tokens, 256);
        assert_eq!(config.ai.providers.ollama.model, "codellama");
        assert_eq!(config.context.selection_limit, 500);
        assert!(config.context.terminals.contains(&"iTerm2".to_string()));
    }

    #[test]
    fn test_one_field_provider_table() {
        let config = parse_config(
            r#"
            [ai.providers.claude]
            model = "claude-3-5-haiku-latest"

            [ai.providers.openai]
            endpoint = "http://localhost:8080/v1"

            [ai.providers.ollama]
            model = "qwen2.5-coder"
            "#,
        )
        .unwrap();

        let providers = &config.ai.providers;
        assert_eq!(providers.claude.model, "claude-3-5-haiku-latest");
        assert_eq!(providers.claude.api_key_env, "ANTHROPIC_API_KEY");
        assert_eq!(providers.openai.api_key_env, "OPENAI_API_KEY");
        assert_eq!(providers.openai.model, "gpt-4o-mini");
        assert_eq!(providers.openai.endpoint.as_deref(), Some("http://localhost:8080/v1"));
        assert_eq!(providers.ollama.model, "qwen2.5-coder");
        assert_eq!(providers.ollama.temperature, Some(0.2));
        assert!(providers.ollama.endpoint.is_none());
    }

    #[test]
    fn test_inline_key_wins_over_env() {
        let provider = ProviderConfig {
            api_key_env: "CMDFORGE_TEST_UNSET_KEY".to_string(),
            api_key: Some("sk-inline".to_string()),
            model: "m".to_string(),
            temperature: None,
            endpoint: None,
        };
        assert_eq!(provider.credential().as_deref(), Some("sk-inline"));
    }

    #[test]
    fn test_blank_key_is_missing() {
        let provider = ProviderConfig {
            api_key_env: "CMDFORGE_TEST_UNSET_KEY".to_string(),
            api_key: Some("   ".to_string()),
            model: "m".to_string(),
            temperature: None,
            endpoint: None,
        };
        assert!(provider.credential().is_none());
    }

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let content = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed = parse_config(&content).unwrap();
        assert_eq!(parsed.ai.provider, "claude");
        assert_eq!(parsed.context.developer_apps.len(), Config::default().context.developer_apps.len());
    }
}
