//! Configuration management for OfficePilot
//!
//! Handles loading, saving, and managing application configuration
//! including API keys, the automation server address and agent limits.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Default address of the Office automation server
pub const DEFAULT_OFFICE_SERVER_URL: &str = "http://127.0.0.1:8765";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Default provider to use
    #[serde(default = "default_provider_name")]
    pub default_provider: String,
    /// Provider configurations keyed by name
    #[serde(default = "default_providers")]
    pub providers: HashMap<String, ProviderConfig>,
    /// Agent loop limits
    #[serde(default)]
    pub agent: AgentConfig,
    /// Office automation server settings
    #[serde(default)]
    pub office: OfficeConfig,
    /// Shell execution settings
    #[serde(default)]
    pub shell: ShellSettings,
    /// General application settings
    #[serde(default)]
    pub general: GeneralConfig,
}

fn default_provider_name() -> String {
    "anthropic".to_string()
}

fn default_providers() -> HashMap<String, ProviderConfig> {
    let mut providers = HashMap::new();
    providers.insert("anthropic".to_string(), ProviderConfig::anthropic());
    providers.insert("openai".to_string(), ProviderConfig::openai());
    providers.insert("gemini".to_string(), ProviderConfig::gemini());
    providers
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_provider: default_provider_name(),
            providers: default_providers(),
            agent: AgentConfig::default(),
            office: OfficeConfig::default(),
            shell: ShellSettings::default(),
            general: GeneralConfig::default(),
        }
    }
}

impl Config {
    /// Get the provider config for the default provider
    pub fn get_default_provider(&self) -> Option<&ProviderConfig> {
        self.providers.get(&self.default_provider)
    }

    /// Get a specific provider config by name
    pub fn get_provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.get(name)
    }

    /// List all configured provider names
    pub fn list_providers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

/// LLM Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider type: "anthropic", "openai", "gemini", etc.
    pub provider_type: String,
    /// API key (can be loaded from env)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Environment variable name for API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    /// Model to use
    pub model: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::anthropic()
    }
}

impl ProviderConfig {
    pub fn anthropic() -> Self {
        Self {
            provider_type: "anthropic".to_string(),
            api_key: None,
            api_key_env: Some("ANTHROPIC_API_KEY".to_string()),
            model: "claude-sonnet-4-20250514".to_string(),
        }
    }

    pub fn openai() -> Self {
        Self {
            provider_type: "openai".to_string(),
            api_key: None,
            api_key_env: Some("OPENAI_API_KEY".to_string()),
            model: "gpt-4o".to_string(),
        }
    }

    pub fn gemini() -> Self {
        Self {
            provider_type: "gemini".to_string(),
            api_key: None,
            api_key_env: Some("GEMINI_API_KEY".to_string()),
            model: "gemini-2.0-flash".to_string(),
        }
    }

    /// Get the API key, checking the environment variable if not set directly
    pub fn get_api_key(&self) -> Option<String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            return Some(key.clone());
        }

        self.api_key_env
            .as_ref()
            .and_then(|name| std::env::var(name).ok())
            .filter(|key| !key.is_empty())
    }
}

/// Limits for the tool-calling loop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// LLM round-trips before the loop gives up with a partial result
    pub max_iterations: usize,
    /// Iteration cap for `*_work_request` sub-agents
    pub sub_agent_max_iterations: usize,
    /// Tool output is truncated to this many characters before it enters the conversation
    pub max_tool_result_chars: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: 70,
            sub_agent_max_iterations: 70,
            max_tool_result_chars: 30_000,
        }
    }
}

/// Office automation server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OfficeConfig {
    /// Base URL of the automation server
    pub server_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Tool groups to enable at startup ("word", "excel", "powerpoint")
    pub enabled_groups: Vec<String>,
}

impl Default for OfficeConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_OFFICE_SERVER_URL.to_string(),
            timeout_secs: 60,
            enabled_groups: Vec::new(),
        }
    }
}

/// Shell execution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellSettings {
    /// Default timeout for single-shot commands, in milliseconds
    pub timeout_ms: u64,
    /// Characters of output returned by a background read
    pub background_max_output_chars: usize,
    /// Bytes of output retained per background stream
    pub background_buffer_bytes: usize,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            background_max_output_chars: 10_000,
            background_buffer_bytes: 1024 * 1024,
        }
    }
}

/// General application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Initial working directory for sessions
    pub working_dir: Option<PathBuf>,
    /// Log level
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            working_dir: None,
            log_level: "warn".to_string(),
        }
    }
}

/// Configuration manager for loading and saving config
pub struct ConfigManager {
    config_path: PathBuf,
    config: Config,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Self::with_path(config_path)
    }

    /// Create a config manager with a specific path
    pub fn with_path(config_path: PathBuf) -> Result<Self> {
        let config = if config_path.exists() {
            Self::load_from_path(&config_path)?
        } else {
            Config::default()
        };

        Ok(Self { config_path, config })
    }

    /// Get the default config path
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not find config directory".to_string()))?;

        Ok(config_dir.join("officepilot").join("config.toml"))
    }

    fn load_from_path(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        toml::from_str(&content).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Save the current configuration to disk
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config dir: {}", e)))?;
        }

        let content = toml::to_string_pretty(&self.config)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(&self.config_path, content)
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Get the default provider name
    pub fn default_provider(&self) -> &str {
        &self.config.default_provider
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.default_provider, "anthropic");
        assert_eq!(config.agent.max_iterations, 70);
        assert_eq!(config.office.server_url, DEFAULT_OFFICE_SERVER_URL);
        assert_eq!(config.shell.timeout_ms, 30_000);

        let anthropic = config.get_default_provider().unwrap();
        assert_eq!(anthropic.provider_type, "anthropic");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("default_provider"));
        assert!(toml_str.contains("[providers.anthropic]"));
        assert!(toml_str.contains("[office]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_provider, config.default_provider);
        assert_eq!(parsed.providers.len(), config.providers.len());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            default_provider = "openai"

            [office]
            enabled_groups = ["excel"]
            "#,
        )
        .unwrap();

        assert_eq!(parsed.default_provider, "openai");
        assert_eq!(parsed.office.enabled_groups, vec!["excel".to_string()]);
        assert_eq!(parsed.office.server_url, DEFAULT_OFFICE_SERVER_URL);
        assert_eq!(parsed.agent.max_tool_result_chars, 30_000);
        assert!(parsed.providers.contains_key("anthropic"));
    }

    #[test]
    fn test_direct_api_key_wins() {
        let mut provider = ProviderConfig::openai();
        provider.api_key = Some("direct-key".to_string());
        provider.api_key_env = Some("OFFICEPILOT_TEST_UNSET_KEY".to_string());
        assert_eq!(provider.get_api_key(), Some("direct-key".to_string()));

        provider.api_key = Some(String::new());
        assert_eq!(provider.get_api_key(), None);
    }
}
