//! Configuration tests

use officepilot_core::config::DEFAULT_OFFICE_SERVER_URL;
use officepilot_core::{Config, ConfigManager, ProviderConfig};
use tempfile::TempDir;

mod defaults_tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.default_provider, "anthropic");
        assert!(config.get_default_provider().is_some());
        assert!(config.get_provider("openai").is_some());
        assert_eq!(config.office.server_url, DEFAULT_OFFICE_SERVER_URL);
        assert!(config.office.enabled_groups.is_empty());
        assert_eq!(config.agent.max_iterations, 70);
        assert_eq!(config.agent.sub_agent_max_iterations, 70);
        assert_eq!(config.agent.max_tool_result_chars, 30_000);
        assert_eq!(config.shell.timeout_ms, 30_000);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            default_provider = "openai"

            [office]
            server_url = "http://127.0.0.1:9000"
            enabled_groups = ["excel"]
            "#,
        )
        .unwrap();

        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.office.server_url, "http://127.0.0.1:9000");
        assert_eq!(config.office.enabled_groups, vec!["excel".to_string()]);
        assert_eq!(config.office.timeout_secs, 60);
        assert_eq!(config.agent.max_iterations, 70);
        assert!(config.get_provider("anthropic").is_some());
    }
}

mod manager_tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let manager = ConfigManager::with_path(path.clone()).unwrap();

        assert_eq!(manager.path(), path.as_path());
        assert_eq!(manager.default_provider(), "anthropic");
        assert!(!path.exists());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut manager = ConfigManager::with_path(path.clone()).unwrap();
        manager.config_mut().default_provider = "ollama".to_string();
        manager.config_mut().providers.insert(
            "ollama".to_string(),
            ProviderConfig {
                provider_type: "ollama".to_string(),
                api_key: None,
                api_key_env: None,
                model: "llama3.2".to_string(),
            },
        );
        manager.config_mut().office.enabled_groups = vec!["word".into(), "powerpoint".into()];
        manager.save().unwrap();

        let reloaded = ConfigManager::with_path(path).unwrap();
        assert_eq!(reloaded.default_provider(), "ollama");
        assert_eq!(
            reloaded.config().get_default_provider().map(|p| p.model.as_str()),
            Some("llama3.2")
        );
        assert_eq!(reloaded.config().office.enabled_groups, vec!["word", "powerpoint"]);
    }

    #[test]
    fn test_invalid_file_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_provider = [not valid").unwrap();

        let result = ConfigManager::with_path(path);
        assert!(matches!(result, Err(officepilot_core::Error::Config(_))));
    }
}

mod api_key_tests {
    use super::*;

    #[test]
    fn test_inline_key_wins() {
        let provider = ProviderConfig {
            provider_type: "openai".to_string(),
            api_key: Some("sk-inline".to_string()),
            api_key_env: Some("OFFICEPILOT_TEST_UNSET_KEY".to_string()),
            model: "gpt-4o".to_string(),
        };
        assert_eq!(provider.get_api_key().as_deref(), Some("sk-inline"));
    }

    #[test]
    fn test_unset_env_yields_none() {
        let provider = ProviderConfig {
            provider_type: "openai".to_string(),
            api_key: None,
            api_key_env: Some("OFFICEPILOT_TEST_DEFINITELY_UNSET".to_string()),
            model: "gpt-4o".to_string(),
        };
        assert_eq!(provider.get_api_key(), None);
    }
}
