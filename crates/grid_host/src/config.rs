//! Configuration management for the grid host.
//!
//! This module handles loading and validation of the host configuration
//! from TOML files, and its conversion into a [`GridConfig`].

use anyhow::{bail, Context};
use grid_core::{GridConfig, ListenerPolicy, DEFAULT_STORE_KEY};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use tracing::info;

fn default_store_key() -> String {
    DEFAULT_STORE_KEY.to_string()
}

fn default_page_size() -> u64 {
    grid_core::state::DEFAULT_PAGE_SIZE
}

fn default_enabled_plugins() -> Vec<String> {
    vec![plugin_local::PLUGIN_NAME.to_string(), plugin_action_logger::PLUGIN_NAME.to_string()]
}

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub grid: GridSettings,
    #[serde(default)]
    pub plugins: PluginSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Grid construction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSettings {
    /// Key under which the store is published to rendered components
    #[serde(default = "default_store_key")]
    pub store_key: String,
    /// Initial page size
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// What to do with listener entries that are not handlers
    #[serde(default)]
    pub listener_policy: ListenerPolicy,
    /// JSON file holding the rows (an array of objects)
    #[serde(default)]
    pub data_file: Option<String>,
    /// JSON file holding the steps to replay
    #[serde(default)]
    pub script_file: Option<String>,
}

/// Which plugins to compose, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginSettings {
    #[serde(default = "default_enabled_plugins")]
    pub enabled: Vec<String>,
}

/// Logging system configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to output logs in JSON format
    pub json_format: bool,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            store_key: default_store_key(),
            page_size: default_page_size(),
            listener_policy: ListenerPolicy::default(),
            data_file: None,
            script_file: None,
        }
    }
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled_plugins(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, a default configuration file is written at
    /// the specified path and the default configuration is returned.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading configuration {}", path.display()))?;
            let config: AppConfig =
                toml::from_str(&content).with_context(|| format!("parsing configuration {}", path.display()))?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            std::fs::write(path, toml_content)
                .with_context(|| format!("writing default configuration {}", path.display()))?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Validates the configuration for consistency and correctness.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.grid.store_key.is_empty() {
            bail!("grid.store_key cannot be empty");
        }

        if self.grid.page_size == 0 {
            bail!("grid.page_size must be greater than 0");
        }

        let mut seen = Vec::new();
        for name in &self.plugins.enabled {
            if seen.contains(&name) {
                bail!("Plugin '{name}' is enabled twice");
            }
            seen.push(name);
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            );
        }

        Ok(())
    }

    /// The grid settings as a constructor configuration, without plugins or data
    pub fn to_grid_config(&self) -> GridConfig {
        GridConfig::new()
            .store_key(self.grid.store_key.clone())
            .page_properties(json!({ "pageSize": self.grid.page_size }))
            .listener_policy(self.grid.listener_policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();

        assert_eq!(config.grid.store_key, "store");
        assert_eq!(config.grid.page_size, 10);
        assert_eq!(config.grid.listener_policy, ListenerPolicy::Lenient);
        assert!(config.grid.data_file.is_none());
        assert_eq!(config.plugins.enabled, vec!["local".to_string(), "action_logger".to_string()]);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json_format);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_nonexistent_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grid.toml");

        let config = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());

        // The written default reads back unchanged
        assert_eq!(AppConfig::load_from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_load_partial_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            r#"
[grid]
page_size = 25
listener_policy = "strict"

[plugins]
enabled = ["local"]
"#,
        )
        .unwrap();

        let config = AppConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.grid.page_size, 25);
        assert_eq!(config.grid.store_key, "store");
        assert_eq!(config.grid.listener_policy, ListenerPolicy::Strict);
        assert_eq!(config.plugins.enabled, vec!["local".to_string()]);
        assert_eq!(config.logging, LoggingSettings::default());
    }

    #[test]
    fn test_load_invalid_toml() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "[grid\npage_size = ").unwrap();
        assert!(AppConfig::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();

        config.grid.page_size = 0;
        assert!(config.validate().is_err());

        config.grid.page_size = 5;
        config.grid.store_key.clear();
        assert!(config.validate().is_err());

        config.grid.store_key = "gridStore".to_string();
        config.plugins.enabled = vec!["local".to_string(), "local".to_string()];
        assert!(config.validate().is_err());

        config.plugins.enabled.pop();
        config.logging.level = "invalid".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "debug".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_to_grid_config() {
        let mut config = AppConfig::default();
        config.grid.page_size = 3;
        config.grid.store_key = "gridStore".to_string();

        let grid_config = config.to_grid_config();
        assert_eq!(grid_config.store_key, "gridStore");
        assert_eq!(grid_config.page_properties, Some(json!({"pageSize": 3})));
    }
}
