//! Main application logic and lifecycle management.
//!
//! The `Application` composes a grid from the configured plugins, replays
//! the configured script against it and reports what happened.

use crate::{
    cli::CliArgs,
    config::AppConfig,
    logging::display_banner,
    script::{load_script, replay, ReplaySummary},
};
use anyhow::{anyhow, Context};
use grid_core::{Grid, ListenerPolicy, Plugin, PluginFactory};
use plugin_action_logger::ActionLogger;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Plugins the host knows how to build, looked up by name
pub struct PluginRegistry {
    factories: Vec<Box<dyn PluginFactory>>,
    logger: ActionLogger,
}

impl PluginRegistry {
    pub fn new() -> Self {
        let logger = ActionLogger::default();
        let factories: Vec<Box<dyn PluginFactory>> = vec![Box::new(plugin_local::factory()), Box::new(logger.factory())];
        Self { factories, logger }
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.iter().map(|factory| factory.plugin_name()).collect()
    }

    /// Build the named plugins in the given order
    pub fn build(&self, enabled: &[String]) -> anyhow::Result<Vec<Plugin>> {
        enabled
            .iter()
            .map(|name| {
                let factory = self
                    .factories
                    .iter()
                    .find(|factory| factory.plugin_name() == name)
                    .ok_or_else(|| anyhow!("Unknown plugin '{}' (available: {:?})", name, self.names()))?;
                let plugin = factory.create()?;
                debug!("🔌 Built plugin {} v{}", plugin.name(), plugin.metadata.version);
                Ok(plugin)
            })
            .collect()
    }

    /// The logger shared by every action logger bundle this registry builds
    pub fn action_logger(&self) -> &ActionLogger {
        &self.logger
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

pub fn load_rows(path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path).with_context(|| format!("reading data {}", path.display()))?;
    let rows: Value = serde_json::from_str(&content).with_context(|| format!("parsing data {}", path.display()))?;
    if !rows.is_array() {
        return Err(anyhow!("Data file {} must hold a JSON array", path.display()));
    }
    Ok(rows)
}

/// A composed grid plus the host configuration it came from
pub struct Application {
    config: AppConfig,
    registry: PluginRegistry,
    grid: Grid,
}

impl Application {
    /// Loads configuration, applies CLI overrides, validates settings and
    /// builds the grid.
    pub fn new(args: CliArgs) -> anyhow::Result<Self> {
        info!("🔧 Loading configuration from: {}", args.config_path.display());
        let mut config = AppConfig::load_from_file(&args.config_path)?;

        if let Some(data_file) = args.data_file {
            config.grid.data_file = Some(data_file.to_string_lossy().to_string());
        }
        if let Some(script_file) = args.script_file {
            config.grid.script_file = Some(script_file.to_string_lossy().to_string());
        }
        if let Some(log_level) = args.log_level {
            config.logging.level = log_level;
        }
        if args.json_logs {
            config.logging.json_format = true;
        }
        if args.strict_listeners {
            config.grid.listener_policy = ListenerPolicy::Strict;
        }

        config
            .validate()
            .context("Configuration validation failed")?;
        info!("✅ Configuration loaded and validated successfully");

        display_banner();
        Self::from_config(config)
    }

    /// Builds the grid from an already validated configuration
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let registry = PluginRegistry::new();
        let plugins = registry.build(&config.plugins.enabled)?;

        let mut grid_config = config.to_grid_config().plugins(plugins);
        if let Some(data_file) = &config.grid.data_file {
            grid_config = grid_config.data(load_rows(Path::new(data_file))?);
        }

        let grid = Grid::new(grid_config)?;
        info!(
            "🧮 Grid ready with plugins {:?} under store key '{}'",
            config.plugins.enabled,
            grid.context().store_key()
        );

        Ok(Self { config, registry, grid })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Replays the configured script, then reports the render tree, state
    /// and store statistics.
    pub fn run(self) -> anyhow::Result<ReplaySummary> {
        info!("🌟 Starting grid host");

        let summary = match &self.config.grid.script_file {
            Some(script_file) => {
                let steps = load_script(&PathBuf::from(script_file))?;
                info!("📜 Replaying {} step(s) from {}", steps.len(), script_file);
                replay(&self.grid, &steps)?
            }
            None => ReplaySummary::default(),
        };

        self.report()?;
        Ok(summary)
    }

    fn report(&self) -> anyhow::Result<()> {
        let render = serde_json::to_string_pretty(&self.grid.render())?;
        info!("🖼️ Render tree:\n{}", render);

        let state = self.grid.state();
        debug!("📦 State:\n{}", serde_json::to_string_pretty(state.as_ref())?);

        let stats = self.grid.stats();
        info!("📊 Store statistics:");
        info!("  - Actions dispatched: {}", stats.actions_dispatched);
        info!("  - Actions queued: {}", stats.actions_queued);
        info!("  - Notifications sent: {}", stats.notifications_sent);
        info!("  - Subscribers: {}", stats.subscribers);

        if self.config.plugins.enabled.iter().any(|name| name == plugin_action_logger::PLUGIN_NAME) {
            self.registry.action_logger().summarize();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_registry_builds_in_order() {
        let registry = PluginRegistry::new();
        let plugins = registry
            .build(&["action_logger".to_string(), "local".to_string()])
            .unwrap();

        let names: Vec<&str> = plugins.iter().map(Plugin::name).collect();
        assert_eq!(names, vec!["action_logger", "local"]);
    }

    #[test]
    fn test_registry_rejects_unknown_plugin() {
        let registry = PluginRegistry::new();
        let err = registry.build(&["sparkles".to_string()]).unwrap_err();
        assert!(err.to_string().contains("sparkles"));
    }

    #[test]
    fn test_load_rows_requires_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rows.json");
        std::fs::write(&path, r#"{"name": "not rows"}"#).unwrap();
        assert!(load_rows(&path).is_err());

        std::fs::write(&path, r#"[{"name": "bob"}]"#).unwrap();
        assert_eq!(load_rows(&path).unwrap(), json!([{"name": "bob"}]));
    }

    #[test]
    fn test_run_replays_script() {
        let dir = tempdir().unwrap();
        let data = dir.path().join("rows.json");
        let script = dir.path().join("steps.json");
        std::fs::write(&data, r#"[{"name": "a"}, {"name": "b"}, {"name": "c"}]"#).unwrap();
        std::fs::write(
            &script,
            r#"[
                {"kind": "event", "name": "nextPage"},
                {"kind": "properties", "properties": {"pageProperties": {"pageSize": 2, "currentPage": 1}}}
            ]"#,
        )
        .unwrap();

        let mut config = AppConfig::default();
        config.grid.page_size = 2;
        config.grid.data_file = Some(data.to_string_lossy().to_string());
        config.grid.script_file = Some(script.to_string_lossy().to_string());

        let app = Application::from_config(config).unwrap();
        let logger = app.registry().action_logger().clone();
        let summary = app.run().unwrap();

        assert_eq!(summary.steps, 2);
        assert_eq!(summary.events, 1);
        assert_eq!(summary.property_updates, 1);
        assert_eq!(logger.actions_logged(), 2);
    }

    #[test]
    fn test_new_writes_default_config() {
        let dir = tempdir().unwrap();
        let args = CliArgs {
            config_path: dir.path().join("grid.toml"),
            data_file: None,
            script_file: None,
            log_level: Some("debug".to_string()),
            json_logs: false,
            strict_listeners: true,
        };

        let app = Application::new(args.clone()).unwrap();
        assert!(args.config_path.exists());
        assert_eq!(app.grid().state()["pageProperties"]["pageSize"], json!(10));
    }
}
