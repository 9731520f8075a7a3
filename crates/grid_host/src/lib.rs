//! # Grid Host
//!
//! Composes a grid from the sample plugins, replays a script of property
//! updates and events against it, and logs the resulting render tree, state
//! and store statistics.
//!
//! ```bash
//! # Run with default configuration (written to grid.toml when missing)
//! grid_host
//!
//! # Custom configuration, rows and script
//! grid_host --config grid.toml --data rows.json --script steps.json --log-level debug
//!
//! # JSON logging
//! grid_host --json-logs
//! ```

use tracing::error;

pub mod app;
pub mod cli;
pub mod config;
pub mod logging;
pub mod script;

use app::Application;
use cli::CliArgs;
use config::AppConfig;

/// Runs the host end to end.
///
/// # Exit Codes
///
/// * **0**: Successful execution
/// * **1**: Error during startup, configuration, or replay
pub fn init() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // Logging settings come from the file, so read it before anything logs
    let config = AppConfig::load_from_file(&args.config_path).unwrap_or_default();
    let mut logging = config.logging.clone();
    if let Some(level) = &args.log_level {
        logging.level = level.clone();
    }

    if let Err(e) = logging::setup_logging(&logging, args.json_logs) {
        eprintln!("❌ Failed to setup logging: {e}");
        std::process::exit(1);
    }

    match Application::new(args) {
        Ok(app) => {
            if let Err(e) = app.run() {
                error!("❌ Application error: {:?}", e);
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("❌ Failed to start application: {e:?}");
            std::process::exit(1);
        }
    }

    Ok(())
}

pub use config::{GridSettings, LoggingSettings, PluginSettings};
pub use script::{ReplaySummary, ScriptStep};
