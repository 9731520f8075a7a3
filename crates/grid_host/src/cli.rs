//! Command-line interface handling for the grid host.
//!
//! Arguments override the matching settings of the configuration file.

use clap::{Arg, Command};
use std::path::PathBuf;

/// Command line arguments parsed from user input.
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Optional override for the row data file
    pub data_file: Option<PathBuf>,
    /// Optional override for the property update script
    pub script_file: Option<PathBuf>,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
    /// Reject listener slots that are not handlers
    pub strict_listeners: bool,
}

impl CliArgs {
    /// Parses command line arguments using clap.
    pub fn parse() -> Self {
        Self::from_matches(Self::command().get_matches())
    }

    /// Parses an explicit argument list; used by tests.
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Ok(Self::from_matches(Self::command().try_get_matches_from(args)?))
    }

    fn command() -> Command {
        Command::new("Grid Host")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Composes a data grid from plugins and replays property updates")
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path")
                    .default_value("grid.toml"),
            )
            .arg(
                Arg::new("data")
                    .short('d')
                    .long("data")
                    .value_name("FILE")
                    .help("JSON file holding the row data"),
            )
            .arg(
                Arg::new("script")
                    .short('s')
                    .long("script")
                    .value_name("FILE")
                    .help("JSON file holding property updates and events to replay"),
            )
            .arg(
                Arg::new("log-level")
                    .short('l')
                    .long("log-level")
                    .value_name("LEVEL")
                    .help("Log level (trace, debug, info, warn, error)"),
            )
            .arg(
                Arg::new("json-logs")
                    .long("json-logs")
                    .help("Output logs in JSON format")
                    .action(clap::ArgAction::SetTrue),
            )
            .arg(
                Arg::new("strict-listeners")
                    .long("strict-listeners")
                    .help("Fail when a listener entry is not a handler")
                    .action(clap::ArgAction::SetTrue),
            )
    }

    fn from_matches(matches: clap::ArgMatches) -> Self {
        Self {
            config_path: matches
                .get_one::<String>("config")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("grid.toml")),
            data_file: matches.get_one::<String>("data").map(PathBuf::from),
            script_file: matches.get_one::<String>("script").map(PathBuf::from),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
            strict_listeners: matches.get_flag("strict-listeners"),
        }
    }
}
