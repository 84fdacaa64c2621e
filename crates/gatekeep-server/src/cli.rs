//! Command-line interface for the `gatekeep-server` binary.

use std::path::PathBuf;

use clap::{Arg, ArgMatches, ColorChoice, Command};

use crate::ServerConfig;

#[must_use]
pub fn new() -> Command {
    Command::new("gatekeep-server")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to the JSON config file")
                .long_help("Path to the JSON config file. A missing file means built-in defaults.")
                .env("GATEKEEP_CONFIG")
                .default_value("gatekeep.json")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("bind")
                .short('b')
                .long("bind")
                .help("Listen address, overrides the config file")
                .env("GATEKEEP_BIND"),
        )
        .arg(
            Arg::new("log")
                .long("log")
                .help("Default log filter, overrides the config file (RUST_LOG still wins)")
                .env("GATEKEEP_LOG"),
        )
}

/// Parsed command-line arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub config: PathBuf,
    pub bind: Option<String>,
    pub log: Option<String>,
}

impl Args {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            config: matches
                .get_one::<PathBuf>("config")
                .cloned()
                .unwrap_or_else(|| PathBuf::from("gatekeep.json")),
            bind: matches.get_one::<String>("bind").cloned(),
            log: matches.get_one::<String>("log").cloned(),
        }
    }

    /// Applies command-line overrides on top of the file config.
    pub fn apply(&self, config: &mut ServerConfig) {
        if let Some(bind) = &self.bind {
            config.bind.clone_from(bind);
        }
        if let Some(log) = &self.log {
            config.log.clone_from(log);
        }
    }
}
