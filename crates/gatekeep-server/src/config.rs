//! Server configuration.
//!
//! Read from a JSON file; every field is optional.
//!
//! ```json
//! {
//!   "bind": "0.0.0.0:25580",
//!   "log": "info,gatekeep=debug",
//!   "tick_rate_hz": 20,
//!   "operators": ["0f8fad5b-d9cb-469f-a165-70867728950e"],
//!   "spawn": { "x": 0.5, "y": 64.0, "z": 0.5 },
//!   "gate": { "credential_file": "passwords.properties" }
//! }
//! ```

use std::fs;
use std::io;
use std::path::Path;

use gatekeep::{ConfigError, GateConfig};
use gatekeep_protocol::{Identity, Position};
use gatekeep_tick::TickConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address for the WebSocket front end.
    pub bind: String,

    /// Default `tracing` filter. `RUST_LOG` wins when set.
    pub log: String,

    /// Server ticks per second; confinement is enforced once per tick.
    pub tick_rate_hz: u32,

    /// Identities that hold elevated privilege when the server starts.
    pub operators: Vec<Identity>,

    /// Where every avatar enters the world.
    pub spawn: Position,

    pub gate: GateConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:25580".to_string(),
            log: "info".to_string(),
            tick_rate_hz: TickConfig::DEFAULT_TICK_RATE_HZ,
            operators: Vec::new(),
            spawn: Position::at(0.5, 64.0, 0.5),
            gate: GateConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads a JSON file. A missing file gives the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => Self::from_json(&text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// The tick scheduler settings for `tick_rate_hz`.
    pub fn tick_config(&self) -> TickConfig {
        TickConfig::with_rate(self.tick_rate_hz)
    }
}
