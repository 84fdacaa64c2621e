//! Gate configuration.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors from loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings for [`AuthGate`](crate::AuthGate).
///
/// Every field has a default, so a JSON object may set any subset:
///
/// ```json
/// { "credential_file": "data/passwords.properties",
///   "block_chat_until_authenticated": true }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Where credentials are stored.
    pub credential_file: PathBuf,

    /// Register a chat veto that drops chat from sessions that haven't
    /// logged in.
    pub block_chat_until_authenticated: bool,

    /// Register a command veto that only lets unauthenticated sessions
    /// run `login` and `setPassword`.
    pub restrict_commands_until_authenticated: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            credential_file: PathBuf::from("passwords.properties"),
            block_chat_until_authenticated: false,
            restrict_commands_until_authenticated: false,
        }
    }
}

impl GateConfig {
    /// Parses a JSON document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads a JSON file. A missing file gives the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => Self::from_json(&text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}
