//! Parsing of the two gate commands.
//!
//! ```text
//! /setPassword <secret...>
//! /login <secret...>
//! ```
//!
//! The leading `/` is optional. The command name is matched exactly
//! (case-sensitive) and must be followed by one space; everything after
//! that space is the secret, taken verbatim. Inner, leading, and trailing
//! whitespace all belong to the secret.

use std::fmt;

/// Name of the set-credential command.
pub const SET_PASSWORD: &str = "setPassword";

/// Name of the login command.
pub const LOGIN: &str = "login";

/// Errors from [`Command::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// A gate command with nothing after its name.
    #[error("missing argument, usage: /{command} <password>")]
    MissingArgument { command: &'static str },

    /// The line doesn't name a gate command.
    #[error("unknown command: {0}")]
    Unknown(String),
}

/// A parsed gate command.
///
/// `Debug` prints the command but never the secret.
#[derive(Clone, PartialEq, Eq)]
pub enum Command {
    SetPassword { secret: String },
    Login { secret: String },
}

impl Command {
    /// Parses one command line.
    ///
    /// # Errors
    /// - [`CommandError::Unknown`] if the name isn't `setPassword` or
    ///   `login`.
    /// - [`CommandError::MissingArgument`] if the name is right but no
    ///   secret follows.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.strip_prefix('/').unwrap_or(line);
        let (name, argument) = match line.split_once(' ') {
            Some((name, rest)) => (name, Some(rest)),
            None => (line, None),
        };

        let command = match name {
            SET_PASSWORD => SET_PASSWORD,
            LOGIN => LOGIN,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        let secret = match argument {
            Some(secret) if !secret.is_empty() => secret.to_string(),
            _ => return Err(CommandError::MissingArgument { command }),
        };

        Ok(if command == LOGIN {
            Command::Login { secret }
        } else {
            Command::SetPassword { secret }
        })
    }

    /// Whether `line` starts with one of the gate's command names,
    /// regardless of whether the rest parses.
    pub fn is_gate_command(line: &str) -> bool {
        let line = line.strip_prefix('/').unwrap_or(line);
        let name = line.split(' ').next().unwrap_or_default();
        name == SET_PASSWORD || name == LOGIN
    }

    /// The command's name as typed.
    pub fn name(&self) -> &'static str {
        match self {
            Command::SetPassword { .. } => SET_PASSWORD,
            Command::Login { .. } => LOGIN,
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = match self {
            Command::SetPassword { .. } => "SetPassword",
            Command::Login { .. } => "Login",
        };
        f.debug_struct(variant)
            .field("secret", &"<redacted>")
            .finish()
    }
}
