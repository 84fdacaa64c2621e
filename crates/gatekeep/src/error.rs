//! Unified error type for the gate.

use gatekeep_session::SessionError;
use gatekeep_store::StoreError;

use crate::{CommandError, ConfigError};

/// Top-level error that wraps every failure a gate operation can report.
///
/// None of these are fatal: by the time one is returned the gate has
/// already told the player what went wrong (where there is a player to
/// tell) and left its state consistent.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// Credential storage failed (flush, load).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Session bookkeeping failed (duplicate join, no session).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A command line didn't parse.
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A gate command came from something other than a player.
    #[error("this command can only be executed by a player")]
    NoCaller,
}
