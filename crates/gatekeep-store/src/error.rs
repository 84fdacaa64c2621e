//! Error types for the credential store.

use std::path::PathBuf;

use gatekeep_protocol::Identity;

/// Errors raised while loading, writing, or changing credentials.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A credential already exists for this identity. Credentials are
    /// define-once; there is no change or reset path.
    #[error("a credential is already set for {0}")]
    AlreadySet(Identity),

    /// The credential file exists but couldn't be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the credential file failed. The in-memory record that
    /// triggered the write is still present.
    #[error("failed to write {}: {source}", .path.display())]
    Flush {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A `\uXXXX` escape in the credential file is incomplete or invalid.
    #[error("malformed \\uXXXX escape on line {line}")]
    MalformedEscape { line: usize },
}
