//! Error types for the session layer.

use gatekeep_protocol::Identity;

/// Errors that can occur during session bookkeeping.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A join arrived for an identity that already has a session.
    ///
    /// The host delivers exactly one join per connection and one
    /// disconnect per close, so seeing this means the host broke that
    /// contract. The existing session is left untouched.
    #[error("identity {0} already has a session")]
    AlreadyConnected(Identity),

    /// No session exists for the identity.
    #[error("no session for identity {0}")]
    NotFound(Identity),
}
