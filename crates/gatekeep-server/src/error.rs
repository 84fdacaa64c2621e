//! Error type for the reference host.

use gatekeep::{ConfigError, GateError};
use gatekeep_protocol::ProtocolError;

/// Everything that can go wrong while running the server or one of its
/// connections.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The listener couldn't be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// WebSocket handshake or framing failure.
    #[error(transparent)]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The gate refused the operation.
    #[error(transparent)]
    Gate(#[from] GateError),

    /// The client broke the connection protocol (e.g. no `Hello` first).
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// The host actor's channel is closed.
    #[error("host actor is not running")]
    HostStopped,
}
