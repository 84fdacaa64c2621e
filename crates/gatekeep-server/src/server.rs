//! `GatekeepServer`: listener, host actor, and accept loop.

use std::net::SocketAddr;

use gatekeep::AuthGate;
use gatekeep_protocol::JsonCodec;
use tokio::net::TcpListener;

use crate::actor::{HostHandle, spawn_host};
use crate::handler::handle_connection;
use crate::world::World;
use crate::{ServerConfig, ServerError};

/// A bound server, ready to accept players.
///
/// ```rust,no_run
/// # async fn demo() -> Result<(), gatekeep_server::ServerError> {
/// use gatekeep_server::{GatekeepServer, ServerConfig};
///
/// let server = GatekeepServer::bind(ServerConfig::default()).await?;
/// server.run().await
/// # }
/// ```
pub struct GatekeepServer {
    listener: TcpListener,
    host: HostHandle,
    codec: JsonCodec,
}

impl GatekeepServer {
    /// Loads credentials, starts the host actor, and binds the listener.
    ///
    /// Must be called inside a Tokio runtime.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(&config.bind)
            .await
            .map_err(|source| ServerError::Bind {
                addr: config.bind.clone(),
                source,
            })?;

        let gate = AuthGate::new(config.gate.clone());
        let world = World::new(config.spawn, config.operators.iter().copied());
        let host = spawn_host(gate, world, config.tick_config());

        tracing::info!(
            addr = %listener.local_addr()?,
            operators = config.operators.len(),
            "gatekeep server listening"
        );

        Ok(Self {
            listener,
            host,
            codec: JsonCodec,
        })
    }

    /// The address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// A handle to the host actor (console commands, shutdown).
    pub fn handle(&self) -> HostHandle {
        self.host.clone()
    }

    /// Accepts connections until the process ends, one task per player.
    pub async fn run(self) -> Result<(), ServerError> {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let host = self.host.clone();
                    let codec = self.codec;
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, peer, host, codec).await {
                            tracing::debug!(%peer, error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
