//! # gatekeep-server
//!
//! A small WebSocket world that runs the [`gatekeep`] authentication gate
//! end to end. It is a reference host: the gate's behaviour lives in the
//! `gatekeep` crate, this crate only adapts it to connections.
//!
//! ```text
//! client ──ws──→ handler task ──HostEvent──→ host actor (AuthGate + World)
//!        ←─ws─── handler task ←─ServerMessage──┘          ↑
//!                                               tick scheduler
//! ```

mod actor;
pub mod cli;
mod config;
mod error;
mod handler;
mod server;
mod world;

pub use actor::{EVENT_CHANNEL_SIZE, HostHandle, spawn_host};
pub use config::ServerConfig;
pub use error::ServerError;
pub use server::GatekeepServer;
pub use world::{Avatar, Outbox, World};

use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter`. Calling it twice is
/// harmless; the second call does nothing.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
