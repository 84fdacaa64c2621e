//! Shared vocabulary for gatekeep.
//!
//! - **Types** ([`Identity`], [`Position`], [`GameMode`]): what the gate,
//!   the session registry, and the credential store talk about.
//! - **Wire messages** ([`ClientMessage`], [`ServerMessage`]): what the
//!   reference host exchanges with clients.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how wire messages become
//!   bytes and back.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Server (bytes) → Protocol (ClientMessage) → Gate (Identity, Position)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{ClientMessage, GameMode, Identity, Position, ServerMessage};
