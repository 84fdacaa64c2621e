//! Session tracking for gatekeep.
//!
//! This crate answers one question for the gate: *who is connected right
//! now, and have they proven who they are yet?*
//!
//! 1. **Session state** ([`SessionState`]): per connection, whether it has
//!    authenticated, where it was when it joined, and whether it held
//!    elevated privilege at that moment.
//! 2. **Registry** ([`SessionRegistry`]): the map from [`Identity`] to
//!    that state. An entry exists exactly while the identity is
//!    connected; nothing here is persisted.
//!
//! # How it fits in the stack
//!
//! ```text
//! Gate (above)          ← drives join / login / tick / disconnect
//!     ↕
//! Session Layer (this crate)
//!     ↕
//! Protocol Layer (below) ← Identity, Position
//! ```
//!
//! [`Identity`]: gatekeep_protocol::Identity

mod error;
mod registry;
mod session;

pub use error::SessionError;
pub use registry::SessionRegistry;
pub use session::{AuthState, SessionState};
