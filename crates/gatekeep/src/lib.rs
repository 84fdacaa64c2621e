//! # gatekeep
//!
//! Player authentication gate for multi-user real-time servers.
//!
//! A freshly connected session is held in a confined observer state at
//! the spot it joined, with any elevated privilege stripped, until it
//! supplies the right credential. Then it is released and its privilege
//! handed back.
//!
//! The host server plugs in through the [`Host`] trait and forwards its
//! events to an [`AuthGate`]:
//!
//! ```rust,no_run
//! use gatekeep::{AuthGate, GateConfig};
//!
//! let mut gate = AuthGate::new(GateConfig::default());
//! // on connect:    gate.on_join(&mut world, identity, position, is_op)?;
//! // on command:    gate.execute(&mut world, Some(identity), "/login hunter2")?;
//! // every tick:    gate.on_tick(&mut world);
//! // on disconnect: gate.on_disconnect(identity);
//! # let _ = &mut gate;
//! ```
//!
//! Credentials live in a `.properties` file managed by
//! [`gatekeep_store::CredentialStore`]; per-connection state lives in a
//! [`gatekeep_session::SessionRegistry`] owned by the gate.

mod command;
mod config;
mod error;
mod feedback;
mod gate;
mod host;
mod privilege;
mod veto;

pub use command::{Command, CommandError, LOGIN, SET_PASSWORD};
pub use config::{ConfigError, GateConfig};
pub use error::GateError;
pub use feedback::Feedback;
pub use gate::{AuthGate, CommandOutcome, LoginOutcome, SetOutcome};
pub use host::Host;
pub use privilege::PrivilegeGuard;
pub use veto::{Checker, MessageVeto};

pub use gatekeep_protocol::{Identity, Position};
