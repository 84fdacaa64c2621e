//! Core protocol types for gatekeep.
//!
//! Two groups of types live here:
//!
//! - **World vocabulary** ([`Identity`], [`Position`], [`GameMode`]):
//!   shared by the gate, the session registry, and the credential store.
//! - **Wire messages** ([`ClientMessage`], [`ServerMessage`]): what the
//!   reference host exchanges with connected clients.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The stable, unique key of a connecting principal.
///
/// A newtype over [`Uuid`] so an identity can't be confused with any other
/// UUID-shaped value in the system. The same identity comes back every
/// time the same account connects, which is what lets the credential store
/// key records by it.
///
/// `#[serde(transparent)]` keeps the JSON form a plain string:
/// `"0f8fad5b-d9cb-469f-a165-70867728950e"`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Identity(pub Uuid);

impl Identity {
    /// Builds an identity from a raw 128-bit value. Deterministic
    /// identities keep fixtures and test output readable.
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }
}

/// Hyphenated lowercase form, the same text used as the key in the
/// credential file.
impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for Identity {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A point in the world plus the direction the avatar is facing.
///
/// Coordinates are `f64` (block-precise positions get large quickly);
/// orientation is `f32` degrees. Only `PartialEq` is derived: floats have
/// no total equality.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default)]
    pub yaw: f32,
    #[serde(default)]
    pub pitch: f32,
}

impl Position {
    /// A position with zero orientation.
    pub fn at(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    /// The same coordinates facing a new direction.
    pub fn facing(self, yaw: f32, pitch: f32) -> Self {
        Self { yaw, pitch, ..self }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// GameMode
// ---------------------------------------------------------------------------

/// How an avatar may interact with the shared world.
///
/// A confined session is put into [`GameMode::Spectator`] (look, don't
/// touch); a session that authenticates is released into
/// [`GameMode::Survival`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "PascalCase")]
pub enum GameMode {
    #[default]
    Survival,
    Spectator,
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Survival => write!(f, "Survival"),
            Self::Spectator => write!(f, "Spectator"),
        }
    }
}

// ---------------------------------------------------------------------------
// ClientMessage: client → server
// ---------------------------------------------------------------------------

/// Messages a client sends to the reference host.
///
/// Internally tagged, so a chat line looks like
/// `{ "type": "Chat", "text": "hi" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Must be the first frame on a connection. Announces who is joining.
    Hello { identity: Identity, name: String },

    /// A line of chat.
    Chat { text: String },

    /// A command line, with or without the leading `/`.
    Command { line: String },

    /// The client moved its avatar.
    Move { position: Position },

    /// The client is leaving. The server closes the connection.
    Leave,
}

// ---------------------------------------------------------------------------
// ServerMessage: server → client
// ---------------------------------------------------------------------------

/// Messages the reference host sends to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Reply to `Hello`: you are in the world, here is where.
    Welcome {
        identity: Identity,
        position: Position,
        game_mode: GameMode,
    },

    /// Human-readable feedback from the server (gate prompts, errors).
    Feedback { text: String },

    /// The server moved your avatar.
    Teleported { position: Position },

    /// Your game mode changed.
    GameModeChanged { game_mode: GameMode },

    /// Your operator status changed.
    OperatorChanged { operator: bool },

    /// A chat line from another player (or yourself, echoed).
    Chat { from: String, text: String },

    /// A protocol-level error. `code` follows HTTP conventions
    /// (400 = bad request, 409 = conflict).
    Error { code: u16, message: String },
}

// =========================================================================
// Tests
// =========================================================================
