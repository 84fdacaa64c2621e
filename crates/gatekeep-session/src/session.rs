//! Session types: what the server remembers about one connection.
//!
//! A session records:
//! - WHETHER the player has proven their identity yet ([`AuthState`])
//! - WHERE they stood when they joined (the anchor they are held at)
//! - WHAT privilege they had on arrival (so it can be handed back)

use gatekeep_protocol::Position;

// ---------------------------------------------------------------------------
// AuthState
// ---------------------------------------------------------------------------

/// Where a session is in the authentication lifecycle.
///
/// ```text
///   Unauthenticated ──(correct login)──→ Authenticated
/// ```
///
/// There is no edge back. A session leaves `Authenticated` only by
/// disconnecting, which destroys it; the next connection starts over at
/// `Unauthenticated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    /// Joined but hasn't logged in. Confined and held at the anchor.
    #[default]
    Unauthenticated,

    /// Logged in. Free to play.
    Authenticated,
}

impl AuthState {
    /// Returns `true` once the session has logged in.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

impl std::fmt::Display for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "Unauthenticated"),
            Self::Authenticated => write!(f, "Authenticated"),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The registry's record for one connected identity.
///
/// Created on join, dropped on disconnect. Fields are private so the only
/// mutation possible is the one-way [`AuthState`] flip done through
/// [`SessionRegistry::mark_authenticated`](crate::SessionRegistry::mark_authenticated);
/// the anchor and the privilege snapshot can't change after join.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub(crate) auth: AuthState,
    pub(crate) anchor: Position,
    pub(crate) had_elevated_privilege: bool,
}

impl SessionState {
    pub(crate) fn new(anchor: Position, had_elevated_privilege: bool) -> Self {
        Self {
            auth: AuthState::Unauthenticated,
            anchor,
            had_elevated_privilege,
        }
    }

    /// Current lifecycle state.
    pub fn auth(&self) -> AuthState {
        self.auth
    }

    /// Shorthand for `self.auth().is_authenticated()`.
    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    /// Where the session joined. An unauthenticated session is reset
    /// here every tick.
    pub fn anchor(&self) -> Position {
        self.anchor
    }

    /// Whether the identity held elevated privilege when it joined, i.e.
    /// whether a successful login owes it a restoration.
    pub fn had_elevated_privilege(&self) -> bool {
        self.had_elevated_privilege
    }
}
