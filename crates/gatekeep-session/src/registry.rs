//! The session registry: every connected identity and its gate state.
//!
//! Responsibilities:
//! - Creating an unauthenticated entry when an identity joins
//! - Flipping it to authenticated after a correct login
//! - Listing who is still unauthenticated (for tick enforcement)
//! - Dropping the entry on disconnect
//!
//! # Concurrency note
//!
//! `SessionRegistry` is a plain `HashMap` with `&mut self` mutators and no
//! locking. It is owned by the gate, which is owned by the host's single
//! event-loop task; every join, command, tick, and disconnect is applied
//! from that one task in order.

use std::collections::HashMap;

use gatekeep_protocol::{Identity, Position};

use crate::{AuthState, SessionError, SessionState};

/// All live sessions, keyed by identity.
///
/// ## Lifecycle
///
/// ```text
/// on_join() ──→ [Unauthenticated] ──mark_authenticated()──→ [Authenticated]
///                      │                                          │
///                      └──────────────── on_disconnect() ─────────┘
///                                              │
///                                              ▼
///                                          (removed)
/// ```
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<Identity, SessionState>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly joined identity as unauthenticated.
    ///
    /// `position` becomes the session's anchor; `currently_elevated` is
    /// the privilege snapshot a successful login will restore.
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadyConnected`] if the identity already
    /// has a session. The existing entry is not modified.
    pub fn on_join(
        &mut self,
        identity: Identity,
        position: Position,
        currently_elevated: bool,
    ) -> Result<&SessionState, SessionError> {
        if self.sessions.contains_key(&identity) {
            return Err(SessionError::AlreadyConnected(identity));
        }

        let session = self
            .sessions
            .entry(identity)
            .or_insert(SessionState::new(position, currently_elevated));

        tracing::info!(
            %identity,
            anchor = %position,
            elevated = currently_elevated,
            "session registered"
        );
        Ok(&*session)
    }

    /// Forgets the identity's session. No-op if there isn't one.
    ///
    /// Returns the removed state so the caller can log how far the
    /// session got.
    pub fn on_disconnect(&mut self, identity: Identity) -> Option<SessionState> {
        let removed = self.sessions.remove(&identity);
        if let Some(session) = &removed {
            tracing::info!(%identity, state = %session.auth(), "session removed");
        }
        removed
    }

    /// Looks up a session. `None` if the identity isn't connected.
    pub fn get(&self, identity: Identity) -> Option<&SessionState> {
        self.sessions.get(&identity)
    }

    /// Moves a session to [`AuthState::Authenticated`].
    ///
    /// Returns `true` only when this call performed the transition; a
    /// second call, or a call for an unknown identity, returns `false`
    /// and changes nothing.
    pub fn mark_authenticated(&mut self, identity: Identity) -> bool {
        match self.sessions.get_mut(&identity) {
            Some(session) if !session.auth.is_authenticated() => {
                session.auth = AuthState::Authenticated;
                tracing::debug!(%identity, "session authenticated");
                true
            }
            _ => false,
        }
    }

    /// Returns `true` if the identity is connected and authenticated.
    pub fn is_authenticated(&self, identity: Identity) -> bool {
        self.sessions
            .get(&identity)
            .is_some_and(SessionState::is_authenticated)
    }

    /// Returns `true` if the identity has a session.
    pub fn contains(&self, identity: Identity) -> bool {
        self.sessions.contains_key(&identity)
    }

    /// Every session that still has to log in, with its anchor.
    pub fn unauthenticated(&self) -> impl Iterator<Item = (Identity, Position)> + '_ {
        self.sessions
            .iter()
            .filter(|(_, s)| !s.is_authenticated())
            .map(|(id, s)| (*id, s.anchor))
    }

    /// Number of connected sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if nobody is connected.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================
