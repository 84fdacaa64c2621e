//! The authentication state machine.
//!
//! [`AuthGate`] owns the credential store, the session registry, and the
//! veto hook, and reacts to five host events:
//!
//! | event        | method                                  |
//! |--------------|-----------------------------------------|
//! | join         | [`AuthGate::on_join`]                   |
//! | setPassword  | [`AuthGate::set_credential`]            |
//! | login        | [`AuthGate::login`]                     |
//! | tick         | [`AuthGate::on_tick`]                   |
//! | disconnect   | [`AuthGate::on_disconnect`]             |
//!
//! Command lines can go through [`AuthGate::execute`], which parses and
//! dispatches to the two command methods.
//!
//! Everything takes `&mut self` and runs on the host's event-loop task.

use gatekeep_protocol::{Identity, Position};
use gatekeep_session::{SessionError, SessionRegistry};
use gatekeep_store::CredentialStore;
use tracing::{debug, error, info, trace, warn};

use crate::{
    Command, CommandError, Feedback, GateConfig, GateError, Host, MessageVeto, PrivilegeGuard,
};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of a set-credential attempt that reached the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// The credential was stored and flushed.
    Stored,
    /// A credential already exists; nothing changed.
    AlreadySet,
}

/// Result of a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The session is now authenticated.
    Authenticated { privilege_restored: bool },
    /// The session had already logged in; nothing changed.
    AlreadyAuthenticated,
    /// Wrong secret, or no credential on file.
    Rejected,
}

/// Result of [`AuthGate::execute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Set(SetOutcome),
    Login(LoginOutcome),
}

// ---------------------------------------------------------------------------
// AuthGate
// ---------------------------------------------------------------------------

/// Holds new sessions in a confined observer state until they log in.
///
/// ```text
/// join ──→ [Unauthenticated] ──login ok──→ [Authenticated]
///            │  ▲   strip privilege          restore privilege
///            └──┘   confine                  release
///            tick: back to anchor
/// ```
pub struct AuthGate {
    config: GateConfig,
    store: CredentialStore,
    sessions: SessionRegistry,
    veto: MessageVeto<SessionRegistry>,
}

impl AuthGate {
    /// Loads the credential file named by `config` and builds the gate.
    ///
    /// A missing or unreadable file gives an empty store (logged).
    pub fn new(config: GateConfig) -> Self {
        let store = CredentialStore::load(config.credential_file.clone());
        Self::with_store(config, store)
    }

    /// Builds the gate around an already loaded store.
    ///
    /// Registers the built-in veto policies `config` turns on.
    pub fn with_store(config: GateConfig, store: CredentialStore) -> Self {
        let mut veto = MessageVeto::new();

        if config.block_chat_until_authenticated {
            veto.register_chat("chat-requires-login", |sessions: &SessionRegistry, id, _| {
                sessions.is_authenticated(id)
            });
        }
        if config.restrict_commands_until_authenticated {
            veto.register_command(
                "commands-require-login",
                |sessions: &SessionRegistry, id, line| {
                    sessions.is_authenticated(id) || Command::is_gate_command(line)
                },
            );
        }

        info!(
            credentials = store.len(),
            file = %store.path().display(),
            chat_checkers = veto.chat_checkers(),
            command_checkers = veto.command_checkers(),
            "auth gate ready"
        );

        Self {
            config,
            store,
            sessions: SessionRegistry::new(),
            veto,
        }
    }

    // -- Events -----------------------------------------------------------

    /// A session joined at `position`, with elevated privilege or not.
    ///
    /// Registers it as unauthenticated, strips elevated privilege if it
    /// had any, confines it, and sends onboarding guidance.
    ///
    /// # Errors
    /// [`SessionError::AlreadyConnected`] if the identity already has a
    /// session; nothing is sent to the host in that case.
    pub fn on_join<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        identity: Identity,
        position: Position,
        elevated: bool,
    ) -> Result<(), GateError> {
        self.sessions.on_join(identity, position, elevated)?;

        if elevated {
            PrivilegeGuard::strip(host, identity);
        }
        host.set_confined(identity, true);

        let has_credential = self.store.has(identity);
        for line in Feedback::onboarding(has_credential) {
            host.send_feedback(identity, &line);
        }

        info!(%identity, elevated, has_credential, "player joined, awaiting login");
        Ok(())
    }

    /// Handles `setPassword <secret>`.
    ///
    /// # Errors
    /// - [`SessionError::NotFound`] if the identity has no session.
    /// - [`StoreError::Flush`](gatekeep_store::StoreError::Flush) if the
    ///   file couldn't be written. The player is told the set failed and
    ///   stays unauthenticated.
    pub fn set_credential<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        identity: Identity,
        secret: &str,
    ) -> Result<SetOutcome, GateError> {
        self.require_session(identity, "setPassword")?;

        if self.store.has(identity) {
            host.send_feedback(identity, &Feedback::AlreadySet);
            info!(%identity, "credential already set, change refused");
            return Ok(SetOutcome::AlreadySet);
        }

        match self.store.set(identity, secret) {
            Ok(()) => {
                host.send_feedback(identity, &Feedback::PasswordSet);
                host.send_feedback(identity, &Feedback::LoginHint);
                info!(%identity, "credential set");
                Ok(SetOutcome::Stored)
            }
            Err(e) => {
                error!(%identity, error = %e, "failed to store credential");
                host.send_feedback(identity, &Feedback::SetFailed);
                Err(e.into())
            }
        }
    }

    /// Handles `login <secret>`.
    ///
    /// A correct secret authenticates the session, releases it, and
    /// restores elevated privilege if it had some on join. A wrong one
    /// changes nothing. There is no lockout.
    ///
    /// # Errors
    /// [`SessionError::NotFound`] if the identity has no session.
    pub fn login<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        identity: Identity,
        secret: &str,
    ) -> Result<LoginOutcome, GateError> {
        self.require_session(identity, "login")?;

        if self.sessions.is_authenticated(identity) {
            host.send_feedback(identity, &Feedback::AlreadyAuthenticated);
            debug!(%identity, "login after authentication ignored");
            return Ok(LoginOutcome::AlreadyAuthenticated);
        }

        if !self.store.verify(identity, secret) {
            host.send_feedback(identity, &Feedback::InvalidPassword);
            info!(%identity, "login rejected");
            return Ok(LoginOutcome::Rejected);
        }

        self.sessions.mark_authenticated(identity);
        host.set_confined(identity, false);
        host.send_feedback(identity, &Feedback::LoginSucceeded);

        let owed = self
            .sessions
            .get(identity)
            .is_some_and(|s| s.had_elevated_privilege());
        if owed {
            PrivilegeGuard::restore(host, identity);
        }

        info!(%identity, privilege_restored = owed, "player logged in");
        Ok(LoginOutcome::Authenticated {
            privilege_restored: owed,
        })
    }

    /// Once per server tick: every session that hasn't logged in goes back
    /// to its anchor and is confined again.
    ///
    /// Returns how many sessions were held.
    pub fn on_tick<H: Host + ?Sized>(&self, host: &mut H) -> usize {
        let mut held = 0;
        for (identity, anchor) in self.sessions.unauthenticated() {
            host.teleport(identity, anchor);
            host.set_confined(identity, true);
            held += 1;
        }
        if held > 0 {
            trace!(held, "confinement enforced");
        }
        held
    }

    /// The session closed. Returns `false` if there was no session.
    ///
    /// Privilege stripped on join is not handed back here; the next
    /// connection has to log in for it.
    pub fn on_disconnect(&mut self, identity: Identity) -> bool {
        match self.sessions.on_disconnect(identity) {
            Some(session) => {
                if !session.is_authenticated() && session.had_elevated_privilege() {
                    warn!(%identity, "left before logging in, elevated privilege stays revoked");
                }
                info!(%identity, authenticated = session.is_authenticated(), "player left");
                true
            }
            None => false,
        }
    }

    /// Parses `line` and runs it for `caller`.
    ///
    /// `caller` is `None` when the line didn't come from a player (e.g.
    /// the server console).
    ///
    /// # Errors
    /// - [`GateError::NoCaller`] for a `None` caller.
    /// - [`GateError::Command`] if the line doesn't parse; the player is
    ///   sent usage or unknown-command feedback.
    /// - Anything [`set_credential`](Self::set_credential) or
    ///   [`login`](Self::login) returns.
    pub fn execute<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        caller: Option<Identity>,
        line: &str,
    ) -> Result<CommandOutcome, GateError> {
        let Some(identity) = caller else {
            warn!("gate command from a non-player source refused");
            return Err(GateError::NoCaller);
        };

        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(e) => {
                let feedback = match &e {
                    CommandError::MissingArgument { command } => Feedback::Usage(*command),
                    CommandError::Unknown(name) => Feedback::UnknownCommand(name.clone()),
                };
                host.send_feedback(identity, &feedback);
                return Err(e.into());
            }
        };

        debug!(%identity, command = command.name(), "gate command");
        match command {
            Command::SetPassword { secret } => self
                .set_credential(host, identity, &secret)
                .map(CommandOutcome::Set),
            Command::Login { secret } => {
                self.login(host, identity, &secret).map(CommandOutcome::Login)
            }
        }
    }

    // -- Veto hook --------------------------------------------------------

    /// Runs the chat checkers.
    pub fn allow_chat(&self, identity: Identity, text: &str) -> bool {
        self.veto.allow_chat(&self.sessions, identity, text)
    }

    /// Runs the command checkers.
    pub fn allow_command(&self, identity: Identity, line: &str) -> bool {
        self.veto.allow_command(&self.sessions, identity, line)
    }

    /// The veto hook, for registering more checkers.
    pub fn veto_mut(&mut self) -> &mut MessageVeto<SessionRegistry> {
        &mut self.veto
    }

    // -- Queries ----------------------------------------------------------

    pub fn is_authenticated(&self, identity: Identity) -> bool {
        self.sessions.is_authenticated(identity)
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.store
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    fn require_session(&self, identity: Identity, command: &'static str) -> Result<(), SessionError> {
        if self.sessions.contains(identity) {
            Ok(())
        } else {
            warn!(%identity, command, "gate command without an active session");
            Err(SessionError::NotFound(identity))
        }
    }
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate")
            .field("config", &self.config)
            .field("credentials", &self.store.len())
            .field("sessions", &self.sessions.len())
            .field("veto", &self.veto)
            .finish()
    }
}
