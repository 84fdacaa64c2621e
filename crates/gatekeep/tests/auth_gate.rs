//! Integration tests for the authentication gate.
//!
//! Each test drives an `AuthGate` the way a host would (join, commands,
//! ticks, disconnect) against a `RecordingHost`, with the credential file
//! in a temp directory.

mod common;

use std::fs;
use std::path::PathBuf;

use common::RecordingHost;
use gatekeep::{
    AuthGate, CommandError, CommandOutcome, Feedback, GateConfig, GateError, Identity,
    LoginOutcome, Position, SetOutcome,
};
use gatekeep_session::SessionError;
use gatekeep_store::StoreError;
use tempfile::TempDir;

// =========================================================================
// Helpers
// =========================================================================

fn alice() -> Identity {
    Identity::from_u128(0xA11CE)
}

fn bob() -> Identity {
    Identity::from_u128(0xB0B)
}

fn spawn() -> Position {
    Position::at(100.5, 64.0, -20.5).facing(90.0, 0.0)
}

fn elsewhere() -> Position {
    Position::at(130.0, 70.0, 5.0)
}

struct Fixture {
    _dir: TempDir,
    path: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("passwords.properties");
        Self { _dir: dir, path }
    }

    fn with_credential(identity: Identity, secret: &str) -> Self {
        let fixture = Self::new();
        fs::write(&fixture.path, format!("#Player Passwords\n{identity}={secret}\n")).unwrap();
        fixture
    }

    fn config(&self) -> GateConfig {
        GateConfig {
            credential_file: self.path.clone(),
            ..GateConfig::default()
        }
    }

    fn gate(&self) -> AuthGate {
        AuthGate::new(self.config())
    }
}

fn join(gate: &mut AuthGate, host: &mut RecordingHost, id: Identity, elevated: bool) {
    host.spawn(id, spawn(), elevated);
    gate.on_join(host, id, spawn(), elevated).expect("join should succeed");
}

// =========================================================================
// Scenario P1: elevated player, no credential yet
// =========================================================================

#[test]
fn test_elevated_player_without_credential_full_flow() {
    let fx = Fixture::new();
    let mut gate = fx.gate();
    let mut host = RecordingHost::new();

    join(&mut gate, &mut host, alice(), true);

    // Confined, de-opped, told to set a credential.
    assert!(host.is_confined(alice()));
    assert!(!host.is_elevated(alice()));
    assert_eq!(
        host.feedback_for(alice()),
        vec![
            Feedback::PrivilegeRevoked,
            Feedback::Welcome,
            Feedback::SetPasswordHint,
            Feedback::LoginAfterSetHint,
        ]
    );

    // setPassword hunter2 is stored and flushed.
    let outcome = gate.execute(&mut host, Some(alice()), "/setPassword hunter2").unwrap();
    assert_eq!(outcome, CommandOutcome::Set(SetOutcome::Stored));
    let on_disk = fs::read_to_string(&fx.path).unwrap();
    assert!(on_disk.contains(&format!("{}=hunter2", alice())));
    assert!(!gate.is_authenticated(alice()));

    // login wrong is rejected.
    let outcome = gate.execute(&mut host, Some(alice()), "/login wrong").unwrap();
    assert_eq!(outcome, CommandOutcome::Login(LoginOutcome::Rejected));
    assert_eq!(host.last_feedback(alice()), Some(Feedback::InvalidPassword));
    assert!(host.is_confined(alice()));
    assert!(!host.is_elevated(alice()));

    // login hunter2 authenticates, restores privilege, releases.
    let outcome = gate.execute(&mut host, Some(alice()), "/login hunter2").unwrap();
    assert_eq!(
        outcome,
        CommandOutcome::Login(LoginOutcome::Authenticated {
            privilege_restored: true
        })
    );
    assert!(gate.is_authenticated(alice()));
    assert!(host.is_elevated(alice()));
    assert!(!host.is_confined(alice()));
    assert_eq!(host.last_feedback(alice()), Some(Feedback::PrivilegeRestored));

    // Later ticks leave the player where they walked to.
    host.walk(alice(), elsewhere());
    assert_eq!(gate.on_tick(&mut host), 0);
    assert_eq!(host.position(alice()), Some(elsewhere()));
}

// =========================================================================
// Scenario P2: regular player with a credential on file
// =========================================================================

#[test]
fn test_regular_player_with_credential_only_logs_in() {
    let fx = Fixture::with_credential(bob(), "letmein");
    let mut gate = fx.gate();
    let mut host = RecordingHost::new();

    join(&mut gate, &mut host, bob(), false);

    assert!(host.is_confined(bob()));
    assert_eq!(host.feedback_for(bob()), vec![Feedback::LoginPrompt]);

    let outcome = gate.login(&mut host, bob(), "letmein").unwrap();

    assert_eq!(
        outcome,
        LoginOutcome::Authenticated {
            privilege_restored: false
        }
    );
    assert!(!host.is_confined(bob()));
    assert!(!host.is_elevated(bob()));
    assert_eq!(host.grants, 0);
    assert_eq!(host.revokes, 0);
}

// =========================================================================
// Scenario: reconnect
// =========================================================================

#[test]
fn test_reconnect_requires_fresh_login() {
    let fx = Fixture::new();
    let mut gate = fx.gate();
    let mut host = RecordingHost::new();

    join(&mut gate, &mut host, alice(), false);
    gate.set_credential(&mut host, alice(), "hunter2").unwrap();
    gate.login(&mut host, alice(), "hunter2").unwrap();
    assert!(gate.on_disconnect(alice()));
    assert!(gate.sessions().get(alice()).is_none());

    host.clear_feedback();
    join(&mut gate, &mut host, alice(), false);

    assert!(!gate.is_authenticated(alice()));
    assert!(host.is_confined(alice()));
    assert_eq!(host.feedback_for(alice()), vec![Feedback::LoginPrompt]);

    let outcome = gate.login(&mut host, alice(), "hunter2").unwrap();
    assert!(matches!(outcome, LoginOutcome::Authenticated { .. }));
}

#[test]
fn test_credential_survives_restart() {
    let fx = Fixture::new();
    let mut host = RecordingHost::new();
    {
        let mut gate = fx.gate();
        join(&mut gate, &mut host, alice(), false);
        gate.set_credential(&mut host, alice(), "hunter2").unwrap();
    }

    let mut gate = fx.gate();
    join(&mut gate, &mut host, alice(), false);

    assert!(gate.credentials().has(alice()));
    let outcome = gate.login(&mut host, alice(), "hunter2").unwrap();
    assert!(matches!(outcome, LoginOutcome::Authenticated { .. }));
}

// =========================================================================
// Properties
// =========================================================================

#[test]
fn test_privilege_after_login_matches_privilege_at_join() {
    for elevated in [false, true] {
        let fx = Fixture::with_credential(alice(), "pw");
        let mut gate = fx.gate();
        let mut host = RecordingHost::new();

        join(&mut gate, &mut host, alice(), elevated);
        assert!(!host.is_elevated(alice()), "never elevated while unauthenticated");

        gate.login(&mut host, alice(), "pw").unwrap();

        assert_eq!(host.is_elevated(alice()), elevated);
    }
}

#[test]
fn test_tick_holds_unauthenticated_player_at_anchor() {
    let fx = Fixture::new();
    let mut gate = fx.gate();
    let mut host = RecordingHost::new();
    join(&mut gate, &mut host, alice(), false);

    for step in 0..10 {
        host.walk(alice(), Position::at(f64::from(step), 64.0, 0.0));
        assert_eq!(gate.on_tick(&mut host), 1);
        assert_eq!(host.position(alice()), Some(spawn()));
        assert!(host.is_confined(alice()));
    }
    assert_eq!(host.teleports, 10);
}

#[test]
fn test_tick_confines_again_after_release() {
    let fx = Fixture::new();
    let mut gate = fx.gate();
    let mut host = RecordingHost::new();
    join(&mut gate, &mut host, alice(), false);

    for _ in 0..3 {
        host.release(alice());
        assert!(!host.is_confined(alice()));

        gate.on_tick(&mut host);

        assert!(host.is_confined(alice()));
    }
}

#[test]
fn test_tick_leaves_authenticated_player_released() {
    let fx = Fixture::with_credential(alice(), "pw");
    let mut gate = fx.gate();
    let mut host = RecordingHost::new();
    join(&mut gate, &mut host, alice(), false);
    gate.login(&mut host, alice(), "pw").unwrap();

    gate.on_tick(&mut host);

    assert!(!host.is_confined(alice()));
}

#[test]
fn test_tick_only_touches_unauthenticated_sessions() {
    let fx = Fixture::with_credential(bob(), "pw");
    let mut gate = fx.gate();
    let mut host = RecordingHost::new();
    join(&mut gate, &mut host, alice(), false);
    join(&mut gate, &mut host, bob(), false);
    gate.login(&mut host, bob(), "pw").unwrap();

    host.walk(alice(), elsewhere());
    host.walk(bob(), elsewhere());
    let held = gate.on_tick(&mut host);

    assert_eq!(held, 1);
    assert_eq!(host.position(alice()), Some(spawn()));
    assert_eq!(host.position(bob()), Some(elsewhere()));
}

#[test]
fn test_second_set_keeps_original_credential() {
    let fx = Fixture::new();
    let mut gate = fx.gate();
    let mut host = RecordingHost::new();
    join(&mut gate, &mut host, alice(), false);

    gate.set_credential(&mut host, alice(), "first").unwrap();
    let outcome = gate.set_credential(&mut host, alice(), "second").unwrap();

    assert_eq!(outcome, SetOutcome::AlreadySet);
    assert_eq!(host.last_feedback(alice()), Some(Feedback::AlreadySet));
    assert!(gate.credentials().verify(alice(), "first"));
    assert!(!gate.credentials().verify(alice(), "second"));
}

#[test]
fn test_login_is_idempotent_once_authenticated() {
    let fx = Fixture::with_credential(alice(), "pw");
    let mut gate = fx.gate();
    let mut host = RecordingHost::new();
    join(&mut gate, &mut host, alice(), true);

    gate.login(&mut host, alice(), "pw").unwrap();
    let second = gate.login(&mut host, alice(), "pw").unwrap();

    assert_eq!(second, LoginOutcome::AlreadyAuthenticated);
    assert_eq!(host.last_feedback(alice()), Some(Feedback::AlreadyAuthenticated));
    assert_eq!(host.grants, 1, "privilege restored exactly once");
}

#[test]
fn test_wrong_login_changes_nothing() {
    let fx = Fixture::with_credential(alice(), "pw");
    let mut gate = fx.gate();
    let mut host = RecordingHost::new();
    join(&mut gate, &mut host, alice(), true);

    for attempt in ["PW", "pw ", "", "letmein"] {
        let outcome = gate.login(&mut host, alice(), attempt).unwrap();
        assert_eq!(outcome, LoginOutcome::Rejected);
    }

    let session = gate.sessions().get(alice()).unwrap();
    assert!(!session.is_authenticated());
    assert_eq!(session.anchor(), spawn());
    assert!(session.had_elevated_privilege());
    assert!(!host.is_elevated(alice()));
    assert_eq!(host.grants, 0);
}

#[test]
fn test_login_without_credential_always_fails() {
    let fx = Fixture::new();
    let mut gate = fx.gate();
    let mut host = RecordingHost::new();
    join(&mut gate, &mut host, alice(), false);

    let outcome = gate.login(&mut host, alice(), "anything").unwrap();

    assert_eq!(outcome, LoginOutcome::Rejected);
    assert!(host.is_confined(alice()));
}

// =========================================================================
// Errors and protocol misuse
// =========================================================================

#[test]
fn test_duplicate_join_is_rejected_without_side_effects() {
    let fx = Fixture::new();
    let mut gate = fx.gate();
    let mut host = RecordingHost::new();
    join(&mut gate, &mut host, alice(), false);
    host.clear_feedback();

    let result = gate.on_join(&mut host, alice(), elsewhere(), true);

    assert!(matches!(
        result,
        Err(GateError::Session(SessionError::AlreadyConnected(id))) if id == alice()
    ));
    assert!(host.feedback_for(alice()).is_empty());
    assert_eq!(gate.sessions().get(alice()).unwrap().anchor(), spawn());
}

#[test]
fn test_execute_without_caller_is_refused() {
    let fx = Fixture::new();
    let mut gate = fx.gate();
    let mut host = RecordingHost::new();

    let result = gate.execute(&mut host, None, "/setPassword hunter2");

    let err = result.unwrap_err();
    assert!(matches!(err, GateError::NoCaller));
    assert_eq!(err.to_string(), "this command can only be executed by a player");
    assert!(gate.credentials().is_empty());
}

#[test]
fn test_command_without_session_is_refused() {
    let fx = Fixture::new();
    let mut gate = fx.gate();
    let mut host = RecordingHost::new();

    let result = gate.execute(&mut host, Some(bob()), "/setPassword hunter2");

    assert!(matches!(
        result,
        Err(GateError::Session(SessionError::NotFound(id))) if id == bob()
    ));
    assert!(!gate.credentials().has(bob()));
}

#[test]
fn test_execute_missing_argument_sends_usage() {
    let fx = Fixture::new();
    let mut gate = fx.gate();
    let mut host = RecordingHost::new();
    join(&mut gate, &mut host, alice(), false);

    let result = gate.execute(&mut host, Some(alice()), "/login");

    assert!(matches!(
        result,
        Err(GateError::Command(CommandError::MissingArgument { .. }))
    ));
    assert_eq!(host.last_feedback(alice()), Some(Feedback::Usage("login")));
}

#[test]
fn test_execute_unknown_command_sends_feedback() {
    let fx = Fixture::new();
    let mut gate = fx.gate();
    let mut host = RecordingHost::new();
    join(&mut gate, &mut host, alice(), false);

    let result = gate.execute(&mut host, Some(alice()), "/Login hunter2");

    assert!(matches!(result, Err(GateError::Command(CommandError::Unknown(_)))));
    assert_eq!(
        host.last_feedback(alice()),
        Some(Feedback::UnknownCommand("Login".into()))
    );
}

#[test]
fn test_execute_keeps_whitespace_in_secret() {
    let fx = Fixture::new();
    let mut gate = fx.gate();
    let mut host = RecordingHost::new();
    join(&mut gate, &mut host, alice(), false);

    gate.execute(&mut host, Some(alice()), "/setPassword  two  words ").unwrap();

    assert!(gate.credentials().verify(alice(), " two  words "));
    assert!(!gate.credentials().verify(alice(), "two words"));
}

#[test]
fn test_flush_failure_reports_and_stays_unauthenticated() {
    let dir = tempfile::tempdir().unwrap();
    let config = GateConfig {
        credential_file: dir.path().join("missing-dir").join("passwords.properties"),
        ..GateConfig::default()
    };
    let mut gate = AuthGate::new(config);
    let mut host = RecordingHost::new();
    join(&mut gate, &mut host, alice(), false);

    let result = gate.set_credential(&mut host, alice(), "hunter2");

    assert!(matches!(result, Err(GateError::Store(StoreError::Flush { .. }))));
    assert_eq!(host.last_feedback(alice()), Some(Feedback::SetFailed));
    assert!(!gate.is_authenticated(alice()));
    assert!(host.is_confined(alice()));
    // The record is kept in memory; a second set is refused.
    assert_eq!(
        gate.set_credential(&mut host, alice(), "other").unwrap(),
        SetOutcome::AlreadySet
    );
}

// =========================================================================
// Veto policies
// =========================================================================

#[test]
fn test_default_config_vetoes_nothing() {
    let fx = Fixture::new();
    let mut gate = fx.gate();
    let mut host = RecordingHost::new();
    join(&mut gate, &mut host, alice(), false);

    assert!(gate.allow_chat(alice(), "hello"));
    assert!(gate.allow_command(alice(), "/tp 0 0 0"));
}

#[test]
fn test_block_chat_until_authenticated() {
    let fx = Fixture::with_credential(alice(), "pw");
    let mut gate = AuthGate::new(GateConfig {
        block_chat_until_authenticated: true,
        ..fx.config()
    });
    let mut host = RecordingHost::new();
    join(&mut gate, &mut host, alice(), false);

    assert!(!gate.allow_chat(alice(), "hello"));
    gate.login(&mut host, alice(), "pw").unwrap();
    assert!(gate.allow_chat(alice(), "hello"));
}

#[test]
fn test_restrict_commands_until_authenticated() {
    let fx = Fixture::with_credential(alice(), "pw");
    let mut gate = AuthGate::new(GateConfig {
        restrict_commands_until_authenticated: true,
        ..fx.config()
    });
    let mut host = RecordingHost::new();
    join(&mut gate, &mut host, alice(), false);

    assert!(!gate.allow_command(alice(), "/tp 0 0 0"));
    assert!(gate.allow_command(alice(), "/login pw"));
    assert!(gate.allow_command(alice(), "setPassword pw"));

    gate.login(&mut host, alice(), "pw").unwrap();
    assert!(gate.allow_command(alice(), "/tp 0 0 0"));
}

#[test]
fn test_registered_checker_runs_after_builtin_policies() {
    let fx = Fixture::new();
    let mut gate = AuthGate::new(GateConfig {
        block_chat_until_authenticated: true,
        ..fx.config()
    });
    gate.veto_mut()
        .register_chat("no-caps", |_, _, text| text != text.to_uppercase());
    let mut host = RecordingHost::new();
    join(&mut gate, &mut host, alice(), false);
    gate.set_credential(&mut host, alice(), "pw").unwrap();
    gate.login(&mut host, alice(), "pw").unwrap();

    assert!(gate.allow_chat(alice(), "quiet"));
    assert!(!gate.allow_chat(alice(), "LOUD"));
}
