//! The reference host's world: avatars, operators, and outbound queues.
//!
//! `World` is what the gate acts on through [`Host`]. Confinement maps to
//! game mode (confined = spectator, released = survival); every change
//! the gate makes is pushed to the affected player's connection as a
//! [`ServerMessage`].

use std::collections::{HashMap, HashSet};

use gatekeep::{Feedback, Host};
use gatekeep_protocol::{GameMode, Identity, Position, ServerMessage};
use tokio::sync::mpsc;

/// Channel for delivering messages to one player's connection task.
pub type Outbox = mpsc::UnboundedSender<ServerMessage>;

/// One player in the world.
#[derive(Debug)]
pub struct Avatar {
    name: String,
    position: Position,
    confined: bool,
    outbox: Outbox,
}

impl Avatar {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_confined(&self) -> bool {
        self.confined
    }

    pub fn game_mode(&self) -> GameMode {
        if self.confined {
            GameMode::Spectator
        } else {
            GameMode::Survival
        }
    }
}

#[derive(Debug)]
pub struct World {
    spawn: Position,
    avatars: HashMap<Identity, Avatar>,
    operators: HashSet<Identity>,
}

impl World {
    /// An empty world. `operators` hold elevated privilege from the start.
    pub fn new(spawn: Position, operators: impl IntoIterator<Item = Identity>) -> Self {
        Self {
            spawn,
            avatars: HashMap::new(),
            operators: operators.into_iter().collect(),
        }
    }

    pub fn spawn_point(&self) -> Position {
        self.spawn
    }

    /// Places a new avatar at the spawn point and sends it `Welcome`.
    ///
    /// Returns the position it entered at. An identity already in the
    /// world keeps its avatar and gets `None`.
    pub fn enter(&mut self, identity: Identity, name: String, outbox: Outbox) -> Option<Position> {
        if self.avatars.contains_key(&identity) {
            return None;
        }
        let avatar = Avatar {
            name,
            position: self.spawn,
            confined: false,
            outbox,
        };
        let _ = avatar.outbox.send(ServerMessage::Welcome {
            identity,
            position: avatar.position,
            game_mode: avatar.game_mode(),
        });
        tracing::debug!(%identity, name = %avatar.name, "avatar entered world");
        self.avatars.insert(identity, avatar);
        Some(self.spawn)
    }

    /// Removes the avatar. Operator status is left as it is.
    pub fn leave(&mut self, identity: Identity) -> Option<Avatar> {
        self.avatars.remove(&identity)
    }

    /// The player moved on their own.
    pub fn move_avatar(&mut self, identity: Identity, position: Position) {
        if let Some(avatar) = self.avatars.get_mut(&identity) {
            avatar.position = position;
        }
    }

    /// Sends `text` from `from` to everyone in the world.
    pub fn broadcast_chat(&self, from: Identity, text: &str) {
        let Some(sender) = self.avatars.get(&from) else {
            return;
        };
        for avatar in self.avatars.values() {
            let _ = avatar.outbox.send(ServerMessage::Chat {
                from: sender.name.clone(),
                text: text.to_string(),
            });
        }
    }

    /// Sends one message to one player. Unknown identities are ignored.
    pub fn send(&self, identity: Identity, message: ServerMessage) {
        if let Some(avatar) = self.avatars.get(&identity) {
            // A closed outbox means the connection is going away; its
            // Leave event is already on the way.
            let _ = avatar.outbox.send(message);
        }
    }

    pub fn avatar(&self, identity: Identity) -> Option<&Avatar> {
        self.avatars.get(&identity)
    }

    pub fn contains(&self, identity: Identity) -> bool {
        self.avatars.contains_key(&identity)
    }

    pub fn is_operator(&self, identity: Identity) -> bool {
        self.operators.contains(&identity)
    }

    pub fn online(&self) -> usize {
        self.avatars.len()
    }
}

impl Host for World {
    fn has_elevated_privilege(&self, identity: Identity) -> bool {
        self.operators.contains(&identity)
    }

    fn grant_elevated_privilege(&mut self, identity: Identity) {
        if self.operators.insert(identity) {
            self.send(identity, ServerMessage::OperatorChanged { operator: true });
        }
    }

    fn revoke_elevated_privilege(&mut self, identity: Identity) {
        if self.operators.remove(&identity) {
            self.send(identity, ServerMessage::OperatorChanged { operator: false });
        }
    }

    fn set_confined(&mut self, identity: Identity, confined: bool) {
        let Some(avatar) = self.avatars.get_mut(&identity) else {
            return;
        };
        if avatar.confined != confined {
            avatar.confined = confined;
            let game_mode = avatar.game_mode();
            let _ = avatar.outbox.send(ServerMessage::GameModeChanged { game_mode });
        }
    }

    fn teleport(&mut self, identity: Identity, position: Position) {
        let Some(avatar) = self.avatars.get_mut(&identity) else {
            return;
        };
        // Enforcement runs every tick; only tell the client when it
        // actually moved.
        if avatar.position != position {
            avatar.position = position;
            let _ = avatar.outbox.send(ServerMessage::Teleported { position });
        }
    }

    fn send_feedback(&mut self, identity: Identity, feedback: &Feedback) {
        self.send(
            identity,
            ServerMessage::Feedback {
                text: feedback.to_string(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use gatekeep::{AuthGate, GateConfig};

    use super::*;

    fn alice() -> Identity {
        Identity::from_u128(1)
    }

    fn world_with_alice(op: bool) -> (World, mpsc::UnboundedReceiver<ServerMessage>) {
        let ops: Vec<Identity> = if op { vec![alice()] } else { Vec::new() };
        let mut world = World::new(Position::at(0.0, 64.0, 0.0), ops);
        let (tx, mut rx) = mpsc::unbounded_channel();
        world.enter(alice(), "alice".into(), tx).unwrap();
        // Drain the Welcome.
        assert!(matches!(rx.try_recv(), Ok(ServerMessage::Welcome { .. })));
        (world, rx)
    }

    #[test]
    fn test_enter_sends_welcome_at_spawn() {
        let mut world = World::new(Position::at(1.0, 2.0, 3.0), Vec::<Identity>::new());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let pos = world.enter(alice(), "alice".into(), tx);

        assert_eq!(pos, Some(Position::at(1.0, 2.0, 3.0)));
        assert_eq!(
            rx.try_recv().unwrap(),
            ServerMessage::Welcome {
                identity: alice(),
                position: Position::at(1.0, 2.0, 3.0),
                game_mode: GameMode::Survival,
            }
        );
    }

    #[test]
    fn test_enter_twice_keeps_first_avatar() {
        let (mut world, _rx) = world_with_alice(false);
        let (tx, _rx2) = mpsc::unbounded_channel();

        assert!(world.enter(alice(), "impostor".into(), tx).is_none());
        assert_eq!(world.avatar(alice()).unwrap().name(), "alice");
    }

    #[test]
    fn test_set_confined_switches_game_mode_once() {
        let (mut world, mut rx) = world_with_alice(false);

        world.set_confined(alice(), true);
        world.set_confined(alice(), true);

        assert_eq!(
            rx.try_recv().unwrap(),
            ServerMessage::GameModeChanged {
                game_mode: GameMode::Spectator
            }
        );
        assert!(rx.try_recv().is_err(), "no message when nothing changed");
        assert!(world.avatar(alice()).unwrap().is_confined());
    }

    #[test]
    fn test_teleport_only_reports_real_moves() {
        let (mut world, mut rx) = world_with_alice(false);
        let spawn = world.spawn_point();

        world.teleport(alice(), spawn);
        assert!(rx.try_recv().is_err());

        world.move_avatar(alice(), Position::at(9.0, 64.0, 9.0));
        world.teleport(alice(), spawn);
        assert_eq!(
            rx.try_recv().unwrap(),
            ServerMessage::Teleported { position: spawn }
        );
        assert_eq!(world.avatar(alice()).unwrap().position(), spawn);
    }

    #[test]
    fn test_privilege_changes_are_reported() {
        let (mut world, mut rx) = world_with_alice(true);
        assert!(world.has_elevated_privilege(alice()));

        world.revoke_elevated_privilege(alice());
        world.revoke_elevated_privilege(alice());
        world.grant_elevated_privilege(alice());

        assert_eq!(
            rx.try_recv().unwrap(),
            ServerMessage::OperatorChanged { operator: false }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            ServerMessage::OperatorChanged { operator: true }
        );
        assert!(rx.try_recv().is_err());
        assert!(world.is_operator(alice()));
    }

    #[test]
    fn test_send_feedback_renders_text() {
        let (mut world, mut rx) = world_with_alice(false);

        world.send_feedback(alice(), &Feedback::LoginPrompt);

        assert_eq!(
            rx.try_recv().unwrap(),
            ServerMessage::Feedback {
                text: Feedback::LoginPrompt.to_string()
            }
        );
    }

    #[test]
    fn test_gate_tick_confines_released_avatar() {
        let dir = tempfile::tempdir().unwrap();
        let mut gate = AuthGate::new(GateConfig {
            credential_file: dir.path().join("passwords.properties"),
            ..GateConfig::default()
        });
        let (mut world, mut rx) = world_with_alice(false);
        let spawn = world.spawn_point();
        gate.on_join(&mut world, alice(), spawn, false).unwrap();
        while rx.try_recv().is_ok() {}

        world.set_confined(alice(), false);
        assert_eq!(
            rx.try_recv().unwrap(),
            ServerMessage::GameModeChanged {
                game_mode: GameMode::Survival
            }
        );

        gate.on_tick(&mut world);

        assert_eq!(
            rx.try_recv().unwrap(),
            ServerMessage::GameModeChanged {
                game_mode: GameMode::Spectator
            }
        );
        assert!(world.avatar(alice()).unwrap().is_confined());
    }

    #[test]
    fn test_host_calls_for_unknown_identity_are_ignored() {
        let mut world = World::new(Position::default(), Vec::<Identity>::new());
        let stranger = Identity::from_u128(99);

        world.set_confined(stranger, true);
        world.teleport(stranger, Position::at(1.0, 1.0, 1.0));
        world.send_feedback(stranger, &Feedback::Welcome);

        assert_eq!(world.online(), 0);
    }
}
