//! Host actor: one Tokio task that owns the gate and the world.
//!
//! Connection tasks never touch [`AuthGate`] or [`World`] directly. They
//! send [`HostEvent`]s through a [`HostHandle`]; the actor applies them
//! one at a time, interleaved with server ticks, so a join is always
//! registered before that session's first tick.

use gatekeep::{AuthGate, CommandOutcome, Feedback, GateError, Host};
use gatekeep_protocol::{Identity, Position};
use gatekeep_session::SessionError;
use gatekeep_tick::{TickConfig, TickScheduler};
use tokio::sync::{mpsc, oneshot};

use crate::ServerError;
use crate::world::{Outbox, World};

/// Default capacity of the event channel.
pub const EVENT_CHANNEL_SIZE: usize = 256;

/// Everything the outside world can ask of the host actor.
///
/// Variants with a `reply` carry a oneshot channel for the result.
#[derive(Debug)]
pub(crate) enum HostEvent {
    Join {
        identity: Identity,
        name: String,
        outbox: Outbox,
        reply: oneshot::Sender<Result<(), GateError>>,
    },
    Chat {
        identity: Identity,
        text: String,
    },
    Command {
        identity: Identity,
        line: String,
    },
    Move {
        identity: Identity,
        position: Position,
    },
    Leave {
        identity: Identity,
    },
    /// A command line from the server console (no player behind it).
    Console {
        line: String,
        reply: oneshot::Sender<Result<CommandOutcome, GateError>>,
    },
    Shutdown,
}

/// Handle to the running host actor. Cheap to clone.
#[derive(Debug, Clone)]
pub struct HostHandle {
    sender: mpsc::Sender<HostEvent>,
}

impl HostHandle {
    /// Puts a player into the world and runs the gate's join handling.
    ///
    /// Everything the player should see (welcome, prompts, game mode) is
    /// queued on `outbox` before this returns.
    pub async fn join(
        &self,
        identity: Identity,
        name: String,
        outbox: Outbox,
    ) -> Result<(), ServerError> {
        let (reply, rx) = oneshot::channel();
        self.send(HostEvent::Join {
            identity,
            name,
            outbox,
            reply,
        })
        .await?;
        rx.await.map_err(|_| ServerError::HostStopped)??;
        Ok(())
    }

    pub async fn chat(&self, identity: Identity, text: String) -> Result<(), ServerError> {
        self.send(HostEvent::Chat { identity, text }).await
    }

    pub async fn command(&self, identity: Identity, line: String) -> Result<(), ServerError> {
        self.send(HostEvent::Command { identity, line }).await
    }

    pub async fn move_to(
        &self,
        identity: Identity,
        position: Position,
    ) -> Result<(), ServerError> {
        self.send(HostEvent::Move { identity, position }).await
    }

    pub async fn leave(&self, identity: Identity) -> Result<(), ServerError> {
        self.send(HostEvent::Leave { identity }).await
    }

    /// Runs a gate command with no player as the caller.
    pub async fn console(&self, line: String) -> Result<CommandOutcome, ServerError> {
        let (reply, rx) = oneshot::channel();
        self.send(HostEvent::Console { line, reply }).await?;
        Ok(rx.await.map_err(|_| ServerError::HostStopped)??)
    }

    /// Stops the actor after the events already queued.
    pub async fn shutdown(&self) -> Result<(), ServerError> {
        self.send(HostEvent::Shutdown).await
    }

    async fn send(&self, event: HostEvent) -> Result<(), ServerError> {
        self.sender
            .send(event)
            .await
            .map_err(|_| ServerError::HostStopped)
    }
}

struct HostActor {
    gate: AuthGate,
    world: World,
    clock: TickScheduler,
    receiver: mpsc::Receiver<HostEvent>,
}

impl HostActor {
    async fn run(mut self) {
        tracing::info!(
            tick_rate_hz = self.clock.tick_rate_hz(),
            "host actor started"
        );

        loop {
            tokio::select! {
                event = self.receiver.recv() => match event {
                    Some(HostEvent::Shutdown) | None => break,
                    Some(event) => self.handle(event),
                },
                _ = self.clock.wait_for_tick() => {
                    self.gate.on_tick(&mut self.world);
                    self.clock.record_tick_end();
                }
            }
        }

        tracing::info!(
            ticks = self.clock.tick_count(),
            online = self.world.online(),
            "host actor stopped"
        );
    }

    fn handle(&mut self, event: HostEvent) {
        match event {
            HostEvent::Join {
                identity,
                name,
                outbox,
                reply,
            } => {
                let _ = reply.send(self.handle_join(identity, name, outbox));
            }
            HostEvent::Chat { identity, text } => self.handle_chat(identity, &text),
            HostEvent::Command { identity, line } => self.handle_command(identity, &line),
            HostEvent::Move { identity, position } => self.world.move_avatar(identity, position),
            HostEvent::Leave { identity } => {
                self.gate.on_disconnect(identity);
                self.world.leave(identity);
            }
            HostEvent::Console { line, reply } => {
                let result = self.gate.execute(&mut self.world, None, &line);
                let _ = reply.send(result);
            }
            HostEvent::Shutdown => {}
        }
    }

    fn handle_join(
        &mut self,
        identity: Identity,
        name: String,
        outbox: Outbox,
    ) -> Result<(), GateError> {
        let Some(position) = self.world.enter(identity, name, outbox) else {
            return Err(SessionError::AlreadyConnected(identity).into());
        };
        let elevated = self.world.has_elevated_privilege(identity);
        let result = self.gate.on_join(&mut self.world, identity, position, elevated);
        if result.is_err() {
            self.world.leave(identity);
        }
        result
    }

    fn handle_chat(&mut self, identity: Identity, text: &str) {
        if self.gate.allow_chat(identity, text) {
            self.world.broadcast_chat(identity, text);
        } else {
            self.world.send_feedback(identity, &Feedback::MessageBlocked);
        }
    }

    fn handle_command(&mut self, identity: Identity, line: &str) {
        if !self.gate.allow_command(identity, line) {
            self.world.send_feedback(identity, &Feedback::MessageBlocked);
            return;
        }
        // The gate's two commands are the only ones this host knows; the
        // gate answers anything else with an unknown-command reply.
        if let Err(e) = self.gate.execute(&mut self.world, Some(identity), line) {
            tracing::debug!(%identity, error = %e, "command not completed");
        }
    }
}

/// Spawns the host actor and returns a handle to it.
pub fn spawn_host(gate: AuthGate, world: World, tick: TickConfig) -> HostHandle {
    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
    let actor = HostActor {
        gate,
        world,
        clock: TickScheduler::new(tick),
        receiver: rx,
    };
    tokio::spawn(actor.run());
    HostHandle { sender: tx }
}
