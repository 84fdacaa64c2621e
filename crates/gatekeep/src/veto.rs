//! Pre-send veto hook for chat lines and commands.
//!
//! Any component can register a checker. A message goes through only if
//! every checker in its list approves; evaluation stops at the first
//! rejection, in registration order. Chat and commands have separate
//! lists.
//!
//! Checkers receive a shared context `C` (the gate uses its
//! [`SessionRegistry`](gatekeep_session::SessionRegistry)) so they can
//! make decisions based on state they don't own.

use gatekeep_protocol::Identity;
use tracing::debug;

/// A registered veto predicate. Returns `true` to allow.
pub type Checker<C> = Box<dyn Fn(&C, Identity, &str) -> bool + Send + Sync>;

struct Registered<C> {
    name: &'static str,
    check: Checker<C>,
}

/// Ordered chat and command checker lists.
pub struct MessageVeto<C> {
    chat: Vec<Registered<C>>,
    commands: Vec<Registered<C>>,
}

impl<C> Default for MessageVeto<C> {
    fn default() -> Self {
        Self {
            chat: Vec::new(),
            commands: Vec::new(),
        }
    }
}

impl<C> MessageVeto<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chat checker. `name` shows up in the log when it vetoes.
    pub fn register_chat<F>(&mut self, name: &'static str, check: F)
    where
        F: Fn(&C, Identity, &str) -> bool + Send + Sync + 'static,
    {
        self.chat.push(Registered {
            name,
            check: Box::new(check),
        });
    }

    /// Appends a command checker. Checkers see the line without its
    /// leading `/`.
    pub fn register_command<F>(&mut self, name: &'static str, check: F)
    where
        F: Fn(&C, Identity, &str) -> bool + Send + Sync + 'static,
    {
        self.commands.push(Registered {
            name,
            check: Box::new(check),
        });
    }

    /// Runs the chat list.
    pub fn allow_chat(&self, ctx: &C, identity: Identity, text: &str) -> bool {
        evaluate(&self.chat, ctx, identity, text, "chat")
    }

    /// Runs the command list. A leading `/` is stripped first.
    pub fn allow_command(&self, ctx: &C, identity: Identity, line: &str) -> bool {
        let line = line.strip_prefix('/').unwrap_or(line);
        evaluate(&self.commands, ctx, identity, line, "command")
    }

    pub fn chat_checkers(&self) -> usize {
        self.chat.len()
    }

    pub fn command_checkers(&self) -> usize {
        self.commands.len()
    }
}

fn evaluate<C>(
    list: &[Registered<C>],
    ctx: &C,
    identity: Identity,
    text: &str,
    kind: &'static str,
) -> bool {
    match list.iter().find(|r| !(r.check)(ctx, identity, text)) {
        Some(rejected) => {
            debug!(%identity, kind, checker = rejected.name, "message vetoed");
            false
        }
        None => true,
    }
}

impl<C> std::fmt::Debug for MessageVeto<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = |list: &[Registered<C>]| list.iter().map(|r| r.name).collect::<Vec<_>>();
        f.debug_struct("MessageVeto")
            .field("chat", &names(&self.chat))
            .field("commands", &names(&self.commands))
            .finish()
    }
}
