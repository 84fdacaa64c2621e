//! A `Host` that just writes down what the gate asked for.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};

use gatekeep::{Feedback, Host, Identity, Position};

#[derive(Debug, Default)]
pub struct RecordingHost {
    elevated: HashSet<Identity>,
    confined: HashMap<Identity, bool>,
    positions: HashMap<Identity, Position>,
    feedback: Vec<(Identity, Feedback)>,
    pub grants: usize,
    pub revokes: usize,
    pub teleports: usize,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts a player in the world, as the host would before telling the
    /// gate about the join.
    pub fn spawn(&mut self, identity: Identity, position: Position, elevated: bool) {
        self.positions.insert(identity, position);
        if elevated {
            self.elevated.insert(identity);
        }
    }

    /// The player walks somewhere on their own.
    pub fn walk(&mut self, identity: Identity, position: Position) {
        self.positions.insert(identity, position);
    }

    /// Something outside the gate lifts the player's confinement.
    pub fn release(&mut self, identity: Identity) {
        self.confined.insert(identity, false);
    }

    pub fn position(&self, identity: Identity) -> Option<Position> {
        self.positions.get(&identity).copied()
    }

    pub fn is_elevated(&self, identity: Identity) -> bool {
        self.elevated.contains(&identity)
    }

    pub fn is_confined(&self, identity: Identity) -> bool {
        self.confined.get(&identity).copied().unwrap_or(false)
    }

    pub fn feedback_for(&self, identity: Identity) -> Vec<Feedback> {
        self.feedback
            .iter()
            .filter(|(id, _)| *id == identity)
            .map(|(_, f)| f.clone())
            .collect()
    }

    pub fn last_feedback(&self, identity: Identity) -> Option<Feedback> {
        self.feedback_for(identity).pop()
    }

    pub fn clear_feedback(&mut self) {
        self.feedback.clear();
    }
}

impl Host for RecordingHost {
    fn has_elevated_privilege(&self, identity: Identity) -> bool {
        self.elevated.contains(&identity)
    }

    fn grant_elevated_privilege(&mut self, identity: Identity) {
        self.grants += 1;
        self.elevated.insert(identity);
    }

    fn revoke_elevated_privilege(&mut self, identity: Identity) {
        self.revokes += 1;
        self.elevated.remove(&identity);
    }

    fn set_confined(&mut self, identity: Identity, confined: bool) {
        self.confined.insert(identity, confined);
    }

    fn teleport(&mut self, identity: Identity, position: Position) {
        self.teleports += 1;
        self.positions.insert(identity, position);
    }

    fn send_feedback(&mut self, identity: Identity, feedback: &Feedback) {
        self.feedback.push((identity, feedback.clone()));
    }
}
