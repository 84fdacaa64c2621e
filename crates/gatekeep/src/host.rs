//! The seam between the gate and the server it runs inside.

use gatekeep_protocol::{Identity, Position};

use crate::Feedback;

/// What the gate needs from the host server.
///
/// The gate never owns player objects. It asks the host to act on an
/// [`Identity`] through these primitives, and the host decides what each
/// one means in its world (operator lists, game modes, chat lines).
///
/// Calls for an identity the host doesn't know should be ignored.
pub trait Host {
    /// Whether the identity currently holds elevated privilege.
    fn has_elevated_privilege(&self, identity: Identity) -> bool;

    /// Grants elevated privilege.
    fn grant_elevated_privilege(&mut self, identity: Identity);

    /// Revokes elevated privilege.
    fn revoke_elevated_privilege(&mut self, identity: Identity);

    /// Puts the identity into (or releases it from) the restricted
    /// observer state: it can see the world but not act in it.
    fn set_confined(&mut self, identity: Identity, confined: bool);

    /// Moves the identity to `position`.
    fn teleport(&mut self, identity: Identity, position: Position);

    /// Shows the identity one line of feedback.
    fn send_feedback(&mut self, identity: Identity, feedback: &Feedback);
}
