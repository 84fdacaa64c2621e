//! Stripping and restoring elevated privilege across login.

use gatekeep_protocol::Identity;
use tracing::info;

use crate::{Feedback, Host};

/// Moves elevated privilege out of reach until a session authenticates.
///
/// Both operations check the host's current state first, so calling
/// either one twice changes nothing the second time. Each call tells the
/// player what happened.
pub struct PrivilegeGuard;

impl PrivilegeGuard {
    /// Revokes elevated privilege and sends [`Feedback::PrivilegeRevoked`].
    pub fn strip<H: Host + ?Sized>(host: &mut H, identity: Identity) {
        if host.has_elevated_privilege(identity) {
            host.revoke_elevated_privilege(identity);
            info!(%identity, "elevated privilege stripped until login");
        }
        host.send_feedback(identity, &Feedback::PrivilegeRevoked);
    }

    /// Grants elevated privilege back and sends
    /// [`Feedback::PrivilegeRestored`].
    ///
    /// Only call this for a session whose join snapshot was elevated.
    pub fn restore<H: Host + ?Sized>(host: &mut H, identity: Identity) {
        if !host.has_elevated_privilege(identity) {
            host.grant_elevated_privilege(identity);
            info!(%identity, "elevated privilege restored");
        }
        host.send_feedback(identity, &Feedback::PrivilegeRestored);
    }
}
