//! Every line the gate shows a player.

use std::fmt;

/// A user-visible message from the gate.
///
/// The gate decides *which* message a player gets; the host decides how
/// to render it. `Display` gives the standard English text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    /// First line of onboarding for an identity with no credential.
    Welcome,
    /// How to set a credential.
    SetPasswordHint,
    /// What to do after setting one.
    LoginAfterSetHint,
    /// Onboarding for an identity that already has a credential.
    LoginPrompt,
    /// The credential was stored.
    PasswordSet,
    /// Follows [`Feedback::PasswordSet`].
    LoginHint,
    /// A credential exists and can't be changed.
    AlreadySet,
    /// Storing the credential failed.
    SetFailed,
    LoginSucceeded,
    InvalidPassword,
    /// A login arrived for a session that is already authenticated.
    AlreadyAuthenticated,
    /// Elevated privilege was stripped on join.
    PrivilegeRevoked,
    /// Elevated privilege was handed back after login.
    PrivilegeRestored,
    /// A gate command was missing its argument. Holds the command name.
    Usage(&'static str),
    /// The line didn't name a gate command. Holds what was typed.
    UnknownCommand(String),
    /// A chat line or command was vetoed.
    MessageBlocked,
}

impl Feedback {
    /// The lines sent on join.
    pub fn onboarding(has_credential: bool) -> Vec<Feedback> {
        if has_credential {
            vec![Feedback::LoginPrompt]
        } else {
            vec![
                Feedback::Welcome,
                Feedback::SetPasswordHint,
                Feedback::LoginAfterSetHint,
            ]
        }
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Welcome => f.write_str("Welcome to the server! To play, you need to set a password."),
            Self::SetPasswordHint => {
                f.write_str("Use the command /setPassword <password> to set your password.")
            }
            Self::LoginAfterSetHint => f.write_str(
                "After setting your password, use /login <password> to log in and start playing.",
            ),
            Self::LoginPrompt => f.write_str(
                "Please enter your password using /login <your password> to start playing.",
            ),
            Self::PasswordSet => f.write_str("Password set successfully!"),
            Self::LoginHint => f.write_str("You can now log in using /login <password>."),
            Self::AlreadySet => {
                f.write_str("You have already set a password and cannot modify it.")
            }
            Self::SetFailed => f.write_str("Failed to set password. Please try again."),
            Self::LoginSucceeded => f.write_str("Login successful! Enjoy playing on the server."),
            Self::InvalidPassword => f.write_str("Invalid password. Please try again."),
            Self::AlreadyAuthenticated => f.write_str("You are already logged in."),
            Self::PrivilegeRevoked => f.write_str(
                "You have been temporarily de-opped. Please enter your password to regain operator status.",
            ),
            Self::PrivilegeRestored => f.write_str("Your operator status has been restored."),
            Self::Usage(command) => write!(f, "Usage: /{command} <password>"),
            Self::UnknownCommand(name) => write!(f, "Unknown command: {name}"),
            Self::MessageBlocked => f.write_str("You must log in before you can do that."),
        }
    }
}
