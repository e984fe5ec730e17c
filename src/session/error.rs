//! Errors surfaced by session operations.
//!
//! Neither kind is fatal: the session is left exactly as it was and the
//! caller shows the message so the user can resubmit.

use thiserror::Error;

/// Login failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("identity service unavailable: {0}")]
    Unavailable(String),
    /// A later session change was applied while this login was in flight.
    #[error("login superseded by a later session change")]
    Superseded,
}

/// Biometric verification failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerificationError {
    #[error("no user is logged in")]
    NoSession,
    #[error("biometric verification rejected")]
    Rejected,
    #[error("biometric service unavailable: {0}")]
    Unavailable(String),
    /// The session changed (logout, new login) while the proof was checked.
    #[error("verification superseded by a later session change")]
    Superseded,
}

impl AuthError {
    /// Message safe to show to the end user.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "Invalid username or password.",
            Self::Unavailable(_) => "Sign in is temporarily unavailable, please try again.",
            Self::Superseded => "Your session changed while signing in, please try again.",
        }
    }
}

impl VerificationError {
    /// Message safe to show to the end user.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::NoSession => "Please sign in first.",
            Self::Rejected => "Biometric verification failed.",
            Self::Unavailable(_) => "Verification is temporarily unavailable, please try again.",
            Self::Superseded => "Your session changed during verification, please try again.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_hide_service_details() {
        let err = AuthError::Unavailable("connection refused to 10.0.0.7".to_string());
        assert!(err.to_string().contains("10.0.0.7"));
        assert!(!err.user_message().contains("10.0.0.7"));

        let err = VerificationError::Unavailable("timeout".to_string());
        assert!(!err.user_message().contains("timeout"));
    }
}
