//! Authentication stage derived from a session.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Session;

/// Where a session stands in the login, verify, access sequence.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuthStage {
    /// No user is logged in.
    Anonymous,
    /// Logged in, biometric verification still required.
    PendingBiometric,
    /// Logged in and verified.
    Authorized,
}

impl AuthStage {
    /// Classify a session snapshot.
    #[must_use]
    pub const fn of(session: &Session) -> Self {
        match (session.user.is_some(), session.biometric_verified) {
            (false, _) => Self::Anonymous,
            (true, false) => Self::PendingBiometric,
            (true, true) => Self::Authorized,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::PendingBiometric => "pending_biometric",
            Self::Authorized => "authorized",
        }
    }
}
