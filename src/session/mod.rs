//! Process-wide session store.
//!
//! Flow Overview: `login` asks the identity service for a user and stores it
//! with the biometric flag cleared; `verify_biometric` asks the biometric
//! service to confirm the stored user and sets the flag; `logout` clears
//! both. Readers only ever see complete snapshots.
//!
//! Overlapping calls are ordered by tickets taken when each call starts. A
//! call that finishes after a later call has already changed the session is
//! dropped with a `Superseded` error, so the most recent call always wins.

use std::sync::{
    Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
    atomic::{AtomicU64, Ordering},
};

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use crate::services::{BiometricService, IdentityService};

mod error;
mod stage;

pub use self::error::{AuthError, VerificationError};
pub use self::stage::AuthStage;

/// Identity record returned by the identity service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub first_name: String,
}

impl User {
    #[must_use]
    pub fn new(id: impl Into<String>, first_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
        }
    }
}

/// Current actor. `biometric_verified` implies `user.is_some()`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    user: Option<User>,
    biometric_verified: bool,
}

impl Session {
    /// Fresh login: user present, verification pending.
    #[must_use]
    pub const fn signed_in(user: User) -> Self {
        Self {
            user: Some(user),
            biometric_verified: false,
        }
    }

    /// Same user with verification done. Anonymous sessions stay anonymous.
    #[must_use]
    pub fn verified(self) -> Self {
        let biometric_verified = self.user.is_some();
        Self {
            user: self.user,
            biometric_verified,
        }
    }

    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub const fn is_biometric_verified(&self) -> bool {
        self.biometric_verified
    }

    #[must_use]
    pub const fn stage(&self) -> AuthStage {
        AuthStage::of(self)
    }
}

/// Login credentials. The password never appears in `Debug` output.
#[derive(Debug)]
pub struct Credentials {
    username: String,
    password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub const fn password(&self) -> &SecretString {
        &self.password
    }
}

/// Opaque biometric proof forwarded to the biometric service.
#[derive(Debug)]
pub struct BiometricProof(SecretString);

impl BiometricProof {
    #[must_use]
    pub fn new(proof: impl Into<String>) -> Self {
        Self(SecretString::from(proof.into()))
    }

    #[must_use]
    pub const fn expose(&self) -> &SecretString {
        &self.0
    }
}

#[derive(Debug, Default)]
struct Slot {
    session: Session,
    // ticket of the last call that changed `session`
    applied: u64,
}

/// The single session of the process, shared as `Arc<SessionStore>`.
pub struct SessionStore {
    identity: Arc<dyn IdentityService>,
    biometric: Arc<dyn BiometricService>,
    slot: RwLock<Slot>,
    tickets: AtomicU64,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("session", &self.current())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    #[must_use]
    pub fn new(identity: Arc<dyn IdentityService>, biometric: Arc<dyn BiometricService>) -> Self {
        Self {
            identity,
            biometric,
            slot: RwLock::new(Slot::default()),
            tickets: AtomicU64::new(0),
        }
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn current(&self) -> Session {
        self.read().session.clone()
    }

    #[must_use]
    pub fn stage(&self) -> AuthStage {
        self.read().session.stage()
    }

    /// Authenticate and replace the session with a fresh, unverified one.
    ///
    /// # Errors
    /// Returns `AuthError` when the identity service rejects the credentials or
    /// cannot be reached, or when a later call changed the session first. The
    /// session is left untouched in every error case.
    #[instrument(skip_all, fields(username = %credentials.username()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        let ticket = self.next_ticket();

        let user = self.identity.authenticate(credentials).await?;

        let mut slot = self.write();
        if slot.applied > ticket {
            warn!(ticket, applied = slot.applied, "login superseded");
            return Err(AuthError::Superseded);
        }

        info!(user_id = %user.id, "login accepted, biometric verification pending");
        slot.applied = ticket;
        slot.session = Session::signed_in(user);

        Ok(slot.session.clone())
    }

    /// Verify the logged-in user and mark the session as verified.
    ///
    /// # Errors
    /// Returns `VerificationError::NoSession` when nobody is logged in, and the
    /// service or supersede errors otherwise. The session is left untouched in
    /// every error case.
    #[instrument(skip_all)]
    pub async fn verify_biometric(&self, proof: &BiometricProof) -> Result<Session, VerificationError> {
        let (ticket, user) = {
            let slot = self.read();
            let Some(user) = slot.session.user.clone() else {
                return Err(VerificationError::NoSession);
            };
            // Taken under the read lock so a concurrent logout orders after us.
            (self.next_ticket(), user)
        };

        self.biometric.verify(&user, proof).await?;

        let mut slot = self.write();
        if slot.applied > ticket || slot.session.user.as_ref() != Some(&user) {
            warn!(ticket, applied = slot.applied, "verification superseded");
            return Err(VerificationError::Superseded);
        }

        info!(user_id = %user.id, "biometric verification accepted");
        slot.applied = ticket;
        slot.session = std::mem::take(&mut slot.session).verified();

        Ok(slot.session.clone())
    }

    /// Clear the session. Always succeeds and supersedes every call in flight.
    #[instrument(skip_all)]
    pub fn logout(&self) -> Session {
        let mut slot = self.write();
        slot.applied = self.next_ticket();

        if let Some(user) = slot.session.user.take() {
            info!(user_id = %user.id, "logged out");
        }
        slot.session = Session::default();

        slot.session.clone()
    }

    fn next_ticket(&self) -> u64 {
        self.tickets.fetch_add(1, Ordering::SeqCst) + 1
    }

    // Writers replace whole values, so a poisoned lock still holds a valid session.
    fn read(&self) -> RwLockReadGuard<'_, Slot> {
        self.slot.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Slot> {
        self.slot.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
pub(crate) mod test_support;
