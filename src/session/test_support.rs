//! In-memory service fakes shared by unit tests.

use std::{collections::HashMap, sync::Arc};

use secrecy::ExposeSecret;
use tokio::sync::Semaphore;

use super::{AuthError, BiometricProof, Credentials, SessionStore, User, VerificationError};
use crate::services::{BiometricService, IdentityService, ServiceFuture};

pub(crate) const PASSWORD: &str = "s3cret";
pub(crate) const PROOF: &str = "face-scan-ok";

/// Accepts `ann` and `bob` with [`PASSWORD`]. When built with
/// [`FakeIdentity::held`], every call waits for a permit on `release`;
/// [`FakeIdentity::held_for`] holds only one username.
pub(crate) struct FakeIdentity {
    users: HashMap<String, User>,
    release: Option<Arc<Semaphore>>,
    held_user: Option<String>,
}

impl FakeIdentity {
    pub(crate) fn new() -> Self {
        let users = HashMap::from([
            ("ann".to_string(), User::new("u1", "Ann")),
            ("bob".to_string(), User::new("u2", "Bob")),
        ]);
        Self {
            users,
            release: None,
            held_user: None,
        }
    }

    pub(crate) fn held(release: Arc<Semaphore>) -> Self {
        Self {
            release: Some(release),
            ..Self::new()
        }
    }

    pub(crate) fn held_for(username: &str, release: Arc<Semaphore>) -> Self {
        Self {
            held_user: Some(username.to_string()),
            ..Self::held(release)
        }
    }
}

impl IdentityService for FakeIdentity {
    fn authenticate<'a>(
        &'a self,
        credentials: &'a Credentials,
    ) -> ServiceFuture<'a, User, AuthError> {
        Box::pin(async move {
            let holds = self
                .held_user
                .as_deref()
                .is_none_or(|held| held == credentials.username());
            if let Some(release) = self.release.as_ref().filter(|_| holds) {
                let permit = release
                    .acquire()
                    .await
                    .map_err(|err| AuthError::Unavailable(err.to_string()))?;
                permit.forget();
            }
            if credentials.username() == "down" {
                return Err(AuthError::Unavailable("identity offline".to_string()));
            }
            match self.users.get(credentials.username()) {
                Some(user) if credentials.password().expose_secret() == PASSWORD => {
                    Ok(user.clone())
                }
                _ => Err(AuthError::InvalidCredentials),
            }
        })
    }
}

/// Accepts [`PROOF`] for any user; optionally held like [`FakeIdentity`].
pub(crate) struct FakeBiometric {
    release: Option<Arc<Semaphore>>,
}

impl FakeBiometric {
    pub(crate) const fn new() -> Self {
        Self { release: None }
    }

    pub(crate) const fn held(release: Arc<Semaphore>) -> Self {
        Self {
            release: Some(release),
        }
    }
}

impl BiometricService for FakeBiometric {
    fn verify<'a>(
        &'a self,
        _user: &'a User,
        proof: &'a BiometricProof,
    ) -> ServiceFuture<'a, (), VerificationError> {
        Box::pin(async move {
            if let Some(release) = &self.release {
                let permit = release
                    .acquire()
                    .await
                    .map_err(|err| VerificationError::Unavailable(err.to_string()))?;
                permit.forget();
            }
            if proof.expose().expose_secret() == PROOF {
                Ok(())
            } else {
                Err(VerificationError::Rejected)
            }
        })
    }
}

pub(crate) fn store() -> SessionStore {
    SessionStore::new(Arc::new(FakeIdentity::new()), Arc::new(FakeBiometric::new()))
}

pub(crate) fn ann() -> Credentials {
    Credentials::new("ann", PASSWORD)
}

pub(crate) fn proof() -> BiometricProof {
    BiometricProof::new(PROOF)
}
