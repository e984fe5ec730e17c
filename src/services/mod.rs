//! External collaborators of the session store.
//!
//! Flow Overview: the store hands credentials to an [`IdentityService`] and,
//! once a user is known, hands the biometric proof to a
//! [`BiometricService`]. Both return boxed futures so the store can hold them
//! as trait objects and tests can swap in fakes.
//!
//! The HTTP clients here only translate statuses into the domain errors;
//! they never log credentials or proofs.

use std::{future::Future, pin::Pin, time::Duration};

use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use url::Url;

use crate::{
    APP_USER_AGENT,
    session::{AuthError, BiometricProof, Credentials, User, VerificationError},
};

mod biometric;
mod identity;

pub use self::biometric::HttpBiometricService;
pub use self::identity::HttpIdentityService;

/// Boxed future returned by the service traits.
pub type ServiceFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Checks credentials and returns the identity they belong to.
pub trait IdentityService: Send + Sync {
    fn authenticate<'a>(&'a self, credentials: &'a Credentials)
    -> ServiceFuture<'a, User, AuthError>;
}

/// Checks a biometric proof for an already identified user.
pub trait BiometricService: Send + Sync {
    fn verify<'a>(
        &'a self,
        user: &'a User,
        proof: &'a BiometricProof,
    ) -> ServiceFuture<'a, (), VerificationError>;
}

/// Shared HTTP client for both services.
///
/// # Errors
/// Returns an error if the client cannot be built.
pub fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(APP_USER_AGENT)
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// Join a base URL and an endpoint path, keeping any path prefix of the base.
///
/// # Errors
/// Returns an error if the base URL is invalid or cannot carry a path.
pub fn endpoint_url(base: &str, endpoint: &str) -> Result<Url> {
    let mut url = Url::parse(base).with_context(|| format!("Invalid service URL: {base}"))?;

    if url.cannot_be_a_base() {
        return Err(anyhow!("Service URL cannot carry a path: {base}"));
    }

    let path = format!(
        "{}/{}",
        url.path().trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    );
    url.set_path(&path);

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_url_appends_to_root() -> Result<()> {
        let url = endpoint_url("https://id.example.com", "/authenticate")?;
        assert_eq!(url.as_str(), "https://id.example.com/authenticate");
        Ok(())
    }

    #[test]
    fn endpoint_url_keeps_base_path() -> Result<()> {
        let url = endpoint_url("http://127.0.0.1:9000/v1/bio/", "verify")?;
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/v1/bio/verify");
        Ok(())
    }

    #[test]
    fn endpoint_url_rejects_garbage() {
        assert!(endpoint_url("not a url", "/verify").is_err());
        assert!(endpoint_url("mailto:ops@example.com", "/verify").is_err());
    }
}
