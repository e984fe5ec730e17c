use std::time::Duration;

use anyhow::Result;
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde_json::json;
use tracing::{debug, error, instrument};
use url::Url;

use super::{IdentityService, ServiceFuture, endpoint_url, http_client};
use crate::session::{AuthError, Credentials, User};

/// Identity service reached over HTTP: `POST {base}/authenticate`.
#[derive(Clone, Debug)]
pub struct HttpIdentityService {
    client: Client,
    url: Url,
}

impl HttpIdentityService {
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            url: endpoint_url(base_url, "/authenticate")?,
        })
    }

    #[instrument(skip_all, fields(username = %credentials.username()))]
    async fn post_credentials(&self, credentials: &Credentials) -> Result<User, AuthError> {
        let payload = json!({
            "username": credentials.username(),
            "password": credentials.password().expose_secret(),
        });

        let response = self
            .client
            .post(self.url.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|err| {
                error!("Error calling identity service: {err}");
                AuthError::Unavailable(err.to_string())
            })?;

        match response.status() {
            status if status.is_success() => {
                let user: User = response.json().await.map_err(|err| {
                    error!("Invalid identity service response: {err}");
                    AuthError::Unavailable(format!("invalid response: {err}"))
                })?;
                debug!(user_id = %user.id, "identity service accepted credentials");
                Ok(user)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                debug!("identity service rejected credentials");
                Err(AuthError::InvalidCredentials)
            }
            status => {
                error!("Identity service returned {status}");
                Err(AuthError::Unavailable(format!("unexpected status {status}")))
            }
        }
    }
}

impl IdentityService for HttpIdentityService {
    fn authenticate<'a>(
        &'a self,
        credentials: &'a Credentials,
    ) -> ServiceFuture<'a, User, AuthError> {
        Box::pin(self.post_credentials(credentials))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn credentials() -> Credentials {
        Credentials::new("ann", "correct horse")
    }

    #[tokio::test]
    async fn authenticate_returns_user() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping identity test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/authenticate"))
            .and(header("user-agent", crate::APP_USER_AGENT))
            .and(body_json(json!({"username": "ann", "password": "correct horse"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "u1", "firstName": "Ann"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let service = HttpIdentityService::new(&server.uri(), Duration::from_secs(5))?;
        let user = service.authenticate(&credentials()).await;
        assert_eq!(user, Ok(User::new("u1", "Ann")));
        Ok(())
    }

    #[tokio::test]
    async fn authenticate_maps_unauthorized() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping identity test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/authenticate"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let service = HttpIdentityService::new(&server.uri(), Duration::from_secs(5))?;
        let result = service.authenticate(&credentials()).await;
        assert_eq!(result, Err(AuthError::InvalidCredentials));
        Ok(())
    }

    #[tokio::test]
    async fn authenticate_maps_server_error_and_bad_body() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping identity test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/authenticate"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/authenticate"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let service = HttpIdentityService::new(&server.uri(), Duration::from_secs(5))?;
        let result = service.authenticate(&credentials()).await;
        assert!(matches!(result, Err(AuthError::Unavailable(msg)) if msg.contains("503")));

        let prefixed = HttpIdentityService::new(&format!("{}/v1", server.uri()), Duration::from_secs(5))?;
        let result = prefixed.authenticate(&credentials()).await;
        assert!(matches!(result, Err(AuthError::Unavailable(msg)) if msg.contains("invalid response")));
        Ok(())
    }
}
