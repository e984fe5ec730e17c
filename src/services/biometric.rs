use std::time::Duration;

use anyhow::Result;
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde_json::json;
use tracing::{debug, error, instrument};
use url::Url;

use super::{BiometricService, ServiceFuture, endpoint_url, http_client};
use crate::session::{BiometricProof, User, VerificationError};

/// Biometric service reached over HTTP: `POST {base}/verify`.
#[derive(Clone, Debug)]
pub struct HttpBiometricService {
    client: Client,
    url: Url,
}

impl HttpBiometricService {
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            url: endpoint_url(base_url, "/verify")?,
        })
    }

    #[instrument(skip_all, fields(user_id = %user.id))]
    async fn post_proof(&self, user: &User, proof: &BiometricProof) -> Result<(), VerificationError> {
        let payload = json!({
            "userId": user.id,
            "proof": proof.expose().expose_secret(),
        });

        let response = self
            .client
            .post(self.url.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|err| {
                error!("Error calling biometric service: {err}");
                VerificationError::Unavailable(err.to_string())
            })?;

        match response.status() {
            status if status.is_success() => {
                debug!("biometric proof accepted");
                Ok(())
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::UNPROCESSABLE_ENTITY => {
                debug!("biometric proof rejected");
                Err(VerificationError::Rejected)
            }
            status => {
                error!("Biometric service returned {status}");
                Err(VerificationError::Unavailable(format!(
                    "unexpected status {status}"
                )))
            }
        }
    }
}

impl BiometricService for HttpBiometricService {
    fn verify<'a>(
        &'a self,
        user: &'a User,
        proof: &'a BiometricProof,
    ) -> ServiceFuture<'a, (), VerificationError> {
        Box::pin(self.post_proof(user, proof))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    async fn service_answering(status: u16) -> Result<Option<(MockServer, HttpBiometricService)>> {
        if !can_bind_localhost() {
            eprintln!("Skipping biometric test: cannot bind localhost");
            return Ok(None);
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/verify"))
            .and(body_json(json!({"userId": "u1", "proof": "face-scan"})))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let service = HttpBiometricService::new(&server.uri(), Duration::from_secs(5))?;
        Ok(Some((server, service)))
    }

    #[tokio::test]
    async fn verify_accepts_success_statuses() -> Result<()> {
        for status in [200, 204] {
            let Some((_server, service)) = service_answering(status).await? else {
                return Ok(());
            };
            let result = service
                .verify(&User::new("u1", "Ann"), &BiometricProof::new("face-scan"))
                .await;
            assert_eq!(result, Ok(()), "status {status}");
        }
        Ok(())
    }

    #[tokio::test]
    async fn verify_maps_rejections() -> Result<()> {
        for status in [401, 403, 422] {
            let Some((_server, service)) = service_answering(status).await? else {
                return Ok(());
            };
            let result = service
                .verify(&User::new("u1", "Ann"), &BiometricProof::new("face-scan"))
                .await;
            assert_eq!(result, Err(VerificationError::Rejected), "status {status}");
        }
        Ok(())
    }

    #[tokio::test]
    async fn verify_maps_outages() -> Result<()> {
        let Some((_server, service)) = service_answering(500).await? else {
            return Ok(());
        };
        let result = service
            .verify(&User::new("u1", "Ann"), &BiometricProof::new("face-scan"))
            .await;
        assert!(matches!(result, Err(VerificationError::Unavailable(_))));
        Ok(())
    }

    #[tokio::test]
    async fn verify_maps_transport_errors() -> Result<()> {
        // Nothing listens on port 9 (discard) in test environments.
        let service = HttpBiometricService::new("http://127.0.0.1:9", Duration::from_secs(2))?;
        let result = service
            .verify(&User::new("u1", "Ann"), &BiometricProof::new("face-scan"))
            .await;
        assert!(matches!(result, Err(VerificationError::Unavailable(_))));
        Ok(())
    }
}
