use crate::{
    api::{self, ShellConfig},
    cli::telemetry,
    gate::{Gate, RevisitPolicy},
    services::{HttpBiometricService, HttpIdentityService},
    session::SessionStore,
};
use anyhow::{Context, Result};
use std::{sync::Arc, time::Duration};
use tracing::{debug, info};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub identity_url: String,
    pub biometric_url: String,
    pub service_timeout_seconds: u64,
    pub base_path: String,
    pub revisit: RevisitPolicy,
    pub collapse_fallback: bool,
}

impl Args {
    fn shell_config(&self) -> ShellConfig {
        ShellConfig::new(Gate::new(self.revisit, self.collapse_fallback))
            .with_base_path(self.base_path.clone())
    }

    fn session_store(&self) -> Result<SessionStore> {
        let timeout = Duration::from_secs(self.service_timeout_seconds);

        let identity = HttpIdentityService::new(&self.identity_url, timeout)
            .context("failed to build identity service client")?;
        let biometric = HttpBiometricService::new(&self.biometric_url, timeout)
            .context("failed to build biometric service client")?;

        Ok(SessionStore::new(Arc::new(identity), Arc::new(biometric)))
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if a service client cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    debug!(
        identity_url = %args.identity_url,
        biometric_url = %args.biometric_url,
        timeout = args.service_timeout_seconds,
        "configuring services"
    );

    let store = Arc::new(args.session_store()?);
    let config = args.shell_config();

    info!(
        revisit = %config.gate().revisit(),
        collapse_fallback = config.gate().collapses_fallback(),
        "starting shell"
    );

    let result = api::new(args.port, store, config).await;

    telemetry::shutdown_tracer();

    result
}
