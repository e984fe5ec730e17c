use crate::{
    gate::{Gate, Route},
    session::SessionStore,
};
use anyhow::{Result, anyhow};
use axum::{
    Extension, Json, Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    routing::{get, options, post},
};
use regex::Regex;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{Span, error, info, info_span};
use ulid::Ulid;

pub mod handlers;
mod openapi;
pub mod views;

pub use openapi::openapi;

use handlers::{health, pages};

const LOGOUT_PATH: &str = "/logout";

/// Shell settings shared with every handler through an `Extension`.
#[derive(Clone, Debug, Default)]
pub struct ShellConfig {
    base_path: String,
    gate: Gate,
}

impl ShellConfig {
    #[must_use]
    pub fn new(gate: Gate) -> Self {
        Self {
            base_path: String::new(),
            gate,
        }
    }

    /// Mount the shell under `base_path` (e.g. `/deepfake-hunter`).
    /// Trailing slashes are dropped; `/` means the root.
    #[must_use]
    pub fn with_base_path(mut self, base_path: String) -> Self {
        self.base_path = base_path.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    #[must_use]
    pub const fn gate(&self) -> &Gate {
        &self.gate
    }

    /// Absolute path of `route`, including the base path.
    #[must_use]
    pub fn href(&self, route: Route) -> String {
        match (route.path(), self.base_path.is_empty()) {
            (path, true) => path.to_string(),
            // Nested routers answer their root at `/base`, not `/base/`.
            ("/", false) => self.base_path.clone(),
            (path, false) => format!("{}{path}", self.base_path),
        }
    }

    #[must_use]
    pub fn logout_href(&self) -> String {
        format!("{}{LOGOUT_PATH}", self.base_path)
    }
}

/// Check a base path given on the command line and normalize it.
///
/// # Errors
/// Returns an error if a segment holds anything but URL-safe characters.
pub fn validate_base_path(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok(String::new());
    }

    let re = Regex::new(r"^(/[A-Za-z0-9._~-]+)+$")?;
    if re.is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(anyhow!("invalid base path: {raw}"))
    }
}

/// HTML pages plus the documented JSON routes, relative to the shell root.
fn shell_router() -> Router {
    let (router, openapi) = openapi::api_router().split_for_parts();

    router
        .route(
            "/openapi.json",
            get(move || {
                let doc = openapi.clone();
                async move { Json(doc) }
            }),
        )
        .route("/health", options(health::health))
        .route(Route::Dashboard.path(), get(pages::dashboard))
        .route(
            Route::Login.path(),
            get(pages::login).post(pages::login_submit),
        )
        .route(
            Route::Biometric.path(),
            get(pages::biometric).post(pages::biometric_submit),
        )
        .route(LOGOUT_PATH, post(pages::logout))
        .fallback(pages::fallback)
}

/// Build the full application: routes, base path, request ids, tracing and
/// the injected session store.
#[must_use]
pub fn app(store: Arc<SessionStore>, config: ShellConfig) -> Router {
    let shell = shell_router();

    let router = if config.base_path().is_empty() {
        shell
    } else {
        Router::new()
            .nest(config.base_path(), shell)
            .fallback(pages::fallback)
    };

    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(Extension(store))
            .layer(Extension(config)),
    )
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, store: Arc<SessionStore>, config: ShellConfig) -> Result<()> {
    let base_path = config.base_path().to_string();
    let app = app(store, config);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}{}", port, base_path);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("Gracefully shutdown");
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
