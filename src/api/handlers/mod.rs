//! Request handlers for the shell.
//!
//! Page handlers call [`guard`] before they build anything: the gate's
//! decision comes back either as the session snapshot to render with, or as
//! the redirect response to return as is.

pub mod health;
pub mod pages;
pub mod session;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use super::ShellConfig;
use crate::{
    gate::{Decision, Route},
    session::{AuthError, Session, SessionStore, VerificationError},
};

/// Run the gate for `route` against the current session.
///
/// # Errors
/// Returns the redirect response when the route may not be rendered.
pub(crate) fn guard(
    store: &SessionStore,
    config: &ShellConfig,
    route: Route,
) -> Result<Session, Response> {
    let session = store.current();
    match config.gate().check(session.stage(), route) {
        Decision::Proceed => Ok(session),
        Decision::Redirect(target) => {
            debug!(
                stage = session.stage().as_str(),
                %route,
                %target,
                "navigation redirected"
            );
            Err(redirect(config, target))
        }
    }
}

/// `303 See Other` to a route under the configured base path.
pub(crate) fn redirect(config: &ShellConfig, route: Route) -> Response {
    Redirect::to(&config.href(route)).into_response()
}

pub(crate) const fn auth_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AuthError::Superseded => StatusCode::CONFLICT,
        AuthError::Unavailable(_) => StatusCode::BAD_GATEWAY,
    }
}

pub(crate) const fn verification_status(err: &VerificationError) -> StatusCode {
    match err {
        VerificationError::Rejected => StatusCode::UNAUTHORIZED,
        VerificationError::NoSession | VerificationError::Superseded => StatusCode::CONFLICT,
        VerificationError::Unavailable(_) => StatusCode::BAD_GATEWAY,
    }
}
