//! JSON endpoints for the session and the gate.
//!
//! These mirror the HTML pages for clients that drive the shell themselves:
//! they expose the session snapshot, the three session operations, and the
//! gate's decision for an arbitrary path.

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Extension, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use utoipa::{IntoParams, ToSchema};

use super::{auth_status, verification_status};
use crate::{
    api::ShellConfig,
    gate::{Decision, Route},
    session::{AuthStage, BiometricProof, Credentials, Session, SessionStore, User},
};

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub stage: AuthStage,
    pub user: Option<User>,
    pub biometric_verified: bool,
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        Self {
            stage: session.stage(),
            user: session.user().cloned(),
            biometric_verified: session.is_biometric_verified(),
        }
    }
}

#[derive(ToSchema, Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

// Manual impl keeps the password out of logs.
impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(ToSchema, Deserialize)]
pub struct BiometricRequest {
    proof: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(IntoParams, Deserialize, Debug)]
pub struct NavigateQuery {
    /// Path relative to the shell root, e.g. `/login`.
    path: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct NavigateResponse {
    pub route: Route,
    pub decision: Decision,
    pub resolved: Route,
    pub location: String,
}

fn error_response(status: StatusCode, error: &str, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            message: message.to_string(),
        }),
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/v1/session",
    responses(
        (status = 200, description = "Current session snapshot", body = SessionView)
    ),
    tag = "session"
)]
pub async fn session(Extension(store): Extension<Arc<SessionStore>>) -> Json<SessionView> {
    Json(SessionView::from(&store.current()))
}

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in, biometric verification pending", body = SessionView),
        (status = 400, description = "Malformed payload", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 409, description = "Superseded by a later session change", body = ErrorResponse),
        (status = 502, description = "Identity service unavailable", body = ErrorResponse)
    ),
    tag = "session"
)]
#[instrument(skip_all)]
pub async fn login(
    Extension(store): Extension<Arc<SessionStore>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!("invalid login payload: {rejection}");
            return error_response(StatusCode::BAD_REQUEST, "bad_request", "Missing payload");
        }
    };

    let credentials = Credentials::new(request.username, request.password);
    match store.login(&credentials).await {
        Ok(session) => (StatusCode::OK, Json(SessionView::from(&session))).into_response(),
        Err(err) => error_response(auth_status(&err), &err.to_string(), err.user_message()),
    }
}

#[utoipa::path(
    post,
    path = "/v1/auth/biometric",
    request_body = BiometricRequest,
    responses(
        (status = 200, description = "Verified", body = SessionView),
        (status = 400, description = "Malformed payload", body = ErrorResponse),
        (status = 401, description = "Proof rejected", body = ErrorResponse),
        (status = 409, description = "No session, or superseded by a later session change", body = ErrorResponse),
        (status = 502, description = "Biometric service unavailable", body = ErrorResponse)
    ),
    tag = "session"
)]
#[instrument(skip_all)]
pub async fn biometric(
    Extension(store): Extension<Arc<SessionStore>>,
    payload: Result<Json<BiometricRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!("invalid biometric payload: {rejection}");
            return error_response(StatusCode::BAD_REQUEST, "bad_request", "Missing payload");
        }
    };

    let proof = BiometricProof::new(request.proof);
    match store.verify_biometric(&proof).await {
        Ok(session) => (StatusCode::OK, Json(SessionView::from(&session))).into_response(),
        Err(err) => error_response(
            verification_status(&err),
            &err.to_string(),
            err.user_message(),
        ),
    }
}

#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    responses(
        (status = 204, description = "Session cleared")
    ),
    tag = "session"
)]
#[instrument(skip_all)]
pub async fn logout(Extension(store): Extension<Arc<SessionStore>>) -> StatusCode {
    store.logout();
    StatusCode::NO_CONTENT
}

#[utoipa::path(
    get,
    path = "/v1/navigate",
    params(NavigateQuery),
    responses(
        (status = 200, description = "Gate decision for the path", body = NavigateResponse),
        (status = 400, description = "Missing path", body = ErrorResponse)
    ),
    tag = "session"
)]
pub async fn navigate(
    Extension(store): Extension<Arc<SessionStore>>,
    Extension(config): Extension<ShellConfig>,
    query: Result<Query<NavigateQuery>, QueryRejection>,
) -> Response {
    let Ok(Query(query)) = query else {
        return error_response(StatusCode::BAD_REQUEST, "bad_request", "Missing path");
    };

    let stage = store.stage();
    let route = Route::from_path(&query.path);
    let gate = config.gate();
    let resolved = gate.resolve(stage, route);

    Json(NavigateResponse {
        route,
        decision: gate.check(stage, route),
        resolved,
        location: config.href(resolved),
    })
    .into_response()
}
