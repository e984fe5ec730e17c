//! HTML pages: login, biometric verification, dashboard, logout and the
//! catch-all.

use std::sync::Arc;

use axum::{
    Form,
    extract::Extension,
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{auth_status, guard, redirect, verification_status};
use crate::{
    api::{ShellConfig, views},
    gate::Route,
    session::{BiometricProof, Credentials, SessionStore, VerificationError},
};

#[derive(Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
}

#[derive(Deserialize)]
pub struct BiometricForm {
    proof: String,
}

#[instrument(skip_all)]
pub async fn login(
    Extension(store): Extension<Arc<SessionStore>>,
    Extension(config): Extension<ShellConfig>,
) -> Response {
    match guard(&store, &config, Route::Login) {
        Ok(session) => Html(views::login_page(&config, session.user(), None)).into_response(),
        Err(redirect) => redirect,
    }
}

#[instrument(skip_all)]
pub async fn login_submit(
    Extension(store): Extension<Arc<SessionStore>>,
    Extension(config): Extension<ShellConfig>,
    Form(form): Form<LoginForm>,
) -> Response {
    let credentials = Credentials::new(form.username, form.password);

    match store.login(&credentials).await {
        Ok(session) => {
            let next = config.gate().resolve(session.stage(), Route::Dashboard);
            redirect(&config, next)
        }
        Err(err) => {
            debug!("login failed: {err}");
            let page = views::login_page(&config, store.current().user(), Some(err.user_message()));
            (auth_status(&err), Html(page)).into_response()
        }
    }
}

#[instrument(skip_all)]
pub async fn biometric(
    Extension(store): Extension<Arc<SessionStore>>,
    Extension(config): Extension<ShellConfig>,
) -> Response {
    let session = match guard(&store, &config, Route::Biometric) {
        Ok(session) => session,
        Err(redirect) => return redirect,
    };

    // The gate only lets logged-in sessions through to this page.
    match session.user() {
        Some(user) => Html(views::biometric_page(&config, user, None)).into_response(),
        None => redirect(&config, Route::Login),
    }
}

#[instrument(skip_all)]
pub async fn biometric_submit(
    Extension(store): Extension<Arc<SessionStore>>,
    Extension(config): Extension<ShellConfig>,
    Form(form): Form<BiometricForm>,
) -> Response {
    let proof = BiometricProof::new(form.proof);

    match store.verify_biometric(&proof).await {
        Ok(session) => {
            let next = config.gate().resolve(session.stage(), Route::Dashboard);
            redirect(&config, next)
        }
        Err(VerificationError::NoSession) => redirect(&config, Route::Login),
        Err(err) => {
            debug!("biometric verification failed: {err}");
            let session = store.current();
            match session.user() {
                Some(user) => {
                    let page = views::biometric_page(&config, user, Some(err.user_message()));
                    (verification_status(&err), Html(page)).into_response()
                }
                None => redirect(&config, Route::Login),
            }
        }
    }
}

#[instrument(skip_all)]
pub async fn dashboard(
    Extension(store): Extension<Arc<SessionStore>>,
    Extension(config): Extension<ShellConfig>,
) -> Response {
    let session = match guard(&store, &config, Route::Dashboard) {
        Ok(session) => session,
        Err(redirect) => return redirect,
    };

    match session.user() {
        Some(user) => Html(views::dashboard_page(&config, user)).into_response(),
        None => redirect(&config, Route::Login),
    }
}

#[instrument(skip_all)]
pub async fn logout(
    Extension(store): Extension<Arc<SessionStore>>,
    Extension(config): Extension<ShellConfig>,
) -> Response {
    let session = store.logout();
    let next = config.gate().resolve(session.stage(), Route::Dashboard);
    redirect(&config, next)
}

/// Catch-all: unknown paths are sent to the dashboard route, which the gate
/// then forwards again unless the fallback is collapsed.
#[instrument(skip_all, fields(path = %uri.path()))]
pub async fn fallback(
    Extension(store): Extension<Arc<SessionStore>>,
    Extension(config): Extension<ShellConfig>,
    uri: Uri,
) -> Response {
    match guard(&store, &config, Route::Fallback) {
        Err(redirect) => redirect,
        // The gate never renders the fallback itself.
        Ok(_) => StatusCode::NOT_FOUND.into_response(),
    }
}
