//! # Deepfake Hunter (gated web shell)
//!
//! `deepfake-hunter` serves a small web application shell: a login page, a
//! biometric verification page and a protected dashboard.
//!
//! ## Authentication gate
//!
//! Access is decided by a three-stage gate derived from the in-memory session:
//!
//! - **Anonymous:** no user is logged in. Everything redirects to `/login`.
//! - **Pending biometric:** the identity service accepted the credentials but
//!   the biometric service has not verified the user yet. Everything redirects
//!   to `/authenticate`.
//! - **Authorized:** both steps passed; the dashboard at `/` renders.
//!
//! The [`gate`] module evaluates that table before any page is built and
//! returns a plain decision value. The [`session`] module owns the single
//! session of the process and applies login, verification and logout
//! atomically, letting the most recent call win when several overlap.
//!
//! ## Collaborators
//!
//! Credentials and biometric proofs are checked by external services reached
//! over HTTP through the traits in [`services`]. Secrets are wrapped in
//! `secrecy` types and never logged.

pub mod api;
pub mod cli;
pub mod gate;
pub mod services;
pub mod session;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
