use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

pub const LOGIN_PATH: &str = "/login";
pub const BIOMETRIC_PATH: &str = "/authenticate";
pub const DASHBOARD_PATH: &str = "/";

/// Navigable destinations of the shell.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Credential form.
    Login,
    /// Biometric verification form.
    Biometric,
    /// Protected dashboard.
    Dashboard,
    /// Any path the shell does not know.
    Fallback,
}

impl Route {
    /// Classify a path relative to the shell root. Query strings and trailing
    /// slashes are ignored.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');

        match trimmed {
            "" => Self::Dashboard,
            LOGIN_PATH => Self::Login,
            BIOMETRIC_PATH => Self::Biometric,
            _ => Self::Fallback,
        }
    }

    /// Canonical path; the fallback has none and maps to the dashboard.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => LOGIN_PATH,
            Self::Biometric => BIOMETRIC_PATH,
            Self::Dashboard | Self::Fallback => DASHBOARD_PATH,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Biometric => "biometric",
            Self::Dashboard => "dashboard",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_path_classifies_known_routes() {
        assert_eq!(Route::from_path("/"), Route::Dashboard);
        assert_eq!(Route::from_path(""), Route::Dashboard);
        assert_eq!(Route::from_path("/login"), Route::Login);
        assert_eq!(Route::from_path("/login/"), Route::Login);
        assert_eq!(Route::from_path("/authenticate?next=%2F"), Route::Biometric);
    }

    #[test]
    fn from_path_sends_everything_else_to_fallback() {
        for path in ["/dashboard", "/login/extra", "/LOGIN", "/favicon.ico", "//x"] {
            assert_eq!(Route::from_path(path), Route::Fallback, "{path}");
        }
    }

    #[test]
    fn paths_round_trip_for_renderable_routes() {
        for route in [Route::Login, Route::Biometric, Route::Dashboard] {
            assert_eq!(Route::from_path(route.path()), route);
        }
        assert_eq!(Route::Fallback.path(), "/");
    }
}
