//! Route authorization gate.
//!
//! The gate is evaluated before any page is built. It maps the session stage
//! and the requested route to a [`Decision`]: render the route, or redirect
//! somewhere else. It never touches the session.
//!
//! | stage             | login    | biometric | dashboard |
//! |-------------------|----------|-----------|-----------|
//! | anonymous         | proceed  | login     | login     |
//! | pending biometric | (policy) | proceed   | biometric |
//! | authorized        | (policy) | (policy)  | proceed   |
//!
//! Cells marked "(policy)" follow the [`RevisitPolicy`]. Unknown paths
//! redirect to the dashboard, which then redirects again as needed, unless
//! the fallback is collapsed into a single hop.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

use crate::session::AuthStage;

mod route;

pub use self::route::Route;

/// Outcome of a guard check.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "action", content = "target", rename_all = "snake_case")]
pub enum Decision {
    Proceed,
    Redirect(Route),
}

/// What to do when a user opens a step they already completed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RevisitPolicy {
    /// Send the user forward to the page their stage requires.
    #[default]
    Forward,
    /// Render the page so the user can log in again or redo verification.
    Allow,
}

impl RevisitPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Allow => "allow",
        }
    }
}

impl fmt::Display for RevisitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RevisitPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "forward" => Ok(Self::Forward),
            "allow" => Ok(Self::Allow),
            other => Err(format!("invalid revisit policy: {other}")),
        }
    }
}

/// Longest redirect chain the table can produce (fallback, dashboard, target).
const MAX_HOPS: usize = 4;

/// Guard configuration. `Gate::default()` is the forward policy with the
/// fallback double redirect kept.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Gate {
    revisit: RevisitPolicy,
    collapse_fallback: bool,
}

impl Gate {
    #[must_use]
    pub const fn new(revisit: RevisitPolicy, collapse_fallback: bool) -> Self {
        Self {
            revisit,
            collapse_fallback,
        }
    }

    #[must_use]
    pub const fn revisit(&self) -> RevisitPolicy {
        self.revisit
    }

    #[must_use]
    pub const fn collapses_fallback(&self) -> bool {
        self.collapse_fallback
    }

    /// Decide whether `route` may be rendered for a session in `stage`.
    #[must_use]
    pub fn check(&self, stage: AuthStage, route: Route) -> Decision {
        match route {
            Route::Fallback if self.collapse_fallback => {
                Decision::Redirect(self.resolve(stage, Route::Dashboard))
            }
            Route::Fallback => Decision::Redirect(Route::Dashboard),
            Route::Dashboard => match stage {
                AuthStage::Authorized => Decision::Proceed,
                _ => Decision::Redirect(landing(stage)),
            },
            Route::Biometric => match (stage, self.revisit) {
                (AuthStage::Anonymous, _) => Decision::Redirect(Route::Login),
                (AuthStage::PendingBiometric, _) | (AuthStage::Authorized, RevisitPolicy::Allow) => {
                    Decision::Proceed
                }
                (AuthStage::Authorized, RevisitPolicy::Forward) => {
                    Decision::Redirect(Route::Dashboard)
                }
            },
            Route::Login => match (stage, self.revisit) {
                (AuthStage::Anonymous, _) | (_, RevisitPolicy::Allow) => Decision::Proceed,
                (stage, RevisitPolicy::Forward) => Decision::Redirect(landing(stage)),
            },
        }
    }

    /// Follow redirects from `route` to the page that finally renders.
    #[must_use]
    pub fn resolve(&self, stage: AuthStage, route: Route) -> Route {
        let mut current = route;
        for _ in 0..MAX_HOPS {
            match self.check(stage, current) {
                Decision::Proceed => return current,
                Decision::Redirect(next) => current = next,
            }
        }
        // The table has no cycles; reaching here means a new route broke that.
        landing(stage)
    }
}

/// The page a session in `stage` is expected to be on.
#[must_use]
pub const fn landing(stage: AuthStage) -> Route {
    match stage {
        AuthStage::Anonymous => Route::Login,
        AuthStage::PendingBiometric => Route::Biometric,
        AuthStage::Authorized => Route::Dashboard,
    }
}
