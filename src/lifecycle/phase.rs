//! Router phase and host-facing snapshots.
//!
//! # States
//! - Booting: collaborator not yet initialised, nothing resolves
//! - Normal: a definition is active
//! - NotFound: the location matched no definition
//! - Error: loading failed, payload retained until the next navigation
//!
//! # State Transitions
//! ```text
//! Booting  → Normal | NotFound | Error   (once, on Initialized)
//! Normal  ⇄ NotFound                      (navigation / not-found signal)
//! Normal  ⇄ Error                         (error signal / navigation)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lifecycle::signals::LoadFailure;
use crate::location::Location;
use crate::routing::{AppKey, RouteMatch};

/// Coarse-grained router state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Booting,
    Normal,
    NotFound,
    Error,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Booting => "booting",
            Self::Normal => "normal",
            Self::NotFound => "not_found",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a host binding reads per render tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouterSnapshot {
    pub phase: Phase,
    pub active: Option<RouteMatch>,
    pub loading: Option<AppKey>,
    pub error: Option<LoadFailure>,
    pub location: Option<Location>,
}

impl Default for RouterSnapshot {
    fn default() -> Self {
        Self {
            phase: Phase::Booting,
            active: None,
            loading: None,
            error: None,
            location: None,
        }
    }
}

/// What the host should render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewState<'a> {
    Booting,
    /// Initialised but no location has been resolved yet.
    Idle,
    NotFound,
    Error(&'a LoadFailure),
    App {
        route: &'a RouteMatch,
        /// The active app's load is in flight; hosts overlay their loading
        /// indicator.
        loading: bool,
    },
}

impl RouterSnapshot {
    /// Resolve the snapshot into a single view. Error wins over loading.
    pub fn view(&self) -> ViewState<'_> {
        match (self.phase, &self.error, &self.active) {
            (Phase::Booting, _, _) => ViewState::Booting,
            (Phase::Error, Some(error), _) => ViewState::Error(error),
            (Phase::NotFound, _, _) => ViewState::NotFound,
            (_, _, Some(route)) => ViewState::App {
                route,
                loading: self.loading.as_ref() == Some(&route.key),
            },
            (_, _, None) => ViewState::Idle,
        }
    }
}
