//! Signals consumed by the orchestrator.
//!
//! Every input, whether navigation, asset progress or a route table
//! update, arrives as a [`Signal`] over one unbounded channel. Producers
//! hold a cloned [`SignalSender`]; only the orchestrator receives.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::location::NavigationKind;
use crate::routing::{AppKey, RouteTable};

/// Error payload reported by the asset collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadFailure {
    pub message: String,
    /// The app whose load failed, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<AppKey>,
}

impl LoadFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            app: None,
        }
    }

    pub fn for_app(message: impl Into<String>, app: impl Into<AppKey>) -> Self {
        Self {
            message: message.into(),
            app: Some(app.into()),
        }
    }
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.app {
            Some(app) => write!(f, "{app}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// An input to the orchestrator.
#[derive(Debug, Clone)]
pub enum Signal {
    /// The navigation source moved to `url`.
    Navigate { url: String, kind: NavigationKind },
    /// The asset collaborator finished initialising.
    Initialized,
    /// Resources for the app are in flight.
    LoadingStarted(AppKey),
    /// Resources for the app finished loading.
    LoadingFinished(AppKey),
    /// The collaborator could not find the app.
    NotFound,
    /// Loading failed.
    Error(LoadFailure),
    /// Replace the route definitions.
    UpdateRoutes(RouteTable),
}

impl Signal {
    /// Signal name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Navigate { .. } => "navigate",
            Self::Initialized => "initialized",
            Self::LoadingStarted(_) => "loading_started",
            Self::LoadingFinished(_) => "loading_finished",
            Self::NotFound => "not_found",
            Self::Error(_) => "error",
            Self::UpdateRoutes(_) => "update_routes",
        }
    }
}

/// Receiving half, owned by the orchestrator.
pub type SignalReceiver = mpsc::UnboundedReceiver<Signal>;

/// Sending half handed to navigation sources and collaborators.
#[derive(Debug, Clone)]
pub struct SignalSender {
    tx: mpsc::UnboundedSender<Signal>,
}

/// Create a connected sender/receiver pair.
pub fn signal_channel() -> (SignalSender, SignalReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (SignalSender { tx }, rx)
}

impl SignalSender {
    /// Send a signal. Returns false once the receiver is gone.
    pub fn send(&self, signal: Signal) -> bool {
        self.tx.send(signal).is_ok()
    }

    pub fn navigate(&self, url: impl Into<String>, kind: NavigationKind) -> bool {
        self.send(Signal::Navigate {
            url: url.into(),
            kind,
        })
    }

    pub fn initialized(&self) -> bool {
        self.send(Signal::Initialized)
    }

    pub fn loading_started(&self, key: impl Into<AppKey>) -> bool {
        self.send(Signal::LoadingStarted(key.into()))
    }

    pub fn loading_finished(&self, key: impl Into<AppKey>) -> bool {
        self.send(Signal::LoadingFinished(key.into()))
    }

    pub fn not_found(&self) -> bool {
        self.send(Signal::NotFound)
    }

    pub fn error(&self, failure: LoadFailure) -> bool {
        self.send(Signal::Error(failure))
    }

    pub fn update_routes(&self, table: RouteTable) -> bool {
        self.send(Signal::UpdateRoutes(table))
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
