//! Host notification hooks.
//!
//! The orchestrator reports to its host through [`RouterHooks`]. All
//! methods default to no-ops so hosts implement only what they need.
//! Hooks are invoked synchronously from the signal handler that caused
//! them, in the order the transitions happen.

use std::collections::BTreeMap;

use serde::Serialize;
use tokio::sync::mpsc;

use crate::lifecycle::signals::LoadFailure;
use crate::location::{Location, NavigationKind};
use crate::routing::{AppKey, RouteDefinition, RouteMatch};

/// Decomposed location emitted on every distinct navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteChange {
    pub pathname: String,
    pub query: BTreeMap<String, String>,
    pub hash: String,
    pub kind: NavigationKind,
}

impl RouteChange {
    pub fn new(location: &Location, kind: NavigationKind) -> Self {
        Self {
            pathname: location.pathname.clone(),
            query: location.query.clone(),
            hash: location.hash.clone(),
            kind,
        }
    }
}

/// Callbacks fired by the orchestrator.
pub trait RouterHooks {
    fn on_route_change(&mut self, _change: &RouteChange) {}

    fn on_app_enter(&mut self, _app: &RouteMatch) {}

    fn on_app_leave(&mut self, _app: &RouteMatch) {}

    /// `definition` is `None` when the key is not in the current table.
    fn on_loading_app(&mut self, _key: &AppKey, _definition: Option<&RouteDefinition>) {}

    fn on_finish_loading(&mut self, _key: &AppKey, _definition: Option<&RouteDefinition>) {}

    fn on_not_found(&mut self, _location: Option<&Location>) {}

    fn on_error(&mut self, _error: &LoadFailure) {}
}

impl RouterHooks for () {}

/// A hook invocation as data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RouterEvent {
    RouteChange(RouteChange),
    AppEnter {
        key: AppKey,
        basename: String,
        params: BTreeMap<String, String>,
    },
    AppLeave {
        key: AppKey,
    },
    LoadingApp {
        key: AppKey,
    },
    FinishLoading {
        key: AppKey,
    },
    NotFound {
        pathname: Option<String>,
    },
    Error(LoadFailure),
}

impl RouterEvent {
    pub fn app_enter(app: &RouteMatch) -> Self {
        Self::AppEnter {
            key: app.key.clone(),
            basename: app.basename.clone(),
            params: app.params.clone(),
        }
    }

    pub fn app_leave(app: &RouteMatch) -> Self {
        Self::AppLeave {
            key: app.key.clone(),
        }
    }

    pub fn not_found(location: Option<&Location>) -> Self {
        Self::NotFound {
            pathname: location.map(|l| l.pathname.clone()),
        }
    }
}

/// Collects every hook invocation in order.
impl RouterHooks for Vec<RouterEvent> {
    fn on_route_change(&mut self, change: &RouteChange) {
        self.push(RouterEvent::RouteChange(change.clone()));
    }

    fn on_app_enter(&mut self, app: &RouteMatch) {
        self.push(RouterEvent::app_enter(app));
    }

    fn on_app_leave(&mut self, app: &RouteMatch) {
        self.push(RouterEvent::app_leave(app));
    }

    fn on_loading_app(&mut self, key: &AppKey, _definition: Option<&RouteDefinition>) {
        self.push(RouterEvent::LoadingApp { key: key.clone() });
    }

    fn on_finish_loading(&mut self, key: &AppKey, _definition: Option<&RouteDefinition>) {
        self.push(RouterEvent::FinishLoading { key: key.clone() });
    }

    fn on_not_found(&mut self, location: Option<&Location>) {
        self.push(RouterEvent::not_found(location));
    }

    fn on_error(&mut self, error: &LoadFailure) {
        self.push(RouterEvent::Error(error.clone()));
    }
}

/// Forwards hook invocations over a channel.
///
/// Replaces a process-wide event bus: whoever holds the receiver observes
/// the router, nobody else does.
#[derive(Debug, Clone)]
pub struct ChannelHooks {
    tx: mpsc::UnboundedSender<RouterEvent>,
}

impl ChannelHooks {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RouterEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn emit(&self, event: RouterEvent) {
        // A closed receiver means nobody is listening any more.
        let _ = self.tx.send(event);
    }
}

impl RouterHooks for ChannelHooks {
    fn on_route_change(&mut self, change: &RouteChange) {
        self.emit(RouterEvent::RouteChange(change.clone()));
    }

    fn on_app_enter(&mut self, app: &RouteMatch) {
        self.emit(RouterEvent::app_enter(app));
    }

    fn on_app_leave(&mut self, app: &RouteMatch) {
        self.emit(RouterEvent::app_leave(app));
    }

    fn on_loading_app(&mut self, key: &AppKey, _definition: Option<&RouteDefinition>) {
        self.emit(RouterEvent::LoadingApp { key: key.clone() });
    }

    fn on_finish_loading(&mut self, key: &AppKey, _definition: Option<&RouteDefinition>) {
        self.emit(RouterEvent::FinishLoading { key: key.clone() });
    }

    fn on_not_found(&mut self, location: Option<&Location>) {
        self.emit(RouterEvent::not_found(location));
    }

    fn on_error(&mut self, error: &LoadFailure) {
        self.emit(RouterEvent::Error(error.clone()));
    }
}
