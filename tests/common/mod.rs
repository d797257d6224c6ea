//! Shared fixtures for orchestrator integration tests.

use micro_router::assets::{AssetConfig, AssetLifecycle};
use micro_router::{
    MemoryHistory, Orchestrator, RouteDefinition, RouteMatch, RouteTable, RouterEvent,
    SignalSender,
};

/// Asset collaborator that records every call.
///
/// Loads report `LoadingStarted` only; tests decide when (and whether) a
/// load finishes.
#[derive(Debug, Default)]
pub struct ScriptedAssets {
    pub calls: Vec<String>,
    defer_init: bool,
    signals: Option<SignalSender>,
}

impl ScriptedAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collaborator that never reports `Initialized` on its own.
    #[allow(dead_code)]
    pub fn deferred() -> Self {
        Self {
            defer_init: true,
            ..Self::default()
        }
    }
}

impl AssetLifecycle for ScriptedAssets {
    fn initialize(&mut self, _config: &AssetConfig, signals: SignalSender) {
        self.calls.push("initialize".into());
        if !self.defer_init {
            signals.initialized();
        }
        self.signals = Some(signals);
    }

    fn load(&mut self, app: &RouteMatch) {
        self.calls.push(format!("load:{}", app.key));
        if let Some(signals) = &self.signals {
            signals.loading_started(app.key.clone());
        }
    }

    fn unload(&mut self, app: &RouteMatch) {
        self.calls.push(format!("unload:{}", app.key));
    }

    fn teardown(&mut self) {
        self.calls.push("teardown".into());
        self.signals = None;
    }
}

pub type TestRouter = Orchestrator<Vec<RouterEvent>, ScriptedAssets>;

/// Build a router over `definitions`, start it at `url` and drain the queue.
pub fn started(definitions: Vec<RouteDefinition>, url: &str) -> (TestRouter, MemoryHistory) {
    let mut router = Orchestrator::new(
        RouteTable::new(definitions),
        Vec::new(),
        ScriptedAssets::new(),
    );
    let mut history = MemoryHistory::new(url);
    router.start(&mut history);
    router.process_pending();
    (router, history)
}

/// Compact rendering of hook events for order assertions.
#[allow(dead_code)]
pub fn describe(events: &[RouterEvent]) -> Vec<String> {
    events
        .iter()
        .map(|event| match event {
            RouterEvent::RouteChange(change) => format!("route:{}", change.pathname),
            RouterEvent::AppEnter { key, .. } => format!("enter:{key}"),
            RouterEvent::AppLeave { key } => format!("leave:{key}"),
            RouterEvent::LoadingApp { key } => format!("loading:{key}"),
            RouterEvent::FinishLoading { key } => format!("finish:{key}"),
            RouterEvent::NotFound { .. } => "not_found".to_string(),
            RouterEvent::Error(failure) => format!("error:{}", failure.message),
        })
        .collect()
}

/// Events recorded since the last call, leaving the log empty.
#[allow(dead_code)]
pub fn take_events(router: &mut TestRouter) -> Vec<String> {
    let events = describe(router.hooks());
    router.hooks_mut().clear();
    events
}
