//! The lifecycle orchestrator.
//!
//! # Responsibilities
//! - Own phase, active key and loading key; nothing else mutates them
//! - Re-resolve the active definition on every navigation
//! - Fire leave/enter hooks and drive the asset collaborator on changes
//! - Track in-flight loads and ignore completions for superseded keys
//! - Discard every signal once torn down
//!
//! # Design Decisions
//! - Single-threaded: signals are handled one at a time, in arrival order
//! - All inputs are signals on one channel; `dispatch` is the only entry
//! - The running flag is checked at the top of every handler
//! - Leave always fires before enter, within the same handler
//! - Not-found and load failures are phases, never returned errors

use crate::assets::{AssetConfig, AssetLifecycle};
use crate::lifecycle::hooks::{RouteChange, RouterHooks};
use crate::lifecycle::phase::{Phase, RouterSnapshot};
use crate::lifecycle::signals::{signal_channel, LoadFailure, Signal, SignalReceiver, SignalSender};
use crate::location::{Location, LocationParser, NavigationKind, NavigationSource, Subscription};
use crate::observability::metrics::{self, DropReason};
use crate::routing::{AppKey, RouteMatch, RouteTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Idle,
    Running,
    TornDown,
}

/// Drives route resolution and the app lifecycle state machine.
pub struct Orchestrator<H, A> {
    table: RouteTable,
    parser: LocationParser,
    asset_config: AssetConfig,
    hooks: H,
    assets: A,
    sender: SignalSender,
    receiver: SignalReceiver,
    subscription: Option<Subscription>,
    lifecycle: Lifecycle,
    phase: Phase,
    location: Option<Location>,
    active: Option<RouteMatch>,
    loading: Option<AppKey>,
    error: Option<LoadFailure>,
    /// Failure reported while booting, applied once initialised.
    pending_error: Option<LoadFailure>,
}

impl<H, A> std::fmt::Debug for Orchestrator<H, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("lifecycle", &self.lifecycle)
            .field("phase", &self.phase)
            .field("active", &self.active.as_ref().map(|a| &a.key))
            .field("loading", &self.loading)
            .field("routes", &self.table.len())
            .finish()
    }
}

impl<H, A> Orchestrator<H, A>
where
    H: RouterHooks,
    A: AssetLifecycle,
{
    /// Create an orchestrator in the `Booting` phase.
    pub fn new(table: RouteTable, hooks: H, assets: A) -> Self {
        let (sender, receiver) = signal_channel();
        Self {
            table,
            parser: LocationParser::default(),
            asset_config: AssetConfig::default(),
            hooks,
            assets,
            sender,
            receiver,
            subscription: None,
            lifecycle: Lifecycle::Idle,
            phase: Phase::Booting,
            location: None,
            active: None,
            loading: None,
            error: None,
            pending_error: None,
        }
    }

    pub fn with_parser(mut self, parser: LocationParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_asset_config(mut self, config: AssetConfig) -> Self {
        self.asset_config = config;
        self
    }

    /// A sender feeding this orchestrator.
    pub fn sender(&self) -> SignalSender {
        self.sender.clone()
    }

    /// Subscribe to navigation and initialise the asset collaborator.
    ///
    /// Resolution starts once the collaborator reports `Initialized`.
    /// Starting twice, or after `stop`, does nothing.
    pub fn start(&mut self, navigation: &mut dyn NavigationSource) {
        if self.lifecycle != Lifecycle::Idle {
            tracing::warn!(lifecycle = ?self.lifecycle, "Router already started");
            return;
        }
        self.lifecycle = Lifecycle::Running;
        tracing::info!(routes = self.table.len(), "Router starting");

        self.subscription = Some(navigation.subscribe(self.sender.clone()));
        self.assets.initialize(&self.asset_config, self.sender.clone());
    }

    /// Release subscriptions and tear the collaborator down.
    ///
    /// Every signal delivered afterwards is discarded. No hooks fire.
    pub fn stop(&mut self) {
        let was_running = self.lifecycle == Lifecycle::Running;
        if self.lifecycle == Lifecycle::TornDown {
            return;
        }
        self.lifecycle = Lifecycle::TornDown;

        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }
        if was_running {
            self.assets.teardown();
        }
        tracing::info!(phase = %self.phase, "Router torn down");
    }

    /// Handle one signal.
    pub fn dispatch(&mut self, signal: Signal) {
        match self.lifecycle {
            Lifecycle::Running => {}
            Lifecycle::Idle => {
                tracing::debug!(signal = signal.name(), "Router not started, dropping signal");
                metrics::record_signal_dropped(DropReason::NotStarted);
                return;
            }
            Lifecycle::TornDown => {
                tracing::debug!(signal = signal.name(), "Router torn down, dropping signal");
                metrics::record_signal_dropped(DropReason::TornDown);
                return;
            }
        }

        match signal {
            Signal::Navigate { url, kind } => self.handle_navigate(url, kind),
            Signal::Initialized => self.handle_initialized(),
            Signal::LoadingStarted(key) => self.handle_loading_started(key),
            Signal::LoadingFinished(key) => self.handle_loading_finished(key),
            Signal::NotFound => self.handle_not_found(),
            Signal::Error(failure) => self.handle_error(failure),
            Signal::UpdateRoutes(table) => self.handle_update_routes(table),
        }
    }

    /// Handle every queued signal, including ones queued while handling.
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(signal) = self.receiver.try_recv() {
            self.dispatch(signal);
            handled += 1;
        }
        handled
    }

    /// Wait for the next queued signal.
    pub async fn next_signal(&mut self) -> Option<Signal> {
        self.receiver.recv().await
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn active_key(&self) -> Option<&AppKey> {
        self.active.as_ref().map(|a| &a.key)
    }

    pub fn active_match(&self) -> Option<&RouteMatch> {
        self.active.as_ref()
    }

    pub fn loading_key(&self) -> Option<&AppKey> {
        self.loading.as_ref()
    }

    pub fn error(&self) -> Option<&LoadFailure> {
        self.error.as_ref()
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    pub fn assets(&self) -> &A {
        &self.assets
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    pub fn is_torn_down(&self) -> bool {
        self.lifecycle == Lifecycle::TornDown
    }

    /// Current state for the host binding.
    pub fn snapshot(&self) -> RouterSnapshot {
        RouterSnapshot {
            phase: self.phase,
            active: self.active.clone(),
            loading: self.loading.clone(),
            error: self.error.clone(),
            location: self.location.clone(),
        }
    }

    fn handle_navigate(&mut self, url: String, kind: NavigationKind) {
        let location = match self.parser.parse(&url) {
            Ok(location) => location,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Ignoring unparsable location");
                return;
            }
        };

        let changed = self
            .location
            .as_ref()
            .map_or(true, |current| current.href != location.href);
        if changed {
            tracing::debug!(href = %location.href, kind = %kind, "Route changed");
            metrics::record_navigation(kind);
            self.hooks.on_route_change(&RouteChange::new(&location, kind));
        }
        self.location = Some(location);

        if self.phase == Phase::Booting {
            tracing::debug!(url = %url, "Collaborator not initialized, deferring resolution");
            return;
        }
        self.reconcile(true);
    }

    fn handle_initialized(&mut self) {
        if self.phase != Phase::Booting {
            tracing::debug!("Duplicate initialized signal ignored");
            return;
        }
        tracing::info!("Asset collaborator initialized");

        if let Some(failure) = self.pending_error.take() {
            self.fail(failure);
        } else if self.location.is_some() {
            self.reconcile(true);
        } else {
            self.set_phase(Phase::Normal);
        }
    }

    fn handle_loading_started(&mut self, key: AppKey) {
        if self.loading.as_ref() == Some(&key) {
            tracing::debug!(key = %key, "Load already tracked");
            return;
        }
        if let Some(previous) = &self.loading {
            tracing::debug!(superseded = %previous, key = %key, "Load superseded");
        }

        self.loading = Some(key.clone());
        let definition = self.table.find_by_key(&key).cloned();
        self.hooks.on_loading_app(&key, definition.as_deref());
    }

    fn handle_loading_finished(&mut self, key: AppKey) {
        if self.loading.as_ref() != Some(&key) {
            tracing::debug!(key = %key, loading = ?self.loading, "Ignoring stale loading-finished signal");
            metrics::record_signal_dropped(DropReason::Stale);
            return;
        }

        self.loading = None;
        if self.active_key() != Some(&key) {
            tracing::debug!(key = %key, active = ?self.active_key(), "Load finished for an app no longer active");
            metrics::record_signal_dropped(DropReason::Stale);
            return;
        }
        let definition = self.table.find_by_key(&key).cloned();
        self.hooks.on_finish_loading(&key, definition.as_deref());
    }

    fn handle_not_found(&mut self) {
        if self.phase == Phase::Booting {
            tracing::debug!("Not-found signal while booting ignored");
            return;
        }
        if let Some(previous) = self.active.take() {
            self.leave(&previous);
        }
        let location = self.location.clone();
        self.enter_not_found(location.as_ref());
    }

    fn handle_error(&mut self, failure: LoadFailure) {
        if self.phase == Phase::Booting {
            tracing::warn!(error = %failure, "Load failure while booting, deferring");
            self.pending_error = Some(failure);
            return;
        }
        self.fail(failure);
    }

    fn handle_update_routes(&mut self, table: RouteTable) {
        tracing::info!(routes = table.len(), "Route table updated");
        self.table = table;
        if self.phase != Phase::Booting {
            self.reconcile(false);
        }
    }

    /// Resolve the current location and apply the outcome.
    ///
    /// Navigations always leave `Error`; table updates only do so when the
    /// active definition changes.
    fn reconcile(&mut self, navigated: bool) {
        let Some(location) = self.location.clone() else {
            return;
        };
        let next = self.table.resolve(&location);

        let switched = self.active.as_ref().map(|a| &a.key) != next.as_ref().map(|m| &m.key);
        if switched {
            if let Some(previous) = self.active.take() {
                self.leave(&previous);
            }
        }

        match next {
            Some(route) => {
                if switched {
                    tracing::info!(key = %route.key, url = %route.url, basename = %route.basename, "App enter");
                    metrics::record_app_enter();
                    self.hooks.on_app_enter(&route);
                    self.assets.load(&route);
                }
                self.active = Some(route);
                if switched || navigated {
                    self.set_phase(Phase::Normal);
                }
            }
            None => {
                self.active = None;
                self.enter_not_found(Some(&location));
            }
        }
    }

    fn leave(&mut self, previous: &RouteMatch) {
        tracing::info!(key = %previous.key, "App leave");
        metrics::record_app_leave();
        self.hooks.on_app_leave(previous);
        self.assets.unload(previous);
        // A load still in flight for the departed app can no longer finish.
        if self.loading.as_ref() == Some(&previous.key) {
            self.loading = None;
        }
    }

    fn enter_not_found(&mut self, location: Option<&Location>) {
        if self.phase == Phase::NotFound {
            return;
        }
        tracing::info!(pathname = ?location.map(|l| &l.pathname), "No route matched");
        self.set_phase(Phase::NotFound);
        self.hooks.on_not_found(location);
    }

    fn fail(&mut self, failure: LoadFailure) {
        tracing::warn!(error = %failure, "App load failed");
        self.set_phase(Phase::Error);
        self.hooks.on_error(&failure);
        self.error = Some(failure);
    }

    fn set_phase(&mut self, next: Phase) {
        if self.phase == next {
            return;
        }
        tracing::info!(from = %self.phase, to = %next, "Router phase changed");
        metrics::record_phase_transition(next);
        self.phase = next;
        if next != Phase::Error {
            self.error = None;
        }
    }
}
