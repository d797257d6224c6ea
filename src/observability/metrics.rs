//! Router metrics.
//!
//! # Metrics
//! - `router_navigations_total` (counter): distinct navigations by kind
//! - `router_phase_transitions_total` (counter): transitions by target phase
//! - `router_app_transitions_total` (counter): app enter/leave
//! - `router_signals_dropped_total` (counter): ignored signals by reason

use crate::lifecycle::phase::Phase;
use crate::location::NavigationKind;

/// Reason a signal was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Finish signal for a key that is no longer loading.
    Stale,
    /// Received after teardown.
    TornDown,
    /// Received before start.
    NotStarted,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stale => "stale",
            Self::TornDown => "torn_down",
            Self::NotStarted => "not_started",
        }
    }
}

pub fn record_navigation(kind: NavigationKind) {
    metrics::counter!("router_navigations_total", "kind" => kind.as_str()).increment(1);
}

pub fn record_phase_transition(phase: Phase) {
    metrics::counter!("router_phase_transitions_total", "phase" => phase.as_str()).increment(1);
}

pub fn record_app_enter() {
    metrics::counter!("router_app_transitions_total", "direction" => "enter").increment(1);
}

pub fn record_app_leave() {
    metrics::counter!("router_app_transitions_total", "direction" => "leave").increment(1);
}

pub fn record_signal_dropped(reason: DropReason) {
    metrics::counter!("router_signals_dropped_total", "reason" => reason.as_str()).increment(1);
}
