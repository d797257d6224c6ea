//! Lifecycle subsystem.
//!
//! # Data Flow
//! ```text
//! Navigation source ──┐
//! Asset collaborator ─┼─→ signals.rs (one channel)
//! Config watcher ─────┘        │
//!                              ▼
//!                      orchestrator.rs (state machine)
//!                      ├─→ routing (resolve active definition)
//!                      ├─→ hooks.rs (enter / leave / loading / ...)
//!                      ├─→ assets (load / unload)
//!                      └─→ phase.rs snapshot → host binding
//!
//! runtime.rs: async loop feeding signals, stopped by shutdown.rs
//! ```
//!
//! # Design Decisions
//! - Explicit start/stop pair instead of mount/unmount callbacks
//! - Not-found and errors arrive as injected signals, not a global bus
//! - Teardown is a meta-state outside the phase machine

pub mod hooks;
pub mod orchestrator;
pub mod phase;
pub mod runtime;
pub mod shutdown;
pub mod signals;

pub use hooks::{ChannelHooks, RouteChange, RouterEvent, RouterHooks};
pub use orchestrator::Orchestrator;
pub use phase::{Phase, RouterSnapshot, ViewState};
pub use runtime::RouterRuntime;
pub use shutdown::Shutdown;
pub use signals::{signal_channel, LoadFailure, Signal, SignalReceiver, SignalSender};
