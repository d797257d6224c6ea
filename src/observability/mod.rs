//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Orchestrator / config watcher / CLI produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters via the metrics facade)
//!
//! Consumers:
//!     → stderr (pretty or JSON lines)
//!     → whatever metrics recorder the host installs
//! ```
//!
//! # Design Decisions
//! - Structured fields (key, phase, kind) instead of formatted strings
//! - The library never installs a metrics recorder itself
//! - Recording without a recorder is a no-op

pub mod logging;
pub mod metrics;
