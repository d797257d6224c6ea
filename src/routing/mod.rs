//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Location (pathname, query, hash)
//!     → router.rs (scan definitions in registration order)
//!     → matcher.rs (evaluate each path element / predicate)
//!     → Return: RouteMatch (key, params, basename) or None
//!
//! Table compilation (on construction or route update):
//!     RouteDefinition[]
//!     → join router basename onto every path element
//!     → compile segment patterns
//!     → freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Tables are compiled once and immutable afterwards
//! - No regex: patterns are compared segment by segment
//! - Deterministic: same location and table always yield the same match
//! - First match wins (registration order), later overlapping
//!   definitions are unreachable
//! - No match is a normal outcome, not an error

pub mod definition;
pub mod matcher;
pub mod router;

pub use definition::{AppContent, AppKey, LocationPredicate, PathRule, PathSpec, RouteDefinition};
pub use matcher::{Matcher, PathMatch, PathPattern};
pub use router::{match_route, RouteMatch, RouteTable};
