//! Location subsystem.
//!
//! # Data Flow
//! ```text
//! Navigation source (history.rs)
//!     → Signal::Navigate { url, kind }
//!     → parse.rs (url string → Location)
//!     → Location handed to the route matcher
//! ```
//!
//! # Design Decisions
//! - Location is immutable; every navigation produces a fresh value
//! - Relative strings resolve against a configurable base URL
//! - Hash routing reads pathname and query from the fragment
//! - The path utility is pure: no state besides its configuration

pub mod history;
pub mod parse;

pub use history::{MemoryHistory, NavigationSource, Subscription};
pub use parse::{HashType, Location, LocationError, LocationParser, NavigationKind};
