//! Micro-frontend router core.
//!
//! Maps the current location to exactly one registered micro application,
//! drives its enter/leave and loading lifecycle, and exposes a small phase
//! machine (booting, normal, not-found, error) to a host rendering layer.

pub mod assets;
pub mod config;
pub mod lifecycle;
pub mod location;
pub mod observability;
pub mod routing;

pub use assets::{AssetConfig, AssetLifecycle, AssetRef, ImmediateAssets};
pub use config::RouterConfig;
pub use lifecycle::{
    ChannelHooks, LoadFailure, Orchestrator, Phase, RouterEvent, RouterHooks, RouterRuntime,
    RouterSnapshot, Shutdown, Signal, SignalSender, ViewState,
};
pub use location::{Location, LocationParser, MemoryHistory, NavigationKind, NavigationSource};
pub use routing::{match_route, AppKey, RouteDefinition, RouteMatch, RouteTable};
