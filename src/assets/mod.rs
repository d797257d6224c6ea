//! Asset lifecycle contract.
//!
//! # Responsibilities
//! - Define what the orchestrator asks of an asset loader
//! - Carry the asset removal policy through to the loader untouched
//!
//! # Data Flow
//! ```text
//! Orchestrator
//!     → initialize(config, signals)   once, on start
//!     → load(route) / unload(route)   on active definition change
//!     → teardown()                    on stop
//!
//! Loader (asynchronously, via SignalSender)
//!     → Initialized
//!     → LoadingStarted(key) / LoadingFinished(key)
//!     → Error(payload) / NotFound
//! ```
//!
//! # Design Decisions
//! - Calls never block and return nothing; progress comes back as signals
//! - Superseded loads need not be aborted: the orchestrator ignores
//!   completions for keys it no longer tracks

use std::sync::Arc;

use serde::Serialize;

use crate::lifecycle::signals::SignalSender;
use crate::routing::{AppContent, RouteMatch};

/// Kind of asset element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Script,
    Style,
}

/// An asset element owned by an app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetRef {
    pub url: String,
    pub kind: AssetKind,
}

impl AssetRef {
    /// Assets declared by an app's content, scripts first.
    pub fn from_content(content: &AppContent) -> Vec<AssetRef> {
        let scripts = content.scripts.iter().map(|url| AssetRef {
            url: url.clone(),
            kind: AssetKind::Script,
        });
        let styles = content.styles.iter().map(|url| AssetRef {
            url: url.clone(),
            kind: AssetKind::Style,
        });
        scripts.chain(styles).collect()
    }
}

/// Decides whether an asset element is removed on unload.
pub type AssetRemovalPolicy = Arc<dyn Fn(&AssetRef) -> bool + Send + Sync>;

/// Loader configuration forwarded by the orchestrator.
#[derive(Clone, Default)]
pub struct AssetConfig {
    should_remove_asset: Option<AssetRemovalPolicy>,
}

impl std::fmt::Debug for AssetConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetConfig")
            .field("has_removal_policy", &self.should_remove_asset.is_some())
            .finish()
    }
}

impl AssetConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_removal_policy<F>(mut self, policy: F) -> Self
    where
        F: Fn(&AssetRef) -> bool + Send + Sync + 'static,
    {
        self.should_remove_asset = Some(Arc::new(policy));
        self
    }

    /// Consult the removal policy. Without one every asset is removed.
    pub fn should_remove_asset(&self, asset: &AssetRef) -> bool {
        self.should_remove_asset
            .as_ref()
            .map(|policy| policy(asset))
            .unwrap_or(true)
    }
}

/// The asset loader the orchestrator drives.
pub trait AssetLifecycle {
    /// Prepare the environment. Must eventually send `Initialized`.
    fn initialize(&mut self, config: &AssetConfig, signals: SignalSender);

    /// Start loading the resources of a newly active app.
    fn load(&mut self, app: &RouteMatch);

    /// Release the resources of an app that is no longer active.
    fn unload(&mut self, app: &RouteMatch);

    /// Release everything; no signals may be relied upon afterwards.
    fn teardown(&mut self);
}

/// Loader for apps without remote resources.
///
/// Reports every load as started and finished straight away.
#[derive(Debug, Default)]
pub struct ImmediateAssets {
    signals: Option<SignalSender>,
}

impl ImmediateAssets {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AssetLifecycle for ImmediateAssets {
    fn initialize(&mut self, _config: &AssetConfig, signals: SignalSender) {
        signals.initialized();
        self.signals = Some(signals);
    }

    fn load(&mut self, app: &RouteMatch) {
        if let Some(signals) = &self.signals {
            signals.loading_started(app.key.clone());
            signals.loading_finished(app.key.clone());
        }
    }

    fn unload(&mut self, _app: &RouteMatch) {}

    fn teardown(&mut self) {
        self.signals = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removal_policy_defaults_to_remove() {
        let asset = AssetRef {
            url: "https://cdn.example.com/shared.js".into(),
            kind: AssetKind::Script,
        };
        assert!(AssetConfig::new().should_remove_asset(&asset));

        let keep_shared = AssetConfig::new().with_removal_policy(|a| !a.url.contains("shared"));
        assert!(!keep_shared.should_remove_asset(&asset));
    }

    #[test]
    fn test_assets_from_content() {
        let content = AppContent {
            scripts: vec!["/a.js".into()],
            styles: vec!["/a.css".into()],
            ..Default::default()
        };
        let assets = AssetRef::from_content(&content);
        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].kind, AssetKind::Script);
        assert_eq!(assets[1].kind, AssetKind::Style);
    }
}
