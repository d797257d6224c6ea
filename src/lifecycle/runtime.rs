//! Async driver for the orchestrator.
//!
//! # Responsibilities
//! - Feed queued signals to the orchestrator one at a time
//! - Publish a snapshot for the host binding after every signal
//! - Tear the orchestrator down when shutdown fires
//!
//! # Design Decisions
//! - One task owns the orchestrator; no locking around its state
//! - Snapshots go through a watch channel so slow renderers only ever see
//!   the latest state

use tokio::sync::{broadcast, watch};

use crate::assets::AssetLifecycle;
use crate::lifecycle::hooks::RouterHooks;
use crate::lifecycle::orchestrator::Orchestrator;
use crate::lifecycle::phase::RouterSnapshot;
use crate::lifecycle::signals::SignalSender;

/// Runs an orchestrator until shutdown.
pub struct RouterRuntime<H, A> {
    orchestrator: Orchestrator<H, A>,
    snapshots: watch::Sender<RouterSnapshot>,
}

impl<H, A> RouterRuntime<H, A>
where
    H: RouterHooks,
    A: AssetLifecycle,
{
    pub fn new(orchestrator: Orchestrator<H, A>) -> Self {
        let (snapshots, _) = watch::channel(orchestrator.snapshot());
        Self {
            orchestrator,
            snapshots,
        }
    }

    /// Receiver of the latest router snapshot.
    pub fn subscribe(&self) -> watch::Receiver<RouterSnapshot> {
        self.snapshots.subscribe()
    }

    /// Sender feeding the wrapped orchestrator.
    pub fn sender(&self) -> SignalSender {
        self.orchestrator.sender()
    }

    /// Process signals until `shutdown` fires, then stop the orchestrator
    /// and hand it back.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> Orchestrator<H, A> {
        tracing::info!("Router runtime started");

        loop {
            let next = tokio::select! {
                signal = self.orchestrator.next_signal() => signal,
                _ = shutdown.recv() => {
                    tracing::info!("Router runtime received shutdown signal, exiting loop");
                    None
                }
            };
            let Some(signal) = next else {
                break;
            };

            self.orchestrator.dispatch(signal);
            self.publish();
        }

        self.orchestrator.stop();
        self.publish();
        self.orchestrator
    }

    fn publish(&self) {
        let snapshot = self.orchestrator.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}
