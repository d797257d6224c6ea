//! Navigation sources.
//!
//! # Responsibilities
//! - Define the contract a navigation source fulfils for the orchestrator
//! - Provide an in-process history stack for hosts without a browser
//! - Release listeners when their subscription is cancelled
//!
//! # Design Decisions
//! - A subscriber receives the current entry immediately (kind `Init`)
//! - Listeners whose channel is closed are pruned on the next broadcast
//! - The listener registry is a concurrent map so cancellation can happen
//!   from any thread

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::DashMap;

use crate::lifecycle::signals::SignalSender;
use crate::location::NavigationKind;

/// Something that produces navigation events.
pub trait NavigationSource {
    /// Start delivering navigation signals to `signals`.
    ///
    /// Delivery stops once the returned subscription is cancelled or dropped.
    fn subscribe(&mut self, signals: SignalSender) -> Subscription;
}

/// Handle to an active listener registration.
#[must_use = "dropping a Subscription cancels it"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to release.
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    /// Release the listener.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[derive(Debug)]
struct HistoryStack {
    entries: Vec<String>,
    index: usize,
}

#[derive(Debug)]
struct HistoryInner {
    stack: Mutex<HistoryStack>,
    listeners: DashMap<u64, SignalSender>,
    next_id: AtomicU64,
}

/// In-memory session history.
///
/// Cloning yields another handle to the same history.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    inner: Arc<HistoryInner>,
}

impl MemoryHistory {
    /// Create a history whose only entry is `initial`.
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(HistoryInner {
                stack: Mutex::new(HistoryStack {
                    entries: vec![initial.into()],
                    index: 0,
                }),
                listeners: DashMap::new(),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    fn stack(&self) -> MutexGuard<'_, HistoryStack> {
        self.inner
            .stack
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The current entry.
    pub fn current(&self) -> String {
        let stack = self.stack();
        stack.entries[stack.index].clone()
    }

    /// Number of entries in the stack.
    pub fn len(&self) -> usize {
        self.stack().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }

    /// Push a new entry, discarding any forward entries.
    pub fn push(&self, url: impl Into<String>) {
        let url = url.into();
        {
            let mut stack = self.stack();
            let keep = stack.index + 1;
            stack.entries.truncate(keep);
            stack.entries.push(url.clone());
            stack.index = keep;
        }
        self.broadcast(url, NavigationKind::Push);
    }

    /// Replace the current entry.
    pub fn replace(&self, url: impl Into<String>) {
        let url = url.into();
        {
            let mut stack = self.stack();
            let index = stack.index;
            stack.entries[index] = url.clone();
        }
        self.broadcast(url, NavigationKind::Replace);
    }

    /// Move `delta` entries through the stack. Returns false when out of range.
    pub fn go(&self, delta: isize) -> bool {
        let url = {
            let mut stack = self.stack();
            let target = stack.index as isize + delta;
            if delta == 0 || target < 0 || target as usize >= stack.entries.len() {
                return false;
            }
            stack.index = target as usize;
            stack.entries[stack.index].clone()
        };
        self.broadcast(url, NavigationKind::PopState);
        true
    }

    pub fn back(&self) -> bool {
        self.go(-1)
    }

    pub fn forward(&self) -> bool {
        self.go(1)
    }

    fn broadcast(&self, url: String, kind: NavigationKind) {
        let mut closed = Vec::new();
        for listener in self.inner.listeners.iter() {
            if !listener.value().navigate(url.clone(), kind) {
                closed.push(*listener.key());
            }
        }
        for id in closed {
            self.inner.listeners.remove(&id);
        }
    }
}

impl NavigationSource for MemoryHistory {
    fn subscribe(&mut self, signals: SignalSender) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        signals.navigate(self.current(), NavigationKind::Init);
        self.inner.listeners.insert(id, signals);

        let inner = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.listeners.remove(&id);
                tracing::debug!(listener = id, "History listener released");
            }
        })
    }
}
