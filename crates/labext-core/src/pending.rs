//! Bookkeeping of in-flight actions.
//!
//! [`PendingActions::begin`] registers an action and hands back a guard; the
//! action stays pending until the guard is dropped. Dropping happens on
//! success, on error and on cancellation alike, and both transitions emit
//! [`ModelEvent::PendingActions`].

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::observer::{ModelEvent, Observers};

#[derive(Debug, Default)]
struct Shared {
    next_id: AtomicU64,
    active: Mutex<HashSet<u64>>,
}

/// Set of outstanding actions.
#[derive(Debug, Clone)]
pub struct PendingActions {
    shared: Arc<Shared>,
    observers: Observers,
}

impl PendingActions {
    pub fn new(observers: Observers) -> Self {
        Self {
            shared: Arc::new(Shared::default()),
            observers,
        }
    }

    /// Register a new action and notify listeners immediately.
    pub fn begin(&self) -> PendingGuard {
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        self.shared
            .active
            .lock()
            .expect("pending lock poisoned")
            .insert(id);
        tracing::trace!(id, "Pending action started");
        self.observers.notify(ModelEvent::PendingActions);
        PendingGuard {
            id,
            tracker: self.clone(),
        }
    }

    /// Run `fut` as a pending action.
    pub async fn track<F: std::future::Future>(&self, fut: F) -> F::Output {
        let _guard = self.begin();
        fut.await
    }

    pub fn has_pending(&self) -> bool {
        self.len() > 0
    }

    pub fn len(&self) -> usize {
        self.shared.active.lock().expect("pending lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn finish(&self, id: u64) {
        let removed = self
            .shared
            .active
            .lock()
            .expect("pending lock poisoned")
            .remove(&id);
        if removed {
            tracing::trace!(id, "Pending action finished");
            self.observers.notify(ModelEvent::PendingActions);
        }
    }
}

/// Keeps one action pending until dropped.
#[derive(Debug)]
#[must_use = "the action stops being pending as soon as the guard is dropped"]
pub struct PendingGuard {
    id: u64,
    tracker: PendingActions,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.tracker.finish(self.id);
    }
}
