//! Change notification for model consumers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// What changed in the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelEvent {
    /// A reconciliation pass published new views.
    Reconciled,
    /// The model finished its first pass.
    Initialized,
    /// An action started or finished.
    PendingActions,
    /// The build recommendation was raised or cleared.
    BuildPrompt,
}

/// Handle identifying a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type Listener = Arc<dyn Fn(ModelEvent) + Send + Sync>;

/// Registered model listeners.
#[derive(Clone, Default)]
pub struct Observers {
    next_id: Arc<AtomicU64>,
    listeners: Arc<Mutex<HashMap<SubscriptionId, Listener>>>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .expect("observer lock poisoned")
            .insert(id, listener);
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners
            .lock()
            .expect("observer lock poisoned")
            .remove(&id)
            .is_some()
    }

    /// Deliver `event` to every listener.
    ///
    /// Listeners run outside the lock and may subscribe or unsubscribe.
    pub fn notify(&self, event: ModelEvent) {
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .expect("observer lock poisoned")
            .values()
            .cloned()
            .collect();
        for listener in listeners {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().expect("observer lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("listeners", &self.len())
            .finish()
    }
}
