use std::collections::BTreeMap;

/// Kind of periodic or event-driven work a component is listening to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub enum ListenerKind {
    /// Viewport resize notifications.
    Resize,
    /// Scroll position notifications.
    Scroll,
    /// Frame or interval ticks from the shared clock.
    Tick,
}

/// Opaque token for one active listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

/// Ledger of every listener the orchestrator has handed out.
///
/// Each token is released at most once; a second release is reported as `false` and has
/// no other effect. Counting per kind makes leaks observable after scope disposal.
#[derive(Debug, Default)]
pub struct Subscriptions {
    next: u64,
    active: BTreeMap<SubscriptionId, ListenerKind>,
    released: u64,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&mut self, kind: ListenerKind) -> SubscriptionId {
        let id = SubscriptionId(self.next);
        self.next += 1;
        self.active.insert(id, kind);
        tracing::trace!(?kind, id = id.0, "listener acquired");
        id
    }

    /// Release `id`. Returns `false` when it was already released (or never issued).
    pub fn release(&mut self, id: SubscriptionId) -> bool {
        match self.active.remove(&id) {
            Some(kind) => {
                self.released += 1;
                tracing::trace!(?kind, id = id.0, "listener released");
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self, id: SubscriptionId) -> bool {
        self.active.contains_key(&id)
    }

    /// Number of live listeners of `kind`.
    pub fn active(&self, kind: ListenerKind) -> usize {
        self.active.values().filter(|k| **k == kind).count()
    }

    pub fn total_active(&self) -> usize {
        self.active.len()
    }

    /// Total number of successful releases over the ledger's lifetime.
    pub fn released(&self) -> u64 {
        self.released
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/subscription.rs"]
mod tests;
