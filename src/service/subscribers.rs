use crate::types::SchemaSyncedEvent;
use arc_swap::ArcSwap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub type SchemaSyncedHandler = Arc<dyn Fn(&SchemaSyncedEvent) + Send + Sync>;

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Entries = Vec<(SubscriptionId, SchemaSyncedHandler)>;

/// Copy-on-write list of schema-synced subscribers.
///
/// Dispatch iterates the list as it was when dispatch began, so handlers
/// that subscribe or unsubscribe while running do not affect the current
/// round.
pub(crate) struct SubscriberList {
    entries: ArcSwap<Entries>,
    next_id: AtomicU64,
}

impl SubscriberList {
    pub(crate) fn new() -> Self {
        SubscriberList {
            entries: ArcSwap::from_pointee(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub(crate) fn subscribe(&self, handler: SchemaSyncedHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.rcu(|current| {
            let mut next = Entries::clone(current);
            next.push((id, Arc::clone(&handler)));
            next
        });
        id
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let previous = self.entries.rcu(|current| {
            current
                .iter()
                .filter(|(sid, _)| *sid != id)
                .cloned()
                .collect::<Entries>()
        });
        previous.iter().any(|(sid, _)| *sid == id)
    }

    /// Detach everyone. Returns how many subscribers were removed.
    pub(crate) fn clear(&self) -> usize {
        self.entries.swap(Arc::new(Vec::new())).len()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.load().len()
    }

    /// Deliver `event` to every subscriber. A panicking handler is logged
    /// and skipped. Returns the number of handlers that completed.
    pub(crate) fn dispatch(&self, event: &SchemaSyncedEvent) -> usize {
        let entries = self.entries.load_full();
        let mut delivered = 0;
        for (id, handler) in entries.iter() {
            match catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(()) => delivered += 1,
                Err(_) => tracing::warn!(
                    "[SCHEMA {}] subscriber {:?} panicked handling generation {}",
                    event.service,
                    id,
                    event.generation
                ),
            }
        }
        delivered
    }
}
