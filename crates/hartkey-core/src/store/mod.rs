// ── Snapshot storage ──
//
// Holds the last successfully built snapshot. Reads are lock-free
// `arc-swap` loads; every publish (fresh or fallback) is also pushed
// through a `watch` channel so consumers can await changes.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tokio::sync::watch;

use crate::model::Snapshot;

/// Single-slot snapshot store.
///
/// The slot only ever holds a fully built snapshot from a successful
/// cycle, so it is both the current snapshot and the fallback.
pub(crate) struct SnapshotStore {
    current: ArcSwapOption<Snapshot>,
    published: watch::Sender<Option<Arc<Snapshot>>>,
}

impl SnapshotStore {
    pub(crate) fn new() -> Self {
        let (published, _) = watch::channel(None);
        Self {
            current: ArcSwapOption::empty(),
            published,
        }
    }

    /// Current snapshot (cheap `Arc` clone).
    pub(crate) fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.load_full()
    }

    /// Replace the slot with a freshly built snapshot and notify subscribers.
    pub(crate) fn publish(&self, snapshot: Arc<Snapshot>) {
        self.current.store(Some(Arc::clone(&snapshot)));
        // `send_replace` updates unconditionally, even with zero receivers.
        self.published.send_replace(Some(snapshot));
    }

    /// Re-notify subscribers with the retained snapshot, unchanged.
    ///
    /// Returns `None` when nothing has been published yet.
    pub(crate) fn republish(&self) -> Option<Arc<Snapshot>> {
        let retained = self.current()?;
        self.published.send_replace(Some(Arc::clone(&retained)));
        Some(retained)
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.published.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use indexmap::IndexMap;

    use super::*;

    #[test]
    fn republish_without_snapshot_is_none() {
        let store = SnapshotStore::new();
        assert!(store.current().is_none());
        assert!(store.republish().is_none());
    }

    #[test]
    fn republish_returns_same_allocation() {
        let store = SnapshotStore::new();
        let snap = Arc::new(Snapshot::new(Vec::new(), IndexMap::new()));
        store.publish(Arc::clone(&snap));

        let mut rx = store.subscribe();
        let again = store.republish().unwrap();
        assert!(Arc::ptr_eq(&snap, &again));
        assert!(rx.has_changed().unwrap());
        assert!(Arc::ptr_eq(rx.borrow_and_update().as_ref().unwrap(), &snap));
    }
}
