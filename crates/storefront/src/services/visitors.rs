//! Per-visitor cart and room design.
//!
//! The session cookie only carries a visitor ID; the cart and design it
//! points at live here, behind one async mutex per visitor. Writers hold the
//! lock for the whole read-modify-write, so concurrent requests from the same
//! visitor apply one after another instead of overwriting each other.
//!
//! Entries are bounded by count and dropped after the same week of
//! inactivity that expires the session cookie.

use std::sync::Arc;
use std::time::Duration;

use elegant_haven_core::{Cart, Design};
use moka::future::Cache;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// How long an untouched visitor is kept.
pub const VISITOR_IDLE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Everything the storefront remembers about one visitor.
#[derive(Debug, Clone, Default)]
pub struct Visitor {
    pub cart: Cart,
    pub design: Design,
}

/// Visitor state keyed by the session's visitor ID. Cheap to clone.
#[derive(Clone)]
pub struct VisitorStore {
    cache: Cache<Uuid, Arc<Mutex<Visitor>>>,
}

impl VisitorStore {
    /// Create a store holding at most `capacity` visitors.
    #[must_use]
    pub fn new(capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .time_to_idle(VISITOR_IDLE)
            .build();
        Self { cache }
    }

    /// Lock a visitor for writing, creating an empty one on first use.
    ///
    /// Concurrent first calls for the same ID share one entry.
    pub async fn lock(&self, id: Uuid) -> OwnedMutexGuard<Visitor> {
        let entry = self
            .cache
            .get_with(id, async { Arc::new(Mutex::new(Visitor::default())) })
            .await;
        entry.lock_owned().await
    }

    /// Read a visitor without creating one. Unknown or absent IDs read as an
    /// empty visitor.
    pub async fn read<T>(&self, id: Option<Uuid>, view: impl FnOnce(&Visitor) -> T) -> T {
        let entry = match id {
            Some(id) => self.cache.get(&id).await,
            None => None,
        };
        match entry {
            Some(entry) => view(&*entry.lock().await),
            None => view(&Visitor::default()),
        }
    }

    /// Whether `id` has any stored state.
    pub async fn contains(&self, id: Uuid) -> bool {
        self.cache.get(&id).await.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use elegant_haven_core::FurnitureKind;

    use super::*;

    #[tokio::test]
    async fn test_reads_do_not_create_visitors() {
        let store = VisitorStore::new(16);
        let id = Uuid::new_v4();

        let items = store.read(Some(id), |v| v.design.items().len()).await;
        assert_eq!(items, 0);
        assert!(store.read(None, |v| v.cart.is_empty()).await);
        assert!(!store.contains(id).await);
    }

    #[tokio::test]
    async fn test_writes_are_visible_to_reads() {
        let store = VisitorStore::new(16);
        let id = Uuid::new_v4();

        store.lock(id).await.design.add_furniture(FurnitureKind::Bed);

        assert!(store.contains(id).await);
        assert_eq!(store.read(Some(id), |v| v.design.items().len()).await, 1);
        assert_eq!(store.read(Some(Uuid::new_v4()), |v| v.design.items().len()).await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_writers_all_apply() {
        let store = VisitorStore::new(16);
        let id = Uuid::new_v4();

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..16 {
            let store = store.clone();
            tasks.spawn(async move {
                let mut visitor = store.lock(id).await;
                tokio::task::yield_now().await;
                visitor.design.add_furniture(FurnitureKind::Chair);
            });
        }
        while let Some(result) = tasks.join_next().await {
            result.unwrap();
        }

        assert_eq!(store.read(Some(id), |v| v.design.items().len()).await, 16);
    }
}
