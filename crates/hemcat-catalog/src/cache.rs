//! Snapshot cache keyed by an explicit refresh token.
//!
//! Callers own both the cache and the token. Reading with the token the cached
//! snapshot was built for is free; bumping the token forces the next read to
//! rebuild.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::pipeline::CatalogSnapshot;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RefreshToken(u64);

impl RefreshToken {
    #[must_use]
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct CatalogCache {
    slot: Mutex<Option<(RefreshToken, Arc<CatalogSnapshot>)>>,
}

impl CatalogCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the snapshot cached for `token`, or builds, stores and returns a
    /// new one. Concurrent callers wait for a single build.
    pub async fn get_or_refresh<F, Fut>(&self, token: RefreshToken, refresh: F) -> Arc<CatalogSnapshot>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = CatalogSnapshot>,
    {
        let mut slot = self.slot.lock().await;
        if let Some((cached, snapshot)) = slot.as_ref() {
            if *cached == token {
                tracing::debug!(token = token.value(), "catalogue cache hit");
                return Arc::clone(snapshot);
            }
        }

        tracing::debug!(token = token.value(), "catalogue cache miss");
        let snapshot = Arc::new(refresh().await);
        *slot = Some((token, Arc::clone(&snapshot)));
        snapshot
    }

    /// The cached snapshot, only if it was built for `token`.
    pub async fn get(&self, token: RefreshToken) -> Option<Arc<CatalogSnapshot>> {
        self.slot
            .lock()
            .await
            .as_ref()
            .filter(|(cached, _)| *cached == token)
            .map(|(_, snapshot)| Arc::clone(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn snapshot_with(asset_count: usize) -> CatalogSnapshot {
        CatalogSnapshot {
            asset_count,
            ..CatalogSnapshot::default()
        }
    }

    #[tokio::test]
    async fn same_token_reuses_snapshot() {
        let cache = CatalogCache::new();
        let counter = AtomicUsize::new(0);
        let builds = &counter;
        let token = RefreshToken::default();

        for _ in 0..3 {
            let snapshot = cache
                .get_or_refresh(token, move || async move {
                    builds.fetch_add(1, Ordering::SeqCst);
                    snapshot_with(7)
                })
                .await;
            assert_eq!(snapshot.asset_count, 7);
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn bumped_token_rebuilds() {
        let cache = CatalogCache::new();
        let token = RefreshToken::new(1);
        cache.get_or_refresh(token, || async { snapshot_with(1) }).await;

        let next = token.next();
        assert!(cache.get(next).await.is_none());
        let rebuilt = cache.get_or_refresh(next, || async { snapshot_with(2) }).await;
        assert_eq!(rebuilt.asset_count, 2);
        assert!(cache.get(token).await.is_none());
        assert_eq!(cache.get(next).await.unwrap().asset_count, 2);
    }

    #[test]
    fn tokens_order_by_value() {
        let token = RefreshToken::new(41);
        assert!(token.next() > token);
        assert_eq!(token.next().value(), 42);
    }
}
