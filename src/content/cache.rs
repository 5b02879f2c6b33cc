use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Freshness-window cache of one collection's `list()` result.
///
/// Every invalidation bumps a generation counter. A load that started before
/// an invalidation carries the old generation and is refused by [`store`],
/// so a slow read can never overwrite the effect of a newer write.
///
/// [`store`]: ListCache::store
pub struct ListCache<E> {
    ttl: Duration,
    inner: Arc<RwLock<Slot<E>>>,
}

struct Slot<E> {
    generation: u64,
    entry: Option<(Instant, Arc<Vec<E>>)>,
}

impl<E> Clone for ListCache<E> {
    fn clone(&self) -> Self {
        Self {
            ttl: self.ttl,
            inner: self.inner.clone(),
        }
    }
}

impl<E> Default for ListCache<E> {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl<E> ListCache<E> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Arc::new(RwLock::new(Slot {
                generation: 0,
                entry: None,
            })),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn generation(&self) -> u64 {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }

    /// The cached list, if one was stored less than `ttl` ago.
    pub fn fresh(&self) -> Option<Arc<Vec<E>>> {
        let slot = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        match &slot.entry {
            Some((at, items)) if at.elapsed() < self.ttl => Some(items.clone()),
            _ => None,
        }
    }

    /// Returns `false` and drops `items` when the cache was invalidated since
    /// `generation` was read.
    pub fn store(&self, generation: u64, items: Vec<E>) -> bool {
        let mut slot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if slot.generation != generation {
            return false;
        }
        slot.entry = Some((Instant::now(), Arc::new(items)));
        true
    }

    pub fn invalidate(&self) {
        let mut slot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        slot.generation += 1;
        slot.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_within_window() {
        let cache = ListCache::new(Duration::from_secs(60));
        assert!(cache.fresh().is_none());
        assert!(cache.store(cache.generation(), vec![1, 2, 3]));
        assert_eq!(cache.fresh().unwrap().as_slice(), [1, 2, 3]);
    }

    #[test]
    fn zero_ttl_never_serves() {
        let cache = ListCache::new(Duration::ZERO);
        cache.store(cache.generation(), vec![1]);
        assert!(cache.fresh().is_none());
    }

    #[test]
    fn invalidate_drops_entry_and_refuses_stale_store() {
        let cache = ListCache::new(Duration::from_secs(60));
        let before = cache.generation();
        cache.store(before, vec!["old"]);
        cache.invalidate();
        assert!(cache.fresh().is_none());
        assert!(!cache.store(before, vec!["stale"]));
        assert!(cache.fresh().is_none());
        assert!(cache.store(cache.generation(), vec!["new"]));
        assert_eq!(cache.fresh().unwrap().as_slice(), ["new"]);
    }

    #[test]
    fn clones_share_state() {
        let cache = ListCache::new(Duration::from_secs(60));
        let other = cache.clone();
        cache.store(cache.generation(), vec![7]);
        assert_eq!(other.fresh().unwrap().as_slice(), [7]);
        other.invalidate();
        assert!(cache.fresh().is_none());
    }
}
