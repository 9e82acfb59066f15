//! Bounded read-through cache in front of a slower dictionary lookup.

use super::DictionaryCache;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

/// Keeps the most recently resolved names of `L` in memory.
///
/// Only hits are cached, so a name registered after a miss is picked up
/// on the next lookup.
pub struct CachedLookup<L> {
    inner: L,
    entries: Mutex<LruCache<i32, String>>,
}

impl<L: DictionaryCache> CachedLookup<L> {
    /// Wraps `inner`, holding at most `capacity` names (minimum 1).
    pub fn new(inner: L, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Number of names currently cached.
    pub fn cached_len(&self) -> usize {
        self.entries.lock().len()
    }
}

impl<L: DictionaryCache> DictionaryCache for CachedLookup<L> {
    fn get(&self, code: i32) -> Option<String> {
        if let Some(name) = self.entries.lock().get(&code) {
            return Some(name.clone());
        }

        let name = self.inner.get(code)?;
        self.entries.lock().put(code, name.clone());
        Some(name)
    }
}
