//! Bounded memo of word splits.

use std::collections::{BTreeMap, HashMap};

use parking_lot::Mutex;

/// Default number of words remembered per strategy.
pub const DEFAULT_CAPACITY: usize = 50_000;

/// Thread-safe least-recently-used cache from word text to split point.
///
/// The cache only stores byte offsets computed by a pure segmentation
/// function, so a hit always returns what a fresh computation would.
/// A capacity of zero disables caching.
pub struct SegmentCache {
    inner: Mutex<Lru>,
}

impl SegmentCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Lru::new(capacity)),
        }
    }

    /// Return the cached split for `word`, computing and storing it on a miss.
    pub fn get_or_insert_with(&self, word: &str, compute: impl FnOnce() -> usize) -> usize {
        if let Some(split) = self.inner.lock().get(word) {
            return split;
        }
        let split = compute();
        self.inner.lock().insert(word, split);
        split
    }

    pub fn contains(&self, word: &str) -> bool {
        self.inner.lock().map.contains_key(word)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity
    }

    pub fn clear(&self) {
        let mut lru = self.inner.lock();
        lru.map.clear();
        lru.order.clear();
    }
}

impl Default for SegmentCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for SegmentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lru = self.inner.lock();
        f.debug_struct("SegmentCache")
            .field("len", &lru.map.len())
            .field("capacity", &lru.capacity)
            .finish()
    }
}

struct Slot {
    split: usize,
    stamp: u64,
}

/// Recency is tracked with a monotonically increasing stamp; `order` maps
/// stamps back to keys so the oldest entry is the first one in the tree.
struct Lru {
    capacity: usize,
    clock: u64,
    map: HashMap<String, Slot>,
    order: BTreeMap<u64, String>,
}

impl Lru {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            clock: 0,
            map: HashMap::new(),
            order: BTreeMap::new(),
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn get(&mut self, key: &str) -> Option<usize> {
        let stamp = self.tick();
        let slot = self.map.get_mut(key)?;
        if let Some(owned) = self.order.remove(&slot.stamp) {
            self.order.insert(stamp, owned);
        }
        slot.stamp = stamp;
        Some(slot.split)
    }

    fn insert(&mut self, key: &str, split: usize) {
        if self.capacity == 0 {
            return;
        }
        let stamp = self.tick();

        if let Some(slot) = self.map.get_mut(key) {
            self.order.remove(&slot.stamp);
            slot.split = split;
            slot.stamp = stamp;
            self.order.insert(stamp, key.to_string());
            return;
        }

        if self.map.len() >= self.capacity
            && let Some((_, oldest)) = self.order.pop_first()
        {
            self.map.remove(&oldest);
        }

        self.map.insert(key.to_string(), Slot { split, stamp });
        self.order.insert(stamp, key.to_string());
    }
}
