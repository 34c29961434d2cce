//! Bounded memo of fetch results, keyed by request arguments.

use log::debug;
use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;

/// Least-recently-used map with a fixed capacity.
///
/// Capacities are small (tens of entries), so recency is kept in a plain
/// queue and touched linearly. A capacity of zero disables memoization.
#[derive(Debug)]
pub struct MemoCache<K, V> {
    capacity: usize,
    entries: HashMap<K, V>,
    recency: VecDeque<K>, // front = least recently used
}

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            recency: VecDeque::with_capacity(capacity),
        }
    }

    /// Returns a clone of the cached value and marks it as recently used.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let value = self.entries.get(key)?.clone();
        self.touch(key);
        Some(value)
    }

    /// Stores a value, evicting the least recently used entry when full.
    pub fn insert(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.insert(key.clone(), value).is_some() {
            self.touch(&key);
            return;
        }
        self.recency.push_back(key);
        while self.entries.len() > self.capacity {
            let Some(oldest) = self.recency.pop_front() else {
                break;
            };
            debug!("Evicting memoized result for {:?}", oldest);
            self.entries.remove(&oldest);
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn touch(&mut self, key: &K) {
        if let Some(pos) = self.recency.iter().position(|k| k == key) {
            if let Some(k) = self.recency.remove(pos) {
                self.recency.push_back(k);
            }
        }
    }
}
