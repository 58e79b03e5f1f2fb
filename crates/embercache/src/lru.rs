//! LRU (Least Recently Used) cache implementation
//!
//! The recency list is a doubly linked list threaded through an arena of
//! slots, so `prev`/`next` are plain `usize` indices rather than pointers.
//! Two permanent sentinel slots bracket the list, which keeps every link a
//! valid index and removes boundary special-casing.

use std::collections::HashMap;
use std::hash::Hash;

use ahash::RandomState;

use crate::error::{Error, Result};

/// Head sentinel slot; its `next` is the most-recently-used entry
const HEAD: usize = 0;

/// Tail sentinel slot; its `prev` is the least-recently-used entry
const TAIL: usize = 1;

/// Key/value payload of an occupied slot
struct Entry<K, V> {
    key: K,
    value: V,
}

/// Arena slot in the recency list
///
/// Sentinels and free slots carry no payload.
struct Node<K, V> {
    prev: usize,
    next: usize,
    entry: Option<Entry<K, V>>,
}

/// Fixed-capacity LRU cache with O(1) `get` and `put`
///
/// The cache owns an arena of list slots and a key index pointing into it.
/// Both structures mutate together on every operation: a key is present in
/// the index exactly when its slot is linked between the two sentinels.
///
/// `get` promotes the accessed entry to most-recently-used, so lookups take
/// `&mut self` even though the returned value is unchanged by repetition.
pub struct LruCache<K, V> {
    index: HashMap<K, usize, RandomState>,
    nodes: Vec<Node<K, V>>,
    free: Vec<usize>,
    capacity: usize,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a cache holding at most `capacity` entries
    ///
    /// Returns [`Error::ZeroCapacity`] for `capacity == 0`: a cache that can
    /// never hold an entry is rejected up front instead of underflowing at
    /// the first eviction.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }

        // Slots 0 and 1 are the permanent sentinels.
        let mut nodes = Vec::with_capacity(capacity + 2);
        nodes.push(Node {
            prev: HEAD,
            next: TAIL,
            entry: None,
        });
        nodes.push(Node {
            prev: HEAD,
            next: TAIL,
            entry: None,
        });

        Ok(Self {
            index: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
            nodes,
            free: Vec::new(),
            capacity,
        })
    }

    /// Get a value, promoting its key to most-recently-used
    ///
    /// Returns `None` on a miss; a miss has no side effects.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.promote(idx);
        self.nodes[idx].entry.as_ref().map(|e| &e.value)
    }

    /// Insert or update a key-value pair
    ///
    /// An existing key is overwritten in place and promoted; this never
    /// counts against capacity and never evicts another key. A new key
    /// evicts the least-recently-used entry first when the cache is full.
    /// Either way the key ends up most-recently-used.
    pub fn put(&mut self, key: K, value: V) {
        if let Some(&idx) = self.index.get(&key) {
            if let Some(entry) = self.nodes[idx].entry.as_mut() {
                entry.value = value;
            }
            self.promote(idx);
            return;
        }

        if self.index.len() == self.capacity {
            self.evict();
        }

        let idx = self.alloc(key.clone(), value);
        self.link_front(idx);
        self.index.insert(key, idx);
    }

    /// Remove a key, returning its value
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.index.remove(key)?;
        self.unlink(idx);
        let entry = self.nodes[idx].entry.take();
        self.free.push(idx);
        entry.map(|e| e.value)
    }

    /// Look up a value without promoting its key
    pub fn peek(&self, key: &K) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.nodes[idx].entry.as_ref().map(|e| &e.value)
    }

    /// Whether `key` is currently cached, without promoting it
    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Maximum number of entries, fixed at construction
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every entry, keeping the capacity
    pub fn clear(&mut self) {
        self.index.clear();
        self.nodes.truncate(2);
        self.nodes[HEAD].next = TAIL;
        self.nodes[TAIL].prev = HEAD;
        self.free.clear();
    }

    /// Relink an occupied slot to the most-recently-used position
    fn promote(&mut self, idx: usize) {
        if self.nodes[HEAD].next == idx {
            return; // already at front
        }

        self.unlink(idx);
        self.link_front(idx);
    }

    /// Insert slot `idx` directly after the head sentinel
    fn link_front(&mut self, idx: usize) {
        let first = self.nodes[HEAD].next;
        self.nodes[idx].prev = HEAD;
        self.nodes[idx].next = first;
        self.nodes[HEAD].next = idx;
        self.nodes[first].prev = idx;
    }

    /// Splice slot `idx` out of the list by joining its neighbors
    fn unlink(&mut self, idx: usize) {
        let prev = self.nodes[idx].prev;
        let next = self.nodes[idx].next;
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
    }

    /// Remove the least-recently-used entry from both index and list
    fn evict(&mut self) {
        let victim = self.nodes[TAIL].prev;
        if victim == HEAD {
            return; // empty list
        }

        self.unlink(victim);
        if let Some(entry) = self.nodes[victim].entry.take() {
            self.index.remove(&entry.key);
        }
        self.free.push(victim);
    }

    /// Place a payload in a slot, reusing a freed slot when one exists
    ///
    /// Links are placeholders until `link_front` writes them.
    fn alloc(&mut self, key: K, value: V) -> usize {
        let node = Node {
            prev: HEAD,
            next: TAIL,
            entry: Some(Entry { key, value }),
        };

        if let Some(idx) = self.free.pop() {
            self.nodes[idx] = node;
            idx
        } else {
            let idx = self.nodes.len();
            self.nodes.push(node);
            idx
        }
    }
}

#[cfg(test)]
impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone + std::fmt::Debug,
{
    /// Keys from most- to least-recently-used
    fn recency_keys(&self) -> Vec<K> {
        let mut keys = Vec::with_capacity(self.len());
        let mut cur = self.nodes[HEAD].next;
        while cur != TAIL {
            let node = &self.nodes[cur];
            if let Some(entry) = &node.entry {
                keys.push(entry.key.clone());
            }
            cur = node.next;
        }
        keys
    }

    /// Panic if any structural invariant is broken
    fn check_invariants(&self) {
        // Forward walk: every linked slot is occupied and indexed to itself.
        let mut forward = Vec::new();
        let mut cur = self.nodes[HEAD].next;
        while cur != TAIL {
            assert!(forward.len() <= self.nodes.len(), "cycle in recency list");
            let node = &self.nodes[cur];
            let entry = node.entry.as_ref().expect("linked slot without payload");
            assert_eq!(
                self.index.get(&entry.key).copied(),
                Some(cur),
                "index does not map {:?} to its slot",
                entry.key
            );
            forward.push(cur);
            cur = node.next;
        }

        assert_eq!(forward.len(), self.index.len(), "list and index disagree");
        assert!(forward.len() <= self.capacity, "size above capacity");

        // Backward walk must visit the same slots in reverse.
        let mut backward = Vec::new();
        let mut cur = self.nodes[TAIL].prev;
        while cur != HEAD {
            assert!(backward.len() <= self.nodes.len(), "cycle in recency list");
            backward.push(cur);
            cur = self.nodes[cur].prev;
        }
        backward.reverse();
        assert_eq!(forward, backward, "prev/next links disagree");

        // Free slots are payload-free and disjoint from the list.
        for &idx in &self.free {
            assert!(idx >= 2, "sentinel on the free list");
            assert!(self.nodes[idx].entry.is_none(), "free slot holds payload");
            assert!(!forward.contains(&idx), "free slot still linked");
        }

        // Every slot is a sentinel, linked, or free; the arena never grows
        // past capacity + 2.
        assert_eq!(
            self.nodes.len(),
            2 + forward.len() + self.free.len(),
            "arena slots unaccounted for"
        );
        assert!(self.nodes.len() <= self.capacity + 2, "arena above capacity");
    }
}
