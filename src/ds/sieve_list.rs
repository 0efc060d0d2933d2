//! Visited-bit eviction list for the SIEVE algorithm.
//!
//! Stores nodes in a [`SlotPool`] and links them by [`SlotId`] into a single
//! insertion-ordered chain (newest at the head, oldest at the tail), with a
//! hash index for O(1) key lookup and a persistent scan cursor (the "hand")
//! that survives between evictions.
//!
//! ## Architecture
//!
//! ```text
//!   index: FxHashMap<K, SlotId>          pool: P (SlotPool<Node<K, V>>)
//!   ┌─────────┬────────┐                 ┌────────┬───────────────────────────┐
//!   │  key C  │  id_c  │                 │ SlotId │ Node { k, v, visited,     │
//!   │  key B  │  id_b  │                 │        │        prev, next }       │
//!   │  key A  │  id_a  │                 └────────┴───────────────────────────┘
//!   └─────────┴────────┘
//!
//!   head ─► [C] ◄──► [B] ◄──► [A] ◄── tail
//!  (newest)           ▲           (oldest)
//!                     │
//!                    hand (eviction cursor, persists across calls)
//! ```
//!
//! ## Eviction scan
//!
//! ```text
//!   cursor = hand, or tail if the hand is unset
//!   while cursor.visited:
//!       cursor.visited = false        (loses its shield for this pass)
//!       cursor = cursor.prev, or wrap to tail
//!   victim = cursor
//!   hand   = victim.prev              (next eviction resumes here)
//!   unlink victim, erase from index
//! ```
//!
//! Each step either stops at an unvisited node or clears one more visited
//! flag, and flags are only set again by later lookups, so the scan
//! terminates within one traversal of the chain.
//!
//! ## Performance Characteristics
//!
//! | Operation  | Time        | Notes                                   |
//! |------------|-------------|-----------------------------------------|
//! | `get`      | O(1)        | Sets the visited bit, no list movement  |
//! | `insert`   | O(1) amort. | Full-capacity path runs the scan        |
//! | `remove`   | O(1)        | Index lookup + unlink                   |
//! | `contains` | O(1)        | Index lookup only                       |
//!
//! `check_invariants()` and `debug_validate_invariants()` verify the
//! index/chain/hand agreement; the latter is available in debug/test builds.

use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};

use rustc_hash::FxHashMap;

use crate::ds::slot_arena::{SlotArena, SlotId, SlotPool};
use crate::error::InvariantError;

/// One cache entry plus its chain linkage.
///
/// `visited` is atomic so lookups can mark an entry through a shared
/// reference; everything else is plain data owned by the list.
#[derive(Debug)]
pub struct Node<K, V> {
    key: K,
    value: V,
    visited: AtomicBool,
    /// Neighbor toward the head (newer side); `None` at the head.
    prev: Option<SlotId>,
    /// Neighbor toward the tail (older side); `None` at the tail.
    next: Option<SlotId>,
}

/// The SIEVE engine: index + insertion-ordered chain + eviction hand.
///
/// Entries are chained in insertion order and never reordered; a lookup only
/// flips the entry's visited bit. Eviction scans from the hand (or the tail)
/// toward the head, demoting visited entries and removing the first
/// unvisited one.
///
/// `P` selects node storage and defaults to [`SlotArena`]; see
/// [`SlotPool`] for supplying a custom pool.
pub struct SieveList<K, V, P = SlotArena<Node<K, V>>> {
    pool: P,
    index: FxHashMap<K, SlotId>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
    hand: Option<SlotId>,
    capacity: usize,
    marker: PhantomData<V>,
}

impl<K, V> SieveList<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates a list bounded to `capacity` entries, with node storage
    /// preallocated in the default arena.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        Self::with_pool(capacity, SlotArena::with_capacity(capacity))
    }
}

impl<K, V, P> SieveList<K, V, P>
where
    K: Clone + Eq + Hash,
    P: SlotPool<Node<K, V>>,
{
    /// Creates a list bounded to `capacity` entries on top of a caller-built
    /// node pool. The pool must start empty.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_pool(capacity: usize, pool: P) -> Self {
        assert!(capacity > 0, "capacity must be greater than zero");
        debug_assert!(pool.is_empty(), "node pool must start empty");
        Self {
            pool,
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            head: None,
            tail: None,
            hand: None,
            capacity,
            marker: PhantomData,
        }
    }

    /// Returns the fixed entry capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns `true` if `key` is present. Does not mark the entry visited.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Returns `key`'s value without marking the entry visited.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.pool.get(id).map(|node| &node.value)
    }

    /// Returns `key`'s value and marks the entry visited.
    ///
    /// Takes `&self`: marking is an atomic bit set and the chain is not
    /// touched, which is exactly what distinguishes SIEVE from LRU.
    pub fn get(&self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        let node = self.pool.get(id)?;
        node.visited.store(true, Ordering::Relaxed);
        Some(&node.value)
    }

    /// Returns `key`'s value mutably and marks the entry visited.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let id = *self.index.get(key)?;
        let node = self.pool.get_mut(id)?;
        *node.visited.get_mut() = true;
        Some(&mut node.value)
    }

    /// Marks `key`'s entry visited without reading the value; returns
    /// `false` if the key is missing.
    pub fn touch(&self, key: &K) -> bool {
        match self.index.get(key) {
            Some(&id) => match self.pool.get(id) {
                Some(node) => {
                    node.visited.store(true, Ordering::Relaxed);
                    true
                },
                None => false,
            },
            None => false,
        }
    }

    /// Inserts or updates `key`.
    ///
    /// An existing entry is updated in place and marked visited, returning
    /// `false`. Otherwise the entry is admitted at the head with its visited
    /// bit clear, evicting first if the list is full, and `true` is
    /// returned.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        match self.index.get(&key) {
            Some(&id) => {
                let node = self.pool.get_mut(id).expect("index references a live node");
                node.value = value;
                *node.visited.get_mut() = true;
                false
            },
            None => {
                self.admit(key, value);
                true
            },
        }
    }

    /// Returns a mutable handle to `key`'s value, admitting a
    /// default-constructed value first if the key is absent.
    ///
    /// A hit marks the entry visited; a fresh admission leaves the bit
    /// clear, same as [`insert`](Self::insert).
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        match self.index.get(&key) {
            Some(&id) => {
                let node = self.pool.get_mut(id).expect("index references a live node");
                *node.visited.get_mut() = true;
                &mut node.value
            },
            None => {
                let id = self.admit(key, V::default());
                let node = self.pool.get_mut(id).expect("freshly admitted node is live");
                &mut node.value
            },
        }
    }

    /// Removes `key` and returns its value, if present.
    ///
    /// If the removed node is the current hand, the hand moves to the node's
    /// `prev` neighbor first so the next eviction resumes from a valid
    /// position.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let id = self.index.remove(key)?;
        if self.hand == Some(id) {
            self.hand = self.pool.get(id).expect("index references a live node").prev;
        }
        self.detach(id);
        let node = self.pool.remove(id).expect("detached node is live");
        Some(node.value)
    }

    /// Runs one SIEVE eviction and returns the removed entry, or `None` if
    /// the list is empty.
    ///
    /// The scan starts at the hand (or the tail), clears visited bits while
    /// walking toward the head and wrapping to the tail, and removes the
    /// first unvisited node. The hand is left on the victim's `prev`
    /// neighbor.
    pub fn pop_victim(&mut self) -> Option<(K, V)> {
        let mut cursor = self.hand.or(self.tail)?;
        loop {
            let node = self.pool.get_mut(cursor).expect("hand references a live node");
            let visited = node.visited.get_mut();
            if !*visited {
                break;
            }
            *visited = false;
            cursor = match node.prev {
                Some(prev) => prev,
                None => self.tail.expect("non-empty list has a tail"),
            };
        }

        self.hand = self.pool.get(cursor).expect("scan stops on a live node").prev;
        self.detach(cursor);
        let node = self.pool.remove(cursor).expect("detached node is live");
        self.index.remove(&node.key);
        Some((node.key, node.value))
    }

    /// Removes every entry and resets `head`, `tail`, and the hand.
    pub fn clear(&mut self) {
        self.index.clear();
        self.pool.clear();
        self.head = None;
        self.tail = None;
        self.hand = None;
    }

    /// Iterates entries from newest to oldest without marking anything
    /// visited.
    pub fn iter(&self) -> Iter<'_, K, V, P> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    /// Evicts if full, then links a fresh unvisited node at the head.
    fn admit(&mut self, key: K, value: V) -> SlotId {
        if self.len() == self.capacity {
            let evicted = self.pop_victim();
            debug_assert!(evicted.is_some(), "a full list must yield an eviction victim");
        }
        debug_assert!(self.len() < self.capacity);

        let id = self.pool.insert(Node {
            key: key.clone(),
            value,
            visited: AtomicBool::new(false),
            prev: None,
            next: self.head,
        });
        match self.head {
            Some(head) => {
                self.pool
                    .get_mut(head)
                    .expect("head references a live node")
                    .prev = Some(id);
            },
            None => self.tail = Some(id),
        }
        self.head = Some(id);
        self.index.insert(key, id);
        id
    }

    /// Unlinks `id` from the chain, repairing neighbors and endpoints. Safe
    /// for the sole element. The slot itself stays live until the caller
    /// frees it.
    fn detach(&mut self, id: SlotId) {
        let (prev, next) = {
            let node = self.pool.get(id).expect("detach target is live");
            (node.prev, node.next)
        };

        match prev {
            Some(prev_id) => {
                self.pool
                    .get_mut(prev_id)
                    .expect("chain neighbor is live")
                    .next = next;
            },
            None => self.head = next,
        }
        match next {
            Some(next_id) => {
                self.pool
                    .get_mut(next_id)
                    .expect("chain neighbor is live")
                    .prev = prev;
            },
            None => self.tail = prev,
        }
    }

    /// Verifies the index/chain/hand agreement in O(len).
    ///
    /// A violation is a bug in this library; the `Result` form exists so
    /// randomized harnesses can report which invariant broke.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.index.len() != self.pool.len() {
            return Err(InvariantError::new("index and pool disagree on entry count"));
        }
        if self.len() > self.capacity {
            return Err(InvariantError::new("length exceeds capacity"));
        }

        let mut count = 0usize;
        let mut prev: Option<SlotId> = None;
        let mut cursor = self.head;
        while let Some(id) = cursor {
            let node = self
                .pool
                .get(id)
                .ok_or_else(|| InvariantError::new("chain references a freed slot"))?;
            if node.prev != prev {
                return Err(InvariantError::new("back-link does not match forward walk"));
            }
            count += 1;
            if count > self.index.len() {
                return Err(InvariantError::new("chain is longer than the index"));
            }
            prev = Some(id);
            cursor = node.next;
        }
        if prev != self.tail {
            return Err(InvariantError::new("tail does not terminate the chain"));
        }
        if count != self.index.len() {
            return Err(InvariantError::new("chain length and index size differ"));
        }

        for (key, &id) in &self.index {
            let node = self
                .pool
                .get(id)
                .ok_or_else(|| InvariantError::new("index references a freed slot"))?;
            if node.key != *key {
                return Err(InvariantError::new(
                    "index entry points at a node with a different key",
                ));
            }
        }

        if let Some(hand) = self.hand {
            if self.pool.get(hand).is_none() {
                return Err(InvariantError::new("hand references a freed slot"));
            }
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    /// Panicking form of [`check_invariants`](Self::check_invariants).
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("invariant violation: {err}");
        }
    }

    #[cfg(any(test, debug_assertions))]
    /// Returns the keys in chain order, newest to oldest.
    pub fn debug_snapshot_keys(&self) -> Vec<K> {
        self.iter().map(|(key, _)| key.clone()).collect()
    }

    #[cfg(any(test, debug_assertions))]
    /// Returns the key under the hand, if the hand is set.
    pub fn debug_hand_key(&self) -> Option<K> {
        let hand = self.hand?;
        self.pool.get(hand).map(|node| node.key.clone())
    }
}

impl<K, V, P> std::fmt::Debug for SieveList<K, V, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SieveList")
            .field("capacity", &self.capacity)
            .field("len", &self.index.len())
            .finish_non_exhaustive()
    }
}

/// Iterator over `(&K, &V)` pairs from newest to oldest.
pub struct Iter<'a, K, V, P> {
    list: &'a SieveList<K, V, P>,
    cursor: Option<SlotId>,
}

impl<'a, K, V, P> Iterator for Iter<'a, K, V, P>
where
    P: SlotPool<Node<K, V>>,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let node = self.list.pool.get(id)?;
        self.cursor = node.next;
        Some((&node.key, &node.value))
    }
}
