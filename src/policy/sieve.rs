//! SIEVE cache replacement policy.
//!
//! SIEVE keeps entries in insertion order and approximates recency with one
//! visited bit per entry plus a persistent eviction cursor (the "hand"). A
//! hit sets the bit and nothing else, so reads never contend on list
//! structure the way LRU's move-to-front does.
//!
//! ## Algorithm
//!
//! ```text
//! GET(key):
//!   1. Look up the node in the hash index
//!   2. Set visited = true
//!   3. Return the value
//!   Cost: O(1), a hash lookup and a bit set
//!
//! INSERT(key, value):
//!   1. If the key exists: update the value, set visited = true
//!   2. If at capacity: run the eviction scan
//!   3. Link a new unvisited node at the head
//!
//! EVICT():
//!   cursor = hand, or the tail on the first scan
//!   while cursor.visited:
//!     cursor.visited = false      // survives one pass, then loses immunity
//!     cursor = cursor.prev, wrapping to the tail
//!   evict cursor; hand = cursor.prev
//! ```
//!
//! Unlike CLOCK, the hand resumes where the previous eviction stopped
//! instead of sweeping a fixed ring, and unlike LRU nothing moves on access.
//!
//! ## Trade-offs
//!
//! | Aspect         | SIEVE                     | True LRU               |
//! |----------------|---------------------------|------------------------|
//! | Hit cost       | O(1) bit set              | O(1) list move         |
//! | Hit mutability | shared (`&self`)          | exclusive (`&mut self`)|
//! | Eviction       | amortized O(1) scan       | exact LRU pop          |
//! | Overhead/entry | 1 flag + 2 slot indices   | 2 pointers             |
//!
//! ## Example Usage
//!
//! ```
//! use sievekit::policy::sieve::SieveCache;
//!
//! let mut cache = SieveCache::new(100);
//!
//! cache.insert("page1", "content1");
//! cache.insert("page2", "content2");
//!
//! // A hit sets the visited bit; no list operations.
//! assert_eq!(cache.get(&"page1"), Some(&"content1"));
//!
//! // Visited entries are skipped once by the eviction scan.
//! ```
//!
//! ## Implementation
//!
//! [`SieveCache`] wraps [`SieveList`](crate::ds::SieveList), which owns the
//! index, the arena-backed chain, and the hand. The `concurrency` feature
//! adds [`ConcurrentSieveCache`], the same cache behind one
//! `parking_lot::RwLock`.

use std::cmp::Ordering;
use std::hash::Hash;

use crate::ds::sieve_list::Iter;
use crate::ds::{Node, SieveList, SlotArena, SlotPool};
use crate::error::{ConfigError, InvariantError};
use crate::traits::{CoreCache, MutableCache};

#[cfg(feature = "concurrency")]
use crate::traits::ConcurrentCache;

#[cfg(feature = "metrics")]
use crate::metrics::{MetricsSnapshotProvider, SieveMetrics, SieveMetricsSnapshot};

/// A fixed-capacity cache with SIEVE eviction.
///
/// Single-threaded: `get` returns a live reference into the cache, which is
/// safe here because the borrow pins the cache until the caller is done with
/// it. For shared use see [`ConcurrentSieveCache`].
///
/// `P` selects node storage (default [`SlotArena`]); see
/// [`SlotPool`](crate::ds::SlotPool).
///
/// # Type Parameters
///
/// - `K`: key type, `Clone + Eq + Hash`
/// - `V`: value type
///
/// # Example
///
/// ```
/// use sievekit::policy::sieve::SieveCache;
///
/// let mut cache = SieveCache::new(3);
///
/// cache.insert("a", 1);
/// cache.insert("b", 2);
///
/// assert_eq!(cache.get(&"a"), Some(&1));
/// assert_eq!(cache.len(), 2);
/// ```
pub struct SieveCache<K, V, P = SlotArena<Node<K, V>>> {
    list: SieveList<K, V, P>,
    #[cfg(feature = "metrics")]
    metrics: SieveMetrics,
}

impl<K, V> SieveCache<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. Use [`try_new`](Self::try_new) to
    /// handle that case without panicking.
    ///
    /// # Example
    ///
    /// ```
    /// use sievekit::policy::sieve::SieveCache;
    ///
    /// let cache: SieveCache<String, i32> = SieveCache::new(100);
    /// assert_eq!(cache.capacity(), 100);
    /// assert!(cache.is_empty());
    /// ```
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(cache) => cache,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates a cache holding at most `capacity` entries, or a
    /// [`ConfigError`] if `capacity` is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use sievekit::policy::sieve::SieveCache;
    ///
    /// assert!(SieveCache::<u64, u64>::try_new(16).is_ok());
    /// assert!(SieveCache::<u64, u64>::try_new(0).is_err());
    /// ```
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        Self::try_with_pool(capacity, SlotArena::with_capacity(capacity))
    }
}

impl<K, V, P> SieveCache<K, V, P>
where
    K: Clone + Eq + Hash,
    P: SlotPool<Node<K, V>>,
{
    /// Creates a cache on top of a caller-built node pool.
    ///
    /// The pool must start empty; it is how node storage is customized
    /// (preallocated, instrumented, and so on) without touching eviction
    /// logic.
    ///
    /// # Example
    ///
    /// ```
    /// use sievekit::ds::{Node, SlotArena};
    /// use sievekit::policy::sieve::SieveCache;
    ///
    /// let pool: SlotArena<Node<u64, String>> = SlotArena::with_capacity(256);
    /// let cache = SieveCache::try_with_pool(256, pool).unwrap();
    /// assert_eq!(cache.capacity(), 256);
    /// ```
    pub fn try_with_pool(capacity: usize, pool: P) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("cache capacity must be greater than zero"));
        }
        Ok(Self {
            list: SieveList::with_pool(capacity, pool),
            #[cfg(feature = "metrics")]
            metrics: SieveMetrics::default(),
        })
    }

    /// Returns the fixed entry capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.list.capacity()
    }

    /// Returns the current number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if the cache holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Returns `true` if `key` is present.
    ///
    /// Does not set the visited bit, so existence checks never shield an
    /// entry from eviction.
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.list.contains(key)
    }

    /// Returns `key`'s value without setting the visited bit.
    #[inline]
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.list.peek(key)
    }

    /// Returns `key`'s value and sets the visited bit.
    ///
    /// Takes `&self`: marking is an atomic bit set and a hit never reorders
    /// the eviction chain.
    ///
    /// # Example
    ///
    /// ```
    /// use sievekit::policy::sieve::SieveCache;
    ///
    /// let mut cache = SieveCache::new(10);
    /// cache.insert("key", 42);
    ///
    /// assert_eq!(cache.get(&"key"), Some(&42));
    /// assert_eq!(cache.get(&"missing"), None);
    /// ```
    pub fn get(&self, key: &K) -> Option<&V> {
        let hit = self.list.get(key);
        #[cfg(feature = "metrics")]
        match hit {
            Some(_) => self.metrics.record_get_hit(),
            None => self.metrics.record_get_miss(),
        }
        hit
    }

    /// Returns `key`'s value mutably and sets the visited bit.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        #[cfg(feature = "metrics")]
        if self.list.contains(key) {
            self.metrics.record_get_hit();
        } else {
            self.metrics.record_get_miss();
        }
        self.list.get_mut(key)
    }

    /// Sets the visited bit for `key` without reading the value; returns
    /// `false` if the key is missing.
    #[inline]
    pub fn touch(&self, key: &K) -> bool {
        self.list.touch(key)
    }

    /// Inserts a key-value pair.
    ///
    /// Returns `true` when the entry is newly admitted, evicting one entry
    /// first if the cache is full. An existing key is updated in place, has
    /// its visited bit set, and `false` is returned with no eviction.
    ///
    /// # Example
    ///
    /// ```
    /// use sievekit::policy::sieve::SieveCache;
    ///
    /// let mut cache = SieveCache::new(2);
    /// assert!(cache.insert("a", 1));
    /// assert!(!cache.insert("a", 10));
    /// assert_eq!(cache.get(&"a"), Some(&10));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> bool {
        #[cfg(feature = "metrics")]
        let was_full = self.list.len() == self.list.capacity();
        let inserted = self.list.insert(key, value);
        #[cfg(feature = "metrics")]
        if inserted {
            self.metrics.record_insert_new();
            if was_full {
                self.metrics.record_eviction();
            }
        } else {
            self.metrics.record_insert_update();
        }
        inserted
    }

    /// Returns a mutable handle to `key`'s value, admitting a
    /// default-constructed value first if the key is absent.
    ///
    /// Shares the admission path with [`insert`](Self::insert): a miss at
    /// capacity evicts through the same scan, and the fresh entry starts
    /// unvisited. A hit sets the visited bit.
    ///
    /// # Example
    ///
    /// ```
    /// use sievekit::policy::sieve::SieveCache;
    ///
    /// let mut cache: SieveCache<&str, u64> = SieveCache::new(10);
    /// *cache.get_or_insert_default("hits") += 1;
    /// *cache.get_or_insert_default("hits") += 1;
    /// assert_eq!(cache.get(&"hits"), Some(&2));
    /// ```
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        #[cfg(feature = "metrics")]
        if self.list.contains(&key) {
            self.metrics.record_get_hit();
        } else {
            self.metrics.record_get_miss();
            self.metrics.record_insert_new();
            if self.list.len() == self.list.capacity() {
                self.metrics.record_eviction();
            }
        }
        self.list.get_or_insert_default(key)
    }

    /// Removes `key`, returning its value if it was present.
    ///
    /// If the removed entry is under the eviction hand, the hand moves to
    /// the entry's newer neighbor first so the next eviction resumes from a
    /// valid position.
    ///
    /// # Example
    ///
    /// ```
    /// use sievekit::policy::sieve::SieveCache;
    ///
    /// let mut cache = SieveCache::new(10);
    /// cache.insert("key", 42);
    ///
    /// assert_eq!(cache.remove(&"key"), Some(42));
    /// assert_eq!(cache.remove(&"key"), None);
    /// assert!(!cache.contains(&"key"));
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let removed = self.list.remove(key);
        #[cfg(feature = "metrics")]
        if removed.is_some() {
            self.metrics.record_remove();
        }
        removed
    }

    /// Runs one eviction scan and returns the removed entry, or `None` if
    /// the cache is empty. Useful for proactively freeing space.
    pub fn pop_victim(&mut self) -> Option<(K, V)> {
        let victim = self.list.pop_victim();
        #[cfg(feature = "metrics")]
        if victim.is_some() {
            self.metrics.record_eviction();
        }
        victim
    }

    /// Removes every entry and resets the eviction hand.
    pub fn clear(&mut self) {
        self.list.clear();
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
    }

    /// Iterates entries from newest to oldest without setting visited bits.
    pub fn iter(&self) -> Iter<'_, K, V, P> {
        self.list.iter()
    }

    /// Iterates keys from newest to oldest.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.list.iter().map(|(key, _)| key)
    }

    /// Iterates values from newest to oldest.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.list.iter().map(|(_, value)| value)
    }

    /// Verifies index/chain/hand agreement; see
    /// [`SieveList::check_invariants`](crate::ds::SieveList::check_invariants).
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.list.check_invariants()
    }

    #[cfg(any(test, debug_assertions))]
    /// Panicking form of [`check_invariants`](Self::check_invariants).
    pub fn debug_validate_invariants(&self) {
        self.list.debug_validate_invariants();
    }

    #[cfg(any(test, debug_assertions))]
    /// Returns the keys in chain order, newest to oldest.
    pub fn debug_snapshot_keys(&self) -> Vec<K> {
        self.list.debug_snapshot_keys()
    }
}

#[cfg(feature = "metrics")]
impl<K, V, P> SieveCache<K, V, P>
where
    K: Clone + Eq + Hash,
    P: SlotPool<Node<K, V>>,
{
    /// Copies the operation counters out.
    pub fn metrics_snapshot(&self) -> SieveMetricsSnapshot {
        self.metrics.snapshot(self.list.len(), self.list.capacity())
    }
}

#[cfg(feature = "metrics")]
impl<K, V, P> MetricsSnapshotProvider<SieveMetricsSnapshot> for SieveCache<K, V, P>
where
    K: Clone + Eq + Hash,
    P: SlotPool<Node<K, V>>,
{
    fn snapshot(&self) -> SieveMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V, P> CoreCache<K, V> for SieveCache<K, V, P>
where
    K: Clone + Eq + Hash,
    P: SlotPool<Node<K, V>>,
{
    #[inline]
    fn insert(&mut self, key: K, value: V) -> bool {
        SieveCache::insert(self, key, value)
    }

    #[inline]
    fn get(&self, key: &K) -> Option<&V> {
        SieveCache::get(self, key)
    }

    #[inline]
    fn contains(&self, key: &K) -> bool {
        SieveCache::contains(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        SieveCache::len(self)
    }

    #[inline]
    fn capacity(&self) -> usize {
        SieveCache::capacity(self)
    }

    fn clear(&mut self) {
        SieveCache::clear(self);
    }
}

impl<K, V, P> MutableCache<K, V> for SieveCache<K, V, P>
where
    K: Clone + Eq + Hash,
    P: SlotPool<Node<K, V>>,
{
    #[inline]
    fn remove(&mut self, key: &K) -> Option<V> {
        SieveCache::remove(self, key)
    }
}

impl<K, V, P> std::fmt::Debug for SieveCache<K, V, P>
where
    K: Clone + Eq + Hash,
    P: SlotPool<Node<K, V>>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SieveCache")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

/// Structural equality over capacity, length, and every key-value pair.
///
/// A differential-testing aid, not a core guarantee; two equal caches may
/// still evict differently because visited bits and the hand position are
/// not compared.
impl<K, V, P> PartialEq for SieveCache<K, V, P>
where
    K: Clone + Eq + Hash,
    V: PartialEq,
    P: SlotPool<Node<K, V>>,
{
    fn eq(&self, other: &Self) -> bool {
        self.capacity() == other.capacity()
            && self.len() == other.len()
            && self.iter().all(|(key, value)| other.peek(key) == Some(value))
    }
}

impl<K, V, P> Eq for SieveCache<K, V, P>
where
    K: Clone + Eq + Hash,
    V: Eq,
    P: SlotPool<Node<K, V>>,
{
}

/// Orders by length first, then lexicographically over key-sorted entries.
///
/// Sorting by key makes the order independent of hand position and slot
/// assignment. Like `PartialEq`, this exists for differential testing.
impl<K, V, P> PartialOrd for SieveCache<K, V, P>
where
    K: Clone + Ord + Hash,
    V: Ord,
    P: SlotPool<Node<K, V>>,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.len().cmp(&other.len()) {
            Ordering::Equal => {
                let mut lhs: Vec<(&K, &V)> = self.iter().collect();
                let mut rhs: Vec<(&K, &V)> = other.iter().collect();
                lhs.sort_by(|a, b| a.0.cmp(b.0));
                rhs.sort_by(|a, b| a.0.cmp(b.0));
                Some(lhs.cmp(&rhs))
            },
            ord => Some(ord),
        }
    }
}

// ===========================================================================
// Concurrency facade
// ===========================================================================

/// Thread-safe SIEVE cache: one `parking_lot::RwLock` around [`SieveCache`].
///
/// `contains`, `get`, and the `*_with` accessors take the shared lock, so
/// reads run concurrently with each other; every mutating operation takes
/// the exclusive lock. Setting the visited bit is an atomic store, which is
/// why a hit only needs the shared lock.
///
/// `get` returns an owned snapshot (`V: Clone`) rather than a reference: a
/// reference into the cache must not outlive the lock guard, and a snapshot
/// cannot alias an entry that a concurrent insert later evicts. Use
/// [`get_with`](Self::get_with) to borrow instead of cloning.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::thread;
///
/// use sievekit::policy::sieve::ConcurrentSieveCache;
///
/// let cache = Arc::new(ConcurrentSieveCache::new(100));
///
/// let writer = {
///     let cache = Arc::clone(&cache);
///     thread::spawn(move || {
///         for i in 0..50u64 {
///             cache.insert(i, i * 2);
///         }
///     })
/// };
/// writer.join().unwrap();
///
/// assert_eq!(cache.get(&21), Some(42));
/// assert!(cache.len() <= cache.capacity());
/// ```
#[cfg(feature = "concurrency")]
pub struct ConcurrentSieveCache<K, V, P = SlotArena<Node<K, V>>> {
    inner: parking_lot::RwLock<SieveCache<K, V, P>>,
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentSieveCache<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. Use [`try_new`](Self::try_new) to
    /// handle that case without panicking.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: parking_lot::RwLock::new(SieveCache::new(capacity)),
        }
    }

    /// Creates a cache holding at most `capacity` entries, or a
    /// [`ConfigError`] if `capacity` is zero.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            inner: parking_lot::RwLock::new(SieveCache::try_new(capacity)?),
        })
    }
}

#[cfg(feature = "concurrency")]
impl<K, V, P> ConcurrentSieveCache<K, V, P>
where
    K: Clone + Eq + Hash,
    P: SlotPool<Node<K, V>>,
{
    /// Creates a cache on top of a caller-built node pool; see
    /// [`SieveCache::try_with_pool`].
    pub fn try_with_pool(capacity: usize, pool: P) -> Result<Self, ConfigError> {
        Ok(Self {
            inner: parking_lot::RwLock::new(SieveCache::try_with_pool(capacity, pool)?),
        })
    }

    /// Returns the fixed entry capacity.
    pub fn capacity(&self) -> usize {
        self.inner.read().capacity()
    }

    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Returns `true` if `key` is present, without setting the visited bit.
    pub fn contains(&self, key: &K) -> bool {
        self.inner.read().contains(key)
    }

    /// Returns a snapshot of `key`'s value and sets the visited bit.
    ///
    /// Takes the shared lock; the snapshot stays valid after concurrent
    /// mutation evicts or overwrites the entry.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.inner.read().get(key).cloned()
    }

    /// Runs `f` on `key`'s value under the shared lock and sets the visited
    /// bit. The non-cloning alternative to [`get`](Self::get).
    pub fn get_with<R>(&self, key: &K, f: impl FnOnce(&V) -> R) -> Option<R> {
        self.inner.read().get(key).map(f)
    }

    /// Runs `f` on `key`'s value under the shared lock without setting the
    /// visited bit.
    pub fn peek_with<R>(&self, key: &K, f: impl FnOnce(&V) -> R) -> Option<R> {
        self.inner.read().peek(key).map(f)
    }

    /// Sets the visited bit for `key` under the shared lock; returns
    /// `false` if the key is missing.
    pub fn touch(&self, key: &K) -> bool {
        self.inner.read().touch(key)
    }

    /// Inserts a key-value pair under the exclusive lock; same contract as
    /// [`SieveCache::insert`].
    pub fn insert(&self, key: K, value: V) -> bool {
        self.inner.write().insert(key, value)
    }

    /// Returns a snapshot of `key`'s value, admitting a default-constructed
    /// value first if the key is absent. Exclusive lock; a mutable handle
    /// cannot outlive the lock guard, hence the snapshot.
    pub fn get_or_insert_default(&self, key: K) -> V
    where
        V: Clone + Default,
    {
        self.inner.write().get_or_insert_default(key).clone()
    }

    /// Removes `key` under the exclusive lock, returning its value if it
    /// was present.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.inner.write().remove(key)
    }

    /// Runs one eviction scan under the exclusive lock.
    pub fn pop_victim(&self) -> Option<(K, V)> {
        self.inner.write().pop_victim()
    }

    /// Removes every entry under the exclusive lock.
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Verifies index/chain/hand agreement under the shared lock.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner.read().check_invariants()
    }

    #[cfg(any(test, debug_assertions))]
    /// Panicking form of [`check_invariants`](Self::check_invariants).
    pub fn debug_validate_invariants(&self) {
        self.inner.read().debug_validate_invariants();
    }
}

#[cfg(all(feature = "concurrency", feature = "metrics"))]
impl<K, V, P> ConcurrentSieveCache<K, V, P>
where
    K: Clone + Eq + Hash,
    P: SlotPool<Node<K, V>>,
{
    /// Copies the operation counters out under the shared lock.
    pub fn metrics_snapshot(&self) -> SieveMetricsSnapshot {
        self.inner.read().metrics_snapshot()
    }
}

#[cfg(feature = "concurrency")]
impl<K, V, P> ConcurrentCache for ConcurrentSieveCache<K, V, P>
where
    K: Clone + Eq + Hash + Send + Sync,
    V: Send + Sync,
    P: SlotPool<Node<K, V>> + Send + Sync,
{
}

#[cfg(feature = "concurrency")]
impl<K, V, P> std::fmt::Debug for ConcurrentSieveCache<K, V, P>
where
    K: Clone + Eq + Hash,
    P: SlotPool<Node<K, V>>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cache = self.inner.read();
        f.debug_struct("ConcurrentSieveCache")
            .field("capacity", &cache.capacity())
            .field("len", &cache.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod basic_operations {
        use super::*;

        #[test]
        fn test_new_cache() {
            let cache: SieveCache<i32, i32> = SieveCache::new(10);
            assert_eq!(cache.capacity(), 10);
            assert_eq!(cache.len(), 0);
            assert!(cache.is_empty());
        }

        #[test]
        fn test_insert_and_get() {
            let mut cache = SieveCache::new(10);
            cache.insert("a", 1);
            cache.insert("b", 2);

            assert_eq!(cache.get(&"a"), Some(&1));
            assert_eq!(cache.get(&"b"), Some(&2));
            assert_eq!(cache.get(&"c"), None);
        }

        #[test]
        fn test_insert_reports_admission() {
            let mut cache = SieveCache::new(10);
            assert!(cache.insert("a", 1));
            assert!(!cache.insert("a", 2));
            assert_eq!(cache.get(&"a"), Some(&2));
            assert_eq!(cache.len(), 1);
        }

        #[test]
        fn test_contains_does_not_shield() {
            let mut cache = SieveCache::new(2);
            cache.insert("a", 1);
            cache.insert("b", 2);

            assert!(cache.contains(&"a"));
            assert!(!cache.contains(&"z"));

            // contains sets no visited bit, so a is still the first victim.
            cache.insert("c", 3);
            assert!(!cache.contains(&"a"));
        }

        #[test]
        fn test_remove() {
            let mut cache = SieveCache::new(10);
            cache.insert("a", 1);
            cache.insert("b", 2);

            assert_eq!(cache.remove(&"a"), Some(1));
            assert!(!cache.contains(&"a"));
            assert_eq!(cache.len(), 1);
            assert_eq!(cache.remove(&"c"), None);
        }

        #[test]
        fn test_clear() {
            let mut cache = SieveCache::new(10);
            cache.insert("a", 1);
            cache.insert("b", 2);

            cache.clear();
            assert!(cache.is_empty());
            assert!(!cache.contains(&"a"));
            assert_eq!(cache.get(&"a"), None);
        }

        #[test]
        fn test_get_mut_updates_in_place() {
            let mut cache = SieveCache::new(10);
            cache.insert("a", 1);
            if let Some(value) = cache.get_mut(&"a") {
                *value = 5;
            }
            assert_eq!(cache.get(&"a"), Some(&5));
        }

        #[test]
        fn test_iterators_walk_newest_to_oldest() {
            let mut cache = SieveCache::new(10);
            cache.insert(1, "one");
            cache.insert(2, "two");
            cache.insert(3, "three");

            let keys: Vec<_> = cache.keys().copied().collect();
            assert_eq!(keys, vec![3, 2, 1]);

            let values: Vec<_> = cache.values().copied().collect();
            assert_eq!(values, vec!["three", "two", "one"]);

            let entries: Vec<_> = cache.iter().map(|(k, v)| (*k, *v)).collect();
            assert_eq!(entries, vec![(3, "three"), (2, "two"), (1, "one")]);
        }
    }

    mod eviction {
        use super::*;

        #[test]
        fn test_eviction_at_capacity() {
            let mut cache = SieveCache::new(3);
            cache.insert("a", 1);
            cache.insert("b", 2);
            cache.insert("c", 3);
            assert_eq!(cache.len(), 3);

            cache.insert("d", 4);
            assert_eq!(cache.len(), 3);
            assert!(cache.contains(&"d"));
            // With no gets, the oldest entry goes first.
            assert!(!cache.contains(&"a"));
        }

        #[test]
        fn test_unreferenced_inserts_evict_in_insertion_order() {
            let mut cache = SieveCache::new(3);
            for i in 0..10u64 {
                cache.insert(i, i);
                // The newest entry is never the victim.
                assert!(cache.contains(&i));
                assert!(cache.len() <= cache.capacity());
            }
            assert_eq!(cache.debug_snapshot_keys(), vec![9, 8, 7]);
            cache.debug_validate_invariants();
        }

        #[test]
        fn test_visited_entry_survives_one_pass_only() {
            let mut cache = SieveCache::new(2);
            cache.insert("a", 1);
            cache.insert("b", 2);
            cache.get(&"a");

            // First eviction skips a (clearing its shield) and takes b.
            cache.insert("c", 3);
            assert!(cache.contains(&"a"));
            assert!(!cache.contains(&"b"));

            // Without a fresh get, a does not survive a second pass.
            cache.insert("d", 4);
            assert!(!cache.contains(&"a"));
            assert!(cache.contains(&"c"));
            assert!(cache.contains(&"d"));
        }

        #[test]
        fn test_update_at_capacity_evicts_nothing() {
            let mut cache = SieveCache::new(2);
            cache.insert("a", 1);
            cache.insert("b", 2);

            assert!(!cache.insert("a", 10));
            assert_eq!(cache.len(), 2);
            assert!(cache.contains(&"a"));
            assert!(cache.contains(&"b"));
        }

        #[test]
        fn test_all_visited_eviction_still_makes_room() {
            let mut cache = SieveCache::new(3);
            cache.insert("a", 1);
            cache.insert("b", 2);
            cache.insert("c", 3);
            cache.get(&"a");
            cache.get(&"b");
            cache.get(&"c");

            cache.insert("d", 4);
            assert_eq!(cache.len(), 3);
            assert!(cache.contains(&"d"));
        }

        #[test]
        fn test_pop_victim_frees_space_proactively() {
            let mut cache = SieveCache::new(3);
            cache.insert("a", 1);
            cache.insert("b", 2);
            cache.get(&"a");

            assert_eq!(cache.pop_victim(), Some(("b", 2)));
            assert_eq!(cache.len(), 1);
            assert!(cache.contains(&"a"));

            cache.clear();
            assert_eq!(cache.pop_victim(), None);
        }

        #[test]
        fn test_touch_shields_like_get() {
            let mut cache = SieveCache::new(2);
            cache.insert("a", 1);
            cache.insert("b", 2);
            assert!(cache.touch(&"a"));

            cache.insert("c", 3);
            assert!(cache.contains(&"a"));
            assert!(!cache.contains(&"b"));
        }

        #[test]
        fn test_peek_does_not_shield() {
            let mut cache = SieveCache::new(2);
            cache.insert("a", 1);
            cache.insert("b", 2);
            assert_eq!(cache.peek(&"a"), Some(&1));

            cache.insert("c", 3);
            assert!(!cache.contains(&"a"));
        }

        #[test]
        fn test_get_or_insert_default_admits_and_evicts() {
            let mut cache: SieveCache<u64, u64> = SieveCache::new(2);
            *cache.get_or_insert_default(1) = 10;
            *cache.get_or_insert_default(2) = 20;
            assert_eq!(cache.len(), 2);

            // Hit path shields key 1.
            *cache.get_or_insert_default(1) += 1;

            // Miss at capacity evicts key 2 (unvisited).
            *cache.get_or_insert_default(3) = 30;
            assert_eq!(cache.len(), 2);
            assert!(cache.contains(&1));
            assert!(!cache.contains(&2));
            assert_eq!(cache.get(&1), Some(&11));
            assert_eq!(cache.get(&3), Some(&30));
        }
    }

    mod scenarios {
        use super::*;

        #[test]
        fn test_insert_remove_reinsert_round() {
            let mut cache = SieveCache::new(3);
            assert_eq!(cache.capacity(), 3);
            assert!(cache.is_empty());

            assert!(cache.insert("foo", "foocontent"));
            assert!(cache.insert("bar", "barcontent"));
            assert_eq!(cache.remove(&"bar"), Some("barcontent"));
            assert!(cache.insert("bar2", "bar2content"));
            assert!(cache.insert("bar3", "bar3content"));

            assert_eq!(cache.get(&"foo"), Some(&"foocontent"));
            assert!(cache.contains(&"foo"));
            assert_eq!(cache.get(&"bar"), None);
            assert_eq!(cache.get(&"bar2"), Some(&"bar2content"));
            assert_eq!(cache.get(&"bar3"), Some(&"bar3content"));
            assert_eq!(cache.len(), 3);

            cache.clear();
            assert_eq!(cache.len(), 0);
            assert!(!cache.contains(&"foo"));
        }

        #[test]
        fn test_overwrite_shields_and_pins_the_tiebreak() {
            let mut cache = SieveCache::new(3);
            assert!(cache.insert("k1", "v1"));
            assert!(cache.insert("k2", "v2"));
            // Overwriting k1 marks it visited without growing the cache.
            assert!(!cache.insert("k1", "updated"));
            assert!(cache.insert("k3", "v3"));
            assert_eq!(cache.len(), 3);

            // The scan starts at the tail (k1), clears its shield, and
            // lands on k2: the oldest unvisited entry is the victim.
            assert!(cache.insert("k4", "v4"));
            assert!(cache.contains(&"k1"));
            assert!(!cache.contains(&"k2"));
            assert!(cache.contains(&"k3"));
            assert!(cache.contains(&"k4"));
            assert_eq!(cache.get(&"k1"), Some(&"updated"));
            cache.debug_validate_invariants();
        }

        #[test]
        fn test_remove_under_the_hand_keeps_scanning_valid() {
            let mut cache = SieveCache::new(3);
            cache.insert("a", 1);
            cache.insert("b", 2);
            cache.insert("c", 3);
            cache.get(&"a");

            // Evicts b; the hand parks on c.
            cache.insert("d", 4);
            assert!(!cache.contains(&"b"));

            // Removing the hand node must not leave a dangling cursor.
            assert_eq!(cache.remove(&"c"), Some(3));
            cache.debug_validate_invariants();

            cache.insert("e", 5);
            cache.insert("f", 6);
            assert_eq!(cache.len(), 3);
            cache.debug_validate_invariants();
        }
    }

    mod edge_cases {
        use super::*;

        #[test]
        fn test_capacity_one() {
            let mut cache = SieveCache::new(1);
            cache.insert("a", 1);
            assert_eq!(cache.get(&"a"), Some(&1));

            cache.insert("b", 2);
            assert!(!cache.contains(&"a"));
            assert!(cache.contains(&"b"));
            assert_eq!(cache.len(), 1);
        }

        #[test]
        fn test_try_new_zero_capacity_is_an_error() {
            let err = SieveCache::<u64, u64>::try_new(0).unwrap_err();
            assert!(err.to_string().contains("capacity"));
        }

        #[test]
        #[should_panic(expected = "capacity must be greater than zero")]
        fn test_new_zero_capacity_panics() {
            let _ = SieveCache::<u64, u64>::new(0);
        }

        #[test]
        fn test_string_keys() {
            let mut cache = SieveCache::new(10);
            cache.insert("hello".to_string(), 1);
            cache.insert("world".to_string(), 2);
            assert_eq!(cache.get(&"hello".to_string()), Some(&1));
        }

        #[test]
        fn test_large_capacity() {
            let mut cache = SieveCache::new(10_000);
            for i in 0..5_000u64 {
                cache.insert(i, i * 2);
            }
            assert_eq!(cache.len(), 5_000);
            for i in 0..5_000u64 {
                assert_eq!(cache.get(&i), Some(&(i * 2)));
            }
        }

        #[test]
        fn test_custom_pool_construction() {
            let pool: SlotArena<Node<&str, i32>> = SlotArena::with_capacity(4);
            let mut cache = SieveCache::try_with_pool(4, pool).unwrap();
            cache.insert("a", 1);
            assert_eq!(cache.get(&"a"), Some(&1));
        }

        #[test]
        fn test_debug_shows_capacity_and_len() {
            let mut cache = SieveCache::new(4);
            cache.insert("a", 1);
            let dbg = format!("{cache:?}");
            assert!(dbg.contains("SieveCache"));
            assert!(dbg.contains("capacity: 4"));
            assert!(dbg.contains("len: 1"));
        }
    }

    mod comparisons {
        use super::*;

        #[test]
        fn test_equal_caches() {
            let mut a = SieveCache::new(3);
            let mut b = SieveCache::new(3);
            a.insert("key1", "value1");
            b.insert("key1", "value1");
            assert_eq!(a, b);

            b.insert("key2", "value2");
            assert_ne!(a, b);
        }

        #[test]
        fn test_equality_requires_matching_capacity() {
            let mut a = SieveCache::new(2);
            let mut b = SieveCache::new(3);
            a.insert("key1", "value1");
            b.insert("key1", "value1");
            assert_ne!(a, b);
        }

        #[test]
        fn test_equality_ignores_insertion_order() {
            let mut a = SieveCache::new(3);
            let mut b = SieveCache::new(3);
            a.insert("x", 1);
            a.insert("y", 2);
            b.insert("y", 2);
            b.insert("x", 1);
            assert_eq!(a, b);
        }

        #[test]
        fn test_shorter_cache_orders_first() {
            let mut a = SieveCache::new(3);
            let mut b = SieveCache::new(3);
            a.insert("key1", "value1");
            b.insert("key1", "value1");
            b.insert("key2", "value2");

            assert!(a < b);
            assert!(b > a);
        }

        #[test]
        fn test_same_length_orders_by_sorted_entries() {
            let mut a = SieveCache::new(3);
            let mut b = SieveCache::new(3);
            a.insert("a", 1);
            b.insert("b", 1);
            assert!(a < b);

            let mut c = SieveCache::new(3);
            c.insert("a", 2);
            assert!(a < c);
        }
    }

    #[cfg(feature = "concurrency")]
    mod concurrent {
        use std::sync::Arc;
        use std::thread;

        use super::*;

        #[test]
        fn test_shared_reference_operations() {
            let cache = ConcurrentSieveCache::new(10);
            assert!(cache.insert("a", 1));
            assert!(!cache.insert("a", 2));
            assert_eq!(cache.get(&"a"), Some(2));
            assert!(cache.contains(&"a"));
            assert_eq!(cache.len(), 1);

            assert_eq!(cache.remove(&"a"), Some(2));
            assert!(cache.is_empty());

            cache.insert("b", 3);
            cache.clear();
            assert!(cache.is_empty());
        }

        #[test]
        fn test_get_returns_a_snapshot() {
            let cache = ConcurrentSieveCache::new(4);
            cache.insert("key", "before".to_string());
            let snapshot = cache.get(&"key").unwrap();
            cache.insert("key", "after".to_string());

            assert_eq!(snapshot, "before");
            assert_eq!(cache.get(&"key").as_deref(), Some("after"));
        }

        #[test]
        fn test_get_with_borrows_without_cloning() {
            let cache = ConcurrentSieveCache::new(4);
            cache.insert(1u64, "value".to_string());

            assert_eq!(cache.get_with(&1, |v| v.len()), Some(5));
            assert_eq!(cache.peek_with(&1, |v| v.len()), Some(5));
            assert_eq!(cache.get_with(&2, |v: &String| v.len()), None);
        }

        #[test]
        fn test_get_or_insert_default_snapshot() {
            let cache: ConcurrentSieveCache<&str, u64> = ConcurrentSieveCache::new(4);
            assert_eq!(cache.get_or_insert_default("fresh"), 0);
            cache.insert("fresh", 9);
            assert_eq!(cache.get_or_insert_default("fresh"), 9);
        }

        #[test]
        fn test_visited_shielding_through_the_facade() {
            let cache = ConcurrentSieveCache::new(2);
            cache.insert("a", 1);
            cache.insert("b", 2);
            cache.get(&"a");

            cache.insert("c", 3);
            assert!(cache.contains(&"a"));
            assert!(!cache.contains(&"b"));
        }

        #[test]
        fn test_try_new_zero_capacity_is_an_error() {
            assert!(ConcurrentSieveCache::<u64, u64>::try_new(0).is_err());
        }

        #[test]
        fn test_parallel_writers_stay_within_capacity() {
            let cache = Arc::new(ConcurrentSieveCache::new(64));
            let handles: Vec<_> = (0..4u64)
                .map(|thread_id| {
                    let cache = Arc::clone(&cache);
                    thread::spawn(move || {
                        for i in 0..200u64 {
                            cache.insert(thread_id * 1_000 + i, i);
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }

            assert!(cache.len() <= cache.capacity());
            cache.debug_validate_invariants();
        }
    }

    #[cfg(feature = "metrics")]
    mod metrics {
        use super::*;

        #[test]
        fn test_counters_track_operations() {
            let mut cache = SieveCache::new(2);
            cache.insert("a", 1);
            cache.insert("b", 2);
            cache.insert("a", 10);
            cache.get(&"a");
            cache.get(&"missing");
            cache.insert("c", 3);
            cache.remove(&"c");
            cache.clear();

            let snap = cache.metrics_snapshot();
            assert_eq!(snap.inserts_new, 3);
            assert_eq!(snap.inserts_updated, 1);
            assert_eq!(snap.get_hits, 1);
            assert_eq!(snap.get_misses, 1);
            assert_eq!(snap.evictions, 1);
            assert_eq!(snap.removes, 1);
            assert_eq!(snap.clears, 1);
            assert_eq!(snap.cache_len, 0);
            assert_eq!(snap.capacity, 2);
        }

        #[test]
        fn test_get_or_insert_default_counts_like_insert() {
            let mut cache: SieveCache<u64, u64> = SieveCache::new(1);
            *cache.get_or_insert_default(1) = 5;
            let _ = cache.get_or_insert_default(1);
            let _ = cache.get_or_insert_default(2);

            let snap = cache.metrics_snapshot();
            assert_eq!(snap.inserts_new, 2);
            assert_eq!(snap.get_hits, 1);
            assert_eq!(snap.get_misses, 2);
            assert_eq!(snap.evictions, 1);
        }

        #[cfg(feature = "concurrency")]
        #[test]
        fn test_facade_exposes_snapshots() {
            let cache = ConcurrentSieveCache::new(4);
            cache.insert("a", 1);
            cache.get(&"a");
            let snap = cache.metrics_snapshot();
            assert_eq!(snap.inserts_new, 1);
            assert_eq!(snap.get_hits, 1);
            assert_eq!(snap.cache_len, 1);
        }
    }
}
