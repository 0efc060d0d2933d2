//! Cache trait surface.
//!
//! A deliberately small hierarchy:
//!
//! ```text
//!   CoreCache<K, V>            universal operations
//!        │                     insert, get, contains, len, capacity, clear
//!        ▼
//!   MutableCache<K, V>         adds arbitrary key removal
//!
//!   ConcurrentCache            Send + Sync marker for the lock-based facade
//! ```
//!
//! `get` takes `&self` rather than `&mut self`: SIEVE marks an entry visited
//! with an atomic bit set and never reorders on access, so lookups need no
//! exclusive borrow. That property is the point of the algorithm and the
//! trait surface leans on it.

/// Core operations every cache in this crate supports.
///
/// # Example
///
/// ```
/// use sievekit::policy::sieve::SieveCache;
/// use sievekit::traits::CoreCache;
///
/// fn warm<C: CoreCache<u64, String>>(cache: &mut C, data: &[(u64, String)]) {
///     for (key, value) in data {
///         cache.insert(*key, value.clone());
///     }
/// }
///
/// let mut cache = SieveCache::new(100);
/// warm(&mut cache, &[(1, "one".to_string()), (2, "two".to_string())]);
/// assert_eq!(cache.len(), 2);
/// ```
pub trait CoreCache<K, V> {
    /// Inserts a key-value pair.
    ///
    /// Returns `true` when the entry is newly admitted (evicting first if
    /// the cache is full) and `false` when an existing entry was updated in
    /// place.
    fn insert(&mut self, key: K, value: V) -> bool;

    /// Gets a reference to a value by key, recording the access for the
    /// eviction policy. Use [`contains`](Self::contains) to test existence
    /// without affecting eviction.
    fn get(&self, key: &K) -> Option<&V>;

    /// Checks if a key exists without recording an access.
    fn contains(&self, key: &K) -> bool;

    /// Returns the current number of entries.
    fn len(&self) -> usize;

    /// Returns `true` if the cache holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the fixed entry capacity.
    fn capacity(&self) -> usize;

    /// Removes all entries.
    fn clear(&mut self);
}

/// Caches that support arbitrary key-based removal.
///
/// # Example
///
/// ```
/// use sievekit::policy::sieve::SieveCache;
/// use sievekit::traits::{CoreCache, MutableCache};
///
/// fn invalidate<C: MutableCache<u64, String>>(cache: &mut C, keys: &[u64]) {
///     for key in keys {
///         cache.remove(key);
///     }
/// }
///
/// let mut cache = SieveCache::new(10);
/// cache.insert(1, "one".to_string());
/// cache.insert(2, "two".to_string());
/// invalidate(&mut cache, &[1]);
/// assert!(!cache.contains(&1));
/// assert!(cache.contains(&2));
/// ```
pub trait MutableCache<K, V>: CoreCache<K, V> {
    /// Removes a key, returning its value if it was present.
    fn remove(&mut self, key: &K) -> Option<V>;
}

/// Marker trait for caches that are safe to share across threads.
///
/// Implementors serialize every operation internally; callers need no
/// external locking.
///
/// # Example
///
/// ```
/// use sievekit::traits::ConcurrentCache;
///
/// fn spawn_users<C: ConcurrentCache>(_cache: &C) {
///     // Safe to hand out to worker threads.
/// }
/// ```
pub trait ConcurrentCache: Send + Sync {}
