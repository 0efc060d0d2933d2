//! sievekit: fixed-capacity caching with SIEVE eviction.
//!
//! SIEVE approximates "evict the least recently useful entry" with a single
//! visited bit per entry and a persistent scan cursor (the "hand"), so a
//! cache hit never reorders anything. [`policy::sieve::SieveCache`] is the
//! single-threaded cache; [`policy::sieve::ConcurrentSieveCache`] (feature
//! `concurrency`, enabled by default) wraps it in one reader-writer lock.

pub mod ds;
pub mod error;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod policy;
pub mod prelude;
pub mod traits;
