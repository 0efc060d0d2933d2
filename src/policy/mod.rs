pub mod sieve;

#[cfg(feature = "concurrency")]
pub use sieve::ConcurrentSieveCache;
pub use sieve::SieveCache;
