pub use crate::ds::{Node, SieveList, SlotArena, SlotId, SlotPool};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::policy::sieve::SieveCache;
pub use crate::traits::{ConcurrentCache, CoreCache, MutableCache};

#[cfg(feature = "concurrency")]
pub use crate::policy::sieve::ConcurrentSieveCache;
#[cfg(feature = "metrics")]
pub use crate::metrics::{MetricsSnapshotProvider, SieveMetrics, SieveMetricsSnapshot};
