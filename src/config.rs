//! Pool sizing and admission-control settings, fixed at construction.

use std::num::NonZeroUsize;
use std::time::Duration;

const DEFAULT_LOCK_TIMEOUT_MS: u64 = 1000;

/// Settings for [`crate::EnginePool`]. Immutable once a pool is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    /// Number of engine slots. Each slot owns one engine handle for the
    /// process lifetime; the pool never grows or shrinks.
    pub engine_count: NonZeroUsize,
    /// Upper bound on waiting for exclusive access to the selected slot.
    /// Demand that outlives this bound is rejected, not queued.
    pub lock_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            engine_count: NonZeroUsize::MIN,
            lock_timeout: Duration::from_millis(DEFAULT_LOCK_TIMEOUT_MS),
        }
    }
}

impl PoolSettings {
    pub fn with_engine_count(mut self, engine_count: NonZeroUsize) -> Self {
        self.engine_count = engine_count;
        self
    }

    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }
}
