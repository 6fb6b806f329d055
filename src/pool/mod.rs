//! Fixed arena of rendering engines with timeout-bounded admission.

mod round_robin;

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::{counter, histogram};
use once_cell::sync::{Lazy, OnceCell};
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::timeout;
use tracing::warn;

use crate::config::PoolSettings;
use crate::engine::{KatexEngine, RenderEngine};
use crate::renderer::{MathRenderer, RenderError};
use crate::telemetry;

use round_robin::RoundRobin;

const METRIC_RENDER_TOTAL: &str = "texweave_render_total";
const METRIC_RENDER_ERROR_TOTAL: &str = "texweave_render_error_total";
const METRIC_LOCK_TIMEOUT_TOTAL: &str = "texweave_lock_timeout_total";
const METRIC_RENDER_MS: &str = "texweave_render_ms";

/// One engine handle behind its exclusive lock. The handle is opaque to the
/// pool; the lock guarantees at most one in-flight render per slot.
struct EngineSlot<E> {
    engine: Mutex<E>,
}

impl<E> EngineSlot<E> {
    /// Exclusive access to the engine, waiting at most `wait`.
    async fn lock_timed(&self, wait: Duration) -> Result<MutexGuard<'_, E>, RenderError> {
        timeout(wait, self.engine.lock())
            .await
            .map_err(|_| RenderError::LockTimeout {
                timeout_ms: wait.as_millis() as u64,
            })
    }
}

/// Fixed-size pool of non-reentrant rendering engines.
///
/// Slots are created once and never resized or individually replaced. Each
/// render locks exactly one slot, selected in round-robin order and bounded
/// by the configured timeout; demand beyond the pool's capacity is rejected
/// with [`RenderError::LockTimeout`] instead of queueing indefinitely.
pub struct EnginePool<E> {
    slots: Vec<EngineSlot<E>>,
    selector: RoundRobin,
    lock_timeout: Duration,
}

/// Pool of KaTeX engines, the crate's default renderer.
pub type KatexPool = EnginePool<KatexEngine>;

#[derive(Debug, Error)]
pub enum PoolConfigError {
    #[error("engine pool requires at least one engine")]
    Empty,
    #[error("engine pool already configured")]
    AlreadyConfigured,
}

impl<E: RenderEngine> EnginePool<E> {
    /// Wrap pre-built engine handles. Fails on an empty set; the pool cannot
    /// grow after construction.
    pub fn from_engines(engines: Vec<E>, lock_timeout: Duration) -> Result<Self, PoolConfigError> {
        if engines.is_empty() {
            return Err(PoolConfigError::Empty);
        }

        Ok(Self::assemble(engines, lock_timeout))
    }

    fn assemble(engines: Vec<E>, lock_timeout: Duration) -> Self {
        telemetry::describe_metrics();

        let slots: Vec<EngineSlot<E>> = engines
            .into_iter()
            .map(|engine| EngineSlot {
                engine: Mutex::new(engine),
            })
            .collect();
        let selector = RoundRobin::new(slots.len());

        Self {
            slots,
            selector,
            lock_timeout,
        }
    }

    /// Render one expression on the next slot in rotation.
    ///
    /// A call touches exactly one slot and is not retried or re-queued on
    /// timeout. The slot lock is released on every exit path, including when
    /// the engine itself fails.
    pub async fn render_one(&self, expression: &str) -> Result<String, RenderError> {
        let index = self.selector.next_index();
        let slot = &self.slots[index];

        let mut engine = match slot.lock_timed(self.lock_timeout).await {
            Ok(engine) => engine,
            Err(err) => {
                counter!(METRIC_LOCK_TIMEOUT_TOTAL).increment(1);
                warn!(
                    target = "texweave::pool",
                    slot = index,
                    timeout_ms = self.lock_timeout.as_millis() as u64,
                    "Engine slot lock not acquired before timeout"
                );
                return Err(err);
            }
        };

        let started_at = Instant::now();
        let result = engine.render(expression);
        drop(engine);

        histogram!(METRIC_RENDER_MS).record(started_at.elapsed().as_secs_f64() * 1000.0);
        match &result {
            Ok(_) => counter!(METRIC_RENDER_TOTAL).increment(1),
            Err(_) => counter!(METRIC_RENDER_ERROR_TOTAL).increment(1),
        }

        result
    }

    #[cfg(test)]
    async fn hold_slot(&self, index: usize) -> MutexGuard<'_, E> {
        self.slots[index].engine.lock().await
    }
}

impl EnginePool<KatexEngine> {
    /// Build `engine_count` KaTeX engines up front. Engine construction is
    /// expensive compared to rendering, so this is meant to run once per
    /// process.
    pub fn katex(settings: &PoolSettings) -> Result<Self, RenderError> {
        let engines = (0..settings.engine_count.get())
            .map(|_| KatexEngine::new())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::assemble(engines, settings.lock_timeout))
    }
}

#[async_trait]
impl<E> MathRenderer for EnginePool<E>
where
    E: RenderEngine,
{
    async fn render(&self, expression: &str) -> Result<String, RenderError> {
        self.render_one(expression).await
    }
}

static POOL_SETTINGS: OnceCell<PoolSettings> = OnceCell::new();

static SHARED_POOL: Lazy<Arc<KatexPool>> = Lazy::new(|| {
    let settings = POOL_SETTINGS.get().cloned().unwrap_or_default();
    let pool = EnginePool::katex(&settings).expect("KaTeX engine options must build");
    Arc::new(pool)
});

/// Fix the settings used by [`engine_pool`]. Must run before the first
/// accessor call; the pool is immutable for the rest of the process lifetime.
pub fn configure_engine_pool(settings: PoolSettings) -> Result<(), PoolConfigError> {
    POOL_SETTINGS
        .set(settings)
        .map_err(|_| PoolConfigError::AlreadyConfigured)
}

/// Access the shared KaTeX pool, initialised on first use.
pub fn engine_pool() -> Arc<KatexPool> {
    Arc::clone(&SHARED_POOL)
}
