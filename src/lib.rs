//! Math preprocessing for markdown-like text.
//!
//! `texweave` finds `$ ... $` (inline) and `$$ ... $$` (block) math regions
//! in raw text, skipping escaped delimiters and backtick code spans, and
//! replaces each region with markup from a rendering engine. Engines are
//! expensive to build and not safe for concurrent use, so rendering goes
//! through a fixed pool of exclusively locked engine handles selected in
//! round-robin order, with timeout-bounded admission instead of unbounded
//! queueing.
//!
//! The scanner is a pure function and can be used on its own; the pool and
//! preprocessor run on tokio.

pub mod config;
pub mod engine;
pub mod pool;
pub mod renderer;
pub mod replacer;
pub mod scanner;
pub mod telemetry;

pub use config::PoolSettings;
pub use engine::{KatexEngine, RenderEngine};
pub use pool::{EnginePool, KatexPool, PoolConfigError, configure_engine_pool, engine_pool};
pub use renderer::{MathRenderer, RenderError};
pub use replacer::MathPreprocessor;
pub use scanner::{MathSpan, scan};
