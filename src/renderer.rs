//! Rendering capability consumed by the replacer.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// Structured errors surfaced by math rendering.
///
/// The two variants are the two independent failure classes: an expression
/// the engine rejects, and admission-control failure when no engine slot
/// frees up in time. They stay distinguishable so callers can recover the
/// first inline and pick their own policy for the second.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("math engine rejected expression: {message}")]
    Engine { message: String },
    #[error("no rendering engine became available within {timeout_ms}ms")]
    LockTimeout { timeout_ms: u64 },
}

/// Turns one math expression into a markup fragment.
///
/// Each result is associated with the call that produced it; no completion
/// ordering between concurrent calls is guaranteed.
#[async_trait]
pub trait MathRenderer: Send + Sync {
    async fn render(&self, expression: &str) -> Result<String, RenderError>;
}

#[async_trait]
impl<R> MathRenderer for Arc<R>
where
    R: MathRenderer + ?Sized,
{
    async fn render(&self, expression: &str) -> Result<String, RenderError> {
        self.as_ref().render(expression).await
    }
}
