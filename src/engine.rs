//! Engine handles wrapped by the pool.

use katex::{OptsBuilder, OutputType};

use crate::renderer::RenderError;

/// A single non-reentrant rendering engine.
///
/// `&mut self` encodes that a handle must never see concurrent calls; the
/// pool enforces it with one exclusive lock per slot.
pub trait RenderEngine: Send {
    fn render(&mut self, expression: &str) -> Result<String, RenderError>;
}

/// KaTeX engine handle producing HTML fragments.
///
/// Initialisation is costly relative to an individual render, so handles are
/// built once and live for the process lifetime behind [`crate::EnginePool`].
pub struct KatexEngine {
    opts: katex::Opts,
}

impl KatexEngine {
    pub fn new() -> Result<Self, RenderError> {
        let mut builder = OptsBuilder::default();
        builder.display_mode(false);
        builder.output_type(OutputType::Html);

        let opts = builder.build().map_err(|err| RenderError::Engine {
            message: format!("failed to build KaTeX options: {err}"),
        })?;

        Ok(Self { opts })
    }
}

impl RenderEngine for KatexEngine {
    fn render(&mut self, expression: &str) -> Result<String, RenderError> {
        katex::render_with_opts(expression, &self.opts).map_err(|err| RenderError::Engine {
            message: format!("KaTeX rendering failed: {err}"),
        })
    }
}
