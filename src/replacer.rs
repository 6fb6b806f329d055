//! Splices rendered markup over scanned math spans.

use tracing::warn;

use crate::renderer::{MathRenderer, RenderError};
use crate::scanner::scan;

/// Rewrites documents by replacing each scanned math span with markup from
/// the supplied renderer.
pub struct MathPreprocessor<R> {
    renderer: R,
}

impl<R: MathRenderer> MathPreprocessor<R> {
    pub fn new(renderer: R) -> Self {
        Self { renderer }
    }

    /// Replace every math span in `text` with rendered markup.
    ///
    /// Spans are spliced in reverse order, so earlier replacements never
    /// shift the indices of spans still waiting. An expression the engine
    /// rejects degrades to an HTML-escaped inline error fragment and the
    /// rest of the document still renders. [`RenderError::LockTimeout`] is
    /// not recovered here: it fails the whole call, leaving overload policy
    /// to the integrator.
    pub async fn process(&self, text: &str) -> Result<String, RenderError> {
        let spans = scan(text);

        let mut output = text.to_string();
        for span in spans.iter().rev() {
            // An empty interior leaves the delimiters as literal text.
            let Some(expression) = span.expression.as_deref() else {
                continue;
            };

            let markup = match self.renderer.render(expression).await {
                Ok(markup) => markup,
                Err(timeout @ RenderError::LockTimeout { .. }) => return Err(timeout),
                Err(RenderError::Engine { message }) => {
                    warn!(
                        target = "texweave::replacer",
                        expression, "Math rendering failed: {message}"
                    );
                    error_fragment(expression, &message)
                }
            };

            output.replace_range(span.open_start..=span.close_end, &markup);
        }

        Ok(output)
    }
}

/// Inline fallback shown in place of an expression the engine rejected.
fn error_fragment(expression: &str, message: &str) -> String {
    let expression = ammonia::clean_text(expression);
    let message = ammonia::clean_text(message);
    format!("<code data-math-error=\"true\">Error in math '{expression}': {message}</code>")
}
