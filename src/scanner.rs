//! Single-pass delimiter scanner for `$ ... $` and `$$ ... $$` math regions.

use serde::{Deserialize, Serialize};

/// One delimiter-bounded math region detected in a document.
///
/// Offsets are byte indices into the scanned text. `close_end` points at the
/// final delimiter character itself; delimiters are ASCII, so
/// `open_start..=close_end` is always a valid char-boundary range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathSpan {
    /// Trimmed interior text. `None` when the interior was empty or all
    /// whitespace: the span is still reported, but the region must be left
    /// untouched by replacement.
    pub expression: Option<String>,
    /// Byte index of the first delimiter character.
    pub open_start: usize,
    /// Byte index of the last delimiter character, inclusive.
    pub close_end: usize,
}

#[derive(Default)]
struct ScanState {
    single_open: bool,
    multi_open: bool,
    single_start: Option<usize>,
    single_end: Option<usize>,
    multi_start: Option<usize>,
    multi_end: Option<usize>,
    interior: String,
}

impl ScanState {
    /// Close out the current region. Emits a span only when a closing
    /// delimiter was actually recorded; a forced termination (line break, or
    /// nothing ever closing) drops the attempted region silently. All
    /// tracking state resets either way.
    fn terminate(&mut self, spans: &mut Vec<MathSpan>) {
        let interior = std::mem::take(&mut self.interior);

        // A multi start marker wins when both are set.
        if let Some(open_start) = self.multi_start.or(self.single_start) {
            if let Some(close_end) = self.single_end.or(self.multi_end) {
                let trimmed = interior.trim();
                let expression = (!trimmed.is_empty()).then(|| trimmed.to_string());
                spans.push(MathSpan {
                    expression,
                    open_start,
                    close_end,
                });
            }
        }

        *self = ScanState::default();
    }
}

/// Scan `text` for math regions, in one left-to-right pass.
///
/// Inline regions are delimited by `$ ... $` and cannot span a line break;
/// block regions use `$$ ... $$` and can. A delimiter preceded by `\` is
/// literal, and nothing inside a backtick code span is interpreted at all.
/// Unterminated regions are dropped, never an error. Returned spans are in
/// strictly ascending `open_start` order and never overlap.
///
/// There is no currency heuristic: `$50` opens a region like any other `$`.
pub fn scan(text: &str) -> Vec<MathSpan> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();

    let mut spans = Vec::new();
    let mut state = ScanState::default();
    let mut in_code_span = false;

    let mut pos = 0;
    while pos < chars.len() {
        let (byte_idx, ch) = chars[pos];
        let at_start = pos == 0;
        let at_end = pos + 1 == chars.len();

        // A run of backticks toggles the code span once, on its first
        // backtick; the rest of the run has no further effect.
        if ch == '`' && (at_start || chars[pos - 1].1 != '`') {
            in_code_span = !in_code_span;
        }

        if !in_code_span {
            if ch == '$' {
                let escaped = !at_start && chars[pos - 1].1 == '\\';
                if !escaped {
                    if !at_end && chars[pos + 1].1 == '$' {
                        if !state.multi_open {
                            // The start marker is recorded even when there is
                            // no room left to close before end-of-text; a
                            // later termination reports it in preference to
                            // any single-line start.
                            state.multi_start = Some(byte_idx);
                            if pos + 3 < chars.len() {
                                state.multi_open = true;
                                pos += 2;
                                continue;
                            }
                        } else {
                            state.multi_end = Some(chars[pos + 1].0);
                            pos += 2;
                            state.terminate(&mut spans);
                            continue;
                        }
                    } else if !state.multi_open {
                        if !state.single_open {
                            state.single_start = Some(byte_idx);
                            state.single_open = true;
                            pos += 1;
                            continue;
                        } else {
                            state.single_end = Some(byte_idx);
                            state.terminate(&mut spans);
                            pos += 1;
                            continue;
                        }
                    }
                    // A lone `$` inside an open `$$` region falls through and
                    // is accumulated as ordinary content.
                }
            } else if (ch == '\r' || ch == '\n') && state.single_open {
                // Single-line math cannot cross a line break. No closing
                // delimiter was recorded, so nothing is emitted, and any
                // block region opened in the meantime dies with it.
                state.terminate(&mut spans);
            }

            if state.single_open || state.multi_open {
                state.interior.push(ch);
            }
        }

        pos += 1;
    }

    spans
}
