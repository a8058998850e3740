//! # Text Edits
//!
//! Every rewrite in this crate is expressed as a list of immutable edits over the
//! original buffer. Edits are planned against the input text only and then applied
//! in a single ascending pass, so planning one edit never invalidates the offsets of
//! another.

use crate::error::EditError;
use std::ops::Range;

/// Replaces `span` (byte offsets into the original text) with `replacement`.
/// An empty span is a pure insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub span: Range<usize>,
    pub replacement: String,
}

impl Edit {
    pub fn replace(span: Range<usize>, replacement: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::replace(at..at, text)
    }

    /// Change in buffer length caused by this edit.
    pub fn delta(&self) -> isize {
        self.replacement.len() as isize - self.span.len() as isize
    }
}

/// Applies all edits to `text` and returns the new buffer.
///
/// Edits are sorted by start offset; edits starting at the same offset keep their
/// relative order, which lets callers stack several insertions at one point. The
/// whole batch is rejected if two edits overlap or a span falls outside `text` or
/// off a char boundary, in which case nothing is applied.
pub fn apply_edits(text: &str, edits: &[Edit]) -> Result<String, EditError> {
    let mut ordered: Vec<&Edit> = edits.iter().collect();
    ordered.sort_by_key(|e| e.span.start);

    let mut cursor = 0;
    for edit in &ordered {
        let Range { start, end } = edit.span;
        if start > end || end > text.len() {
            return Err(EditError::OutOfBounds {
                start,
                end,
                len: text.len(),
            });
        }
        if !text.is_char_boundary(start) || !text.is_char_boundary(end) {
            return Err(EditError::NotCharBoundary { start, end });
        }
        if start < cursor {
            return Err(EditError::Overlap { start, end });
        }
        cursor = end;
    }

    let growth: isize = edits.iter().map(Edit::delta).sum();
    let mut out = String::with_capacity(text.len().saturating_add_signed(growth));
    let mut copied_to = 0;
    for edit in ordered {
        out.push_str(&text[copied_to..edit.span.start]);
        out.push_str(&edit.replacement);
        copied_to = edit.span.end;
    }
    out.push_str(&text[copied_to..]);

    Ok(out)
}
