//! # Dual-Implementation Composer
//!
//! Places the synthesized async block in front of the original one and keeps the
//! original compiling as a local-extraction fallback.

use crate::edit::{Edit, apply_edits};
use crate::error::EditError;
use crate::extractor::Fragment;
use crate::locator::BlockSpan;
use crate::syntax;

pub const DEPRECATION_BANNER: [&str; 2] = [
    "// Temporary: Keep old sync implementation for compatibility during migration",
    "// This will be removed once all normalizers are migrated and query_resources is updated",
];

pub const ALLOW_DEPRECATED: &str = "#[allow(deprecated)]";

/// Trailing comment on the tag statement of a retained sync block.
pub const FALLBACK_COMMENT: &str = "// Fallback to local extraction for sync path";

/// One edit replacing the whole block at `span` with the async block, the banner
/// and the retained sync block.
pub fn compose(
    source: &str,
    span: &BlockSpan,
    fragment: &Fragment,
    async_block: &str,
) -> Result<Edit, EditError> {
    let indent = syntax::indentation_at(source, span.start);
    let retained = retained_sync_block(source, span, fragment)?;

    let mut replacement = String::with_capacity(async_block.len() + retained.len() + 256);
    replacement.push_str(async_block);
    replacement.push_str("\n\n");
    for line in DEPRECATION_BANNER.iter().chain([&ALLOW_DEPRECATED]) {
        replacement.push_str(indent);
        replacement.push_str(line);
        replacement.push('\n');
    }
    replacement.push_str(indent);
    replacement.push_str(&retained);

    Ok(Edit::replace(span.range(), replacement))
}

/// The original block, with the fallback comment appended to its tag statement.
fn retained_sync_block(
    source: &str,
    span: &BlockSpan,
    fragment: &Fragment,
) -> Result<String, EditError> {
    let block = &source[span.range()];
    let marker = Edit::insert(
        fragment.tag_statement.end - span.start,
        format!(" {FALLBACK_COMMENT}"),
    );
    apply_edits(block, &[marker])
}

/// Whether a sync block already went through a migration.
pub fn has_fallback_marker(block: &str) -> bool {
    block.contains(FALLBACK_COMMENT)
}
