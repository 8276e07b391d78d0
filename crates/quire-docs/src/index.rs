//! Index arithmetic over the flat coordinate space.
//!
//! The body occupies one contiguous range starting at 1. The last top-level
//! block's end index counts an implicit trailing newline, so the last
//! position text may be inserted at is one before it.

use crate::error::{DocsError, Result};
use crate::tree::ContentTree;

/// First addressable index in a body.
pub const CONTENT_START: u32 = 1;

/// End index of the last top-level block, or 1 for an empty tree.
pub fn end_of_document_index(tree: &ContentTree) -> u32 {
    tree.last().map(|b| b.end_index()).unwrap_or(CONTENT_START)
}

/// Index at which appended text lands just before the trailing terminator.
///
/// Never below [`CONTENT_START`], even for an empty tree.
pub fn append_insertion_index(tree: &ContentTree) -> u32 {
    end_of_document_index(tree)
        .saturating_sub(1)
        .max(CONTENT_START)
}

/// Range `[start, end)` that removes all content but the terminator.
///
/// `None` when there is nothing to delete; an empty delete must not be sent.
pub fn clearable_range(tree: &ContentTree) -> Option<(u32, u32)> {
    let end = end_of_document_index(tree);
    if end <= CONTENT_START {
        return None;
    }
    let range = (CONTENT_START, end - 1);
    // A body holding only its terminator has end 2 and yields [1, 1).
    (range.0 < range.1).then_some(range)
}

/// Check that an explicit insertion index addresses existing content.
///
/// Valid indices satisfy `1 <= index < end_of_document_index`. An empty
/// tree accepts only index 1.
pub fn validate_insertion_index(tree: &ContentTree, index: u32) -> Result<u32> {
    let end = end_of_document_index(tree);
    if index < CONTENT_START {
        return Err(DocsError::invalid(format!(
            "index {index} is before content start {CONTENT_START}"
        )));
    }
    if end <= CONTENT_START {
        // An empty tree has no terminator yet; only the content start exists.
        if index != CONTENT_START {
            return Err(DocsError::invalid(format!(
                "index {index} is beyond the end of an empty document"
            )));
        }
    } else if index >= end {
        return Err(DocsError::invalid(format!(
            "index {index} must be less than the end index {end}"
        )));
    }
    Ok(index)
}

/// Length of `text` in backend index units (UTF-16 code units).
pub fn index_len(text: &str) -> u32 {
    text.encode_utf16().count() as u32
}
