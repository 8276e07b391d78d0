//! Composing ordered edit batches.
//!
//! Companion operations (style, bullets) are computed against the known
//! insertion index: the backend applies them after the insert, in a
//! coordinate space that already contains the inserted text.

use crate::error::{DocsError, Result};
use crate::index::index_len;
use crate::ops::{BulletPreset, EditOperation};
use crate::tree::ParagraphStyle;

/// Insert `text` at `insertion_index`.
pub fn build_append(text: &str, insertion_index: u32) -> Vec<EditOperation> {
    vec![EditOperation::InsertText {
        index: insertion_index,
        text: text.to_string(),
    }]
}

/// Insert `text` as its own paragraph and style it.
///
/// The style range covers the text plus its trailing newline.
pub fn build_heading(
    text: &str,
    style: ParagraphStyle,
    insertion_index: u32,
) -> Result<Vec<EditOperation>> {
    if text.is_empty() {
        return Err(DocsError::invalid("heading text must not be empty"));
    }
    let inserted = format!("{text}\n");
    let end_index = insertion_index + index_len(&inserted);
    Ok(vec![
        EditOperation::InsertText {
            index: insertion_index,
            text: inserted,
        },
        EditOperation::SetParagraphStyle {
            start_index: insertion_index,
            end_index,
            style,
        },
    ])
}

/// Insert one paragraph per item and turn them into a list.
pub fn build_bullet_list(
    items: &[String],
    preset: BulletPreset,
    insertion_index: u32,
) -> Result<Vec<EditOperation>> {
    if items.is_empty() {
        return Err(DocsError::invalid("bullet list needs at least one item"));
    }
    let mut inserted = items.join("\n");
    inserted.push('\n');
    let end_index = insertion_index + index_len(&inserted);
    Ok(vec![
        EditOperation::InsertText {
            index: insertion_index,
            text: inserted,
        },
        EditOperation::SetBullets {
            start_index: insertion_index,
            end_index,
            preset,
        },
    ])
}

/// Replace every occurrence of `match_text` with `replacement`.
pub fn build_replace_all(
    match_text: &str,
    replacement: &str,
    case_sensitive: bool,
) -> Result<Vec<EditOperation>> {
    if match_text.is_empty() {
        return Err(DocsError::invalid("text to find must not be empty"));
    }
    Ok(vec![EditOperation::ReplaceAllText {
        match_text: match_text.to_string(),
        replacement: replacement.to_string(),
        case_sensitive,
    }])
}

/// Delete `range`, or nothing when there is no range.
///
/// An empty result means the caller must skip submission.
pub fn build_clear(range: Option<(u32, u32)>) -> Result<Vec<EditOperation>> {
    match range {
        None => Ok(Vec::new()),
        Some((start, end)) if start >= end => Err(DocsError::invalid(format!(
            "delete range [{start}, {end}) is empty or inverted"
        ))),
        Some((start_index, end_index)) => Ok(vec![EditOperation::DeleteRange {
            start_index,
            end_index,
        }]),
    }
}
