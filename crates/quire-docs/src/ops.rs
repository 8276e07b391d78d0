//! Edit operations and batch replies.
//!
//! A batch is applied by the backend in array order. Each operation sees the
//! coordinate space as already shifted by the operations before it.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use strum::{AsRefStr, Display, EnumString};

use crate::tree::ParagraphStyle;

/// A primitive structural edit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOperation {
    /// Insert `text` so its first character lands at `index`.
    InsertText { index: u32, text: String },
    /// Delete `[start_index, end_index)`.
    DeleteRange { start_index: u32, end_index: u32 },
    /// Apply a named style to every paragraph overlapping the range.
    SetParagraphStyle {
        start_index: u32,
        end_index: u32,
        style: ParagraphStyle,
    },
    /// Turn every paragraph overlapping the range into a list item.
    SetBullets {
        start_index: u32,
        end_index: u32,
        preset: BulletPreset,
    },
    /// Replace every occurrence of `match_text` in the body.
    ReplaceAllText {
        match_text: String,
        replacement: String,
        case_sensitive: bool,
    },
}

impl EditOperation {
    /// Short operation name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InsertText { .. } => "insert_text",
            Self::DeleteRange { .. } => "delete_range",
            Self::SetParagraphStyle { .. } => "set_paragraph_style",
            Self::SetBullets { .. } => "set_bullets",
            Self::ReplaceAllText { .. } => "replace_all_text",
        }
    }

    /// The `[start, end)` range this operation addresses, if any.
    pub fn range(&self) -> Option<(u32, u32)> {
        match self {
            Self::DeleteRange { start_index, end_index }
            | Self::SetParagraphStyle { start_index, end_index, .. }
            | Self::SetBullets { start_index, end_index, .. } => Some((*start_index, *end_index)),
            Self::InsertText { .. } | Self::ReplaceAllText { .. } => None,
        }
    }

    /// Encode as one entry of the backend's batch-update `requests` array.
    pub fn to_request(&self) -> Value {
        match self {
            Self::InsertText { index, text } => json!({
                "insertText": {
                    "location": { "index": index },
                    "text": text,
                }
            }),
            Self::DeleteRange { start_index, end_index } => json!({
                "deleteContentRange": {
                    "range": { "startIndex": start_index, "endIndex": end_index },
                }
            }),
            Self::SetParagraphStyle { start_index, end_index, style } => json!({
                "updateParagraphStyle": {
                    "range": { "startIndex": start_index, "endIndex": end_index },
                    "paragraphStyle": { "namedStyleType": style.as_ref() },
                    "fields": "namedStyleType",
                }
            }),
            Self::SetBullets { start_index, end_index, preset } => json!({
                "createParagraphBullets": {
                    "range": { "startIndex": start_index, "endIndex": end_index },
                    "bulletPreset": preset.as_ref(),
                }
            }),
            Self::ReplaceAllText { match_text, replacement, case_sensitive } => json!({
                "replaceAllText": {
                    "containsText": { "text": match_text, "matchCase": case_sensitive },
                    "replaceText": replacement,
                }
            }),
        }
    }
}

/// Glyph presets for bulleted and numbered lists.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(ascii_case_insensitive)]
pub enum BulletPreset {
    #[default]
    #[strum(to_string = "BULLET_DISC_CIRCLE_SQUARE", serialize = "disc", serialize = "bullet")]
    BulletDiscCircleSquare,
    #[strum(to_string = "BULLET_CHECKBOX", serialize = "checkbox")]
    BulletCheckbox,
    #[strum(to_string = "NUMBERED_DECIMAL_ALPHA_ROMAN", serialize = "numbered", serialize = "decimal")]
    NumberedDecimalAlphaRoman,
    #[strum(to_string = "NUMBERED_DECIMAL_NESTED", serialize = "nested")]
    NumberedDecimalNested,
}

/// Backend reply for one operation of a batch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reply", rename_all = "snake_case")]
pub enum OpReply {
    /// The operation produced no data.
    #[default]
    Empty,
    ReplaceAllText { occurrences_changed: u32 },
}

/// Replies for a whole batch, one per submitted operation, in order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReply {
    pub replies: Vec<OpReply>,
}

impl BatchReply {
    pub fn new(replies: Vec<OpReply>) -> Self {
        Self { replies }
    }

    /// Total occurrences changed by replace-all operations in the batch.
    pub fn occurrences_changed(&self) -> u32 {
        self.replies
            .iter()
            .map(|r| match r {
                OpReply::ReplaceAllText { occurrences_changed } => *occurrences_changed,
                OpReply::Empty => 0,
            })
            .sum()
    }
}
