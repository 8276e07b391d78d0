//! Content tree: the nested structure of a document body.
//!
//! Every block sits in one flat coordinate space shared by the whole
//! document. Index 0 is unaddressable; content starts at index 1 and each
//! block records the index one past its last character.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// A document as returned by a single backend read.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Opaque backend identifier.
    pub id: String,
    /// Human-readable title.
    #[serde(default)]
    pub title: String,
    /// Current body content.
    #[serde(default)]
    pub tree: ContentTree,
}

/// Ordered sequence of top-level blocks.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentTree {
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl ContentTree {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The last top-level block, if any.
    pub fn last(&self) -> Option<&Block> {
        self.blocks.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }
}

/// A structural element of the body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Zero-text marker the backend places at the head of every body.
    SectionBreak {
        #[serde(default)]
        end_index: u32,
    },
    Paragraph(Paragraph),
    Table(Table),
}

impl Block {
    /// One past the last index this block occupies.
    pub fn end_index(&self) -> u32 {
        match self {
            Block::SectionBreak { end_index } => *end_index,
            Block::Paragraph(p) => p.end_index,
            Block::Table(t) => t.end_index,
        }
    }
}

/// A paragraph: runs of text plus paragraph-level styling.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    #[serde(default)]
    pub runs: Vec<Run>,
    #[serde(default)]
    pub end_index: u32,
    #[serde(default)]
    pub style: ParagraphStyle,
    #[serde(default)]
    pub bulleted: bool,
}

impl Paragraph {
    /// Single-run paragraph with normal styling.
    pub fn plain(text: impl Into<String>, end_index: u32) -> Self {
        Self {
            runs: vec![Run::new(text)],
            end_index,
            ..Self::default()
        }
    }

    /// Concatenated text of all runs.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// A contiguous stretch of text sharing one character style.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Run {
    #[serde(default)]
    pub text: String,
    /// Named character style, when the backend reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: None,
        }
    }
}

/// A table. Cells hold blocks of their own, so tables nest.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub rows: Vec<TableRow>,
    #[serde(default)]
    pub end_index: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    #[serde(default)]
    pub cells: Vec<TableCell>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    #[serde(default)]
    pub content: Vec<Block>,
}

impl TableCell {
    /// Cell holding a single plain paragraph.
    pub fn text(text: impl Into<String>) -> Self {
        let mut text = text.into();
        if !text.ends_with('\n') {
            text.push('\n');
        }
        Self {
            content: vec![Block::Paragraph(Paragraph::plain(text, 0))],
        }
    }
}

/// Named paragraph styles understood by the backend.
///
/// Parsing is case-insensitive and accepts short forms (`h1`, `title`).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(ascii_case_insensitive)]
pub enum ParagraphStyle {
    #[default]
    #[strum(to_string = "NORMAL_TEXT", serialize = "normal", serialize = "body")]
    NormalText,
    #[strum(to_string = "TITLE")]
    Title,
    #[strum(to_string = "SUBTITLE")]
    Subtitle,
    #[strum(to_string = "HEADING_1", serialize = "h1", serialize = "heading1")]
    #[serde(rename = "HEADING_1")]
    Heading1,
    #[strum(to_string = "HEADING_2", serialize = "h2", serialize = "heading2")]
    #[serde(rename = "HEADING_2")]
    Heading2,
    #[strum(to_string = "HEADING_3", serialize = "h3", serialize = "heading3")]
    #[serde(rename = "HEADING_3")]
    Heading3,
    #[strum(to_string = "HEADING_4", serialize = "h4", serialize = "heading4")]
    #[serde(rename = "HEADING_4")]
    Heading4,
    #[strum(to_string = "HEADING_5", serialize = "h5", serialize = "heading5")]
    #[serde(rename = "HEADING_5")]
    Heading5,
    #[strum(to_string = "HEADING_6", serialize = "h6", serialize = "heading6")]
    #[serde(rename = "HEADING_6")]
    Heading6,
}

impl ParagraphStyle {
    /// Parse a style name, returning None for unknown names.
    pub fn parse(s: &str) -> Option<Self> {
        s.trim().parse().ok()
    }

    /// True for `HEADING_1` through `HEADING_6`; titles are not headings.
    pub fn is_heading(&self) -> bool {
        matches!(
            self,
            Self::Heading1
                | Self::Heading2
                | Self::Heading3
                | Self::Heading4
                | Self::Heading5
                | Self::Heading6
        )
    }
}
