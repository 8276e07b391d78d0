//! MCP request types.
//!
//! These types define the argument schemas for the quire MCP tools.

use rmcp::schemars;
use serde::Deserialize;

/// Identify a document.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DocumentRequest {
    /// Backend document identifier
    #[schemars(description = "Document ID")]
    pub document_id: String,
}

/// Create an empty document (in-memory backend only).
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DocCreateRequest {
    #[schemars(description = "Document title")]
    pub title: String,
}

/// Append text at the end of a document.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DocAppendRequest {
    #[schemars(description = "Document ID")]
    pub document_id: String,
    #[schemars(description = "Text to append (empty text is a no-op)")]
    pub text: String,
}

/// Insert text at an explicit index.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DocInsertRequest {
    #[schemars(description = "Document ID")]
    pub document_id: String,
    #[schemars(description = "Text to insert")]
    pub text: String,
    /// Index in the document's flat coordinate space (content starts at 1)
    #[schemars(description = "Insertion index (content starts at 1; must be less than the document end index)")]
    pub index: u32,
}

/// Replace all occurrences of a string.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DocReplaceRequest {
    #[schemars(description = "Document ID")]
    pub document_id: String,
    #[schemars(description = "Text to find")]
    pub find: String,
    #[schemars(description = "Replacement text")]
    pub replace: String,
    #[schemars(description = "Match case (default: true)")]
    #[serde(default = "default_true")]
    pub match_case: bool,
}

fn default_true() -> bool {
    true
}

/// Replace all document content.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DocUpdateRequest {
    #[schemars(description = "Document ID")]
    pub document_id: String,
    #[schemars(description = "New document text (empty leaves the document cleared)")]
    pub text: String,
}

/// Append a heading paragraph.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DocHeadingRequest {
    #[schemars(description = "Document ID")]
    pub document_id: String,
    #[schemars(description = "Heading text")]
    pub text: String,
    #[schemars(description = "Style: HEADING_1 to HEADING_6, TITLE, SUBTITLE, or NORMAL_TEXT (default: HEADING_1)")]
    #[serde(default = "default_heading_level")]
    pub level: String,
}

fn default_heading_level() -> String {
    "HEADING_1".to_string()
}

/// Append a bulleted or numbered list.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DocBulletsRequest {
    #[schemars(description = "Document ID")]
    pub document_id: String,
    #[schemars(description = "List items, one paragraph each (empty list is a no-op)")]
    pub items: Vec<String>,
    #[schemars(description = "Numbered list instead of bullets (default: false)")]
    #[serde(default)]
    pub ordered: bool,
}
