//! HTTP backend for the remote documents API.
//!
//! `GET {base}/documents/{id}` reads, `POST {base}/documents/{id}:batchUpdate`
//! writes. Authentication is a bearer token resolved from [`BackendConfig`].

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::backend::DocumentBackend;
use crate::config::BackendConfig;
use crate::error::{DocsError, Result};
use crate::ops::{BatchReply, EditOperation, OpReply};
use crate::tree::{
    Block, ContentTree, Document, Paragraph, ParagraphStyle, Run, Table, TableCell, TableRow,
};

const MAX_ERROR_BODY: usize = 500;

/// Backend speaking the documents REST API.
pub struct RestBackend {
    client: reqwest::Client,
    base_url: Url,
    access_token: String,
}

impl std::fmt::Debug for RestBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestBackend")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl RestBackend {
    /// Build a client from config. Fails if no access token can be resolved.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let access_token = config.resolve_access_token().ok_or_else(|| {
            DocsError::Config(
                "no access token: set access_token in config.toml or the token env var".into(),
            )
        })?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| DocsError::Config(format!("failed to build HTTP client: {e}")))?;
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| DocsError::Config(format!("invalid base_url {}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(DocsError::Config(format!(
                "base_url {} cannot hold a path",
                config.base_url
            )));
        }
        Ok(Self {
            client,
            base_url,
            access_token,
        })
    }

    /// `{base}/documents/{id}{suffix}` with the id kept inside one path segment.
    ///
    /// Separators in the id are percent-encoded, so it can never leave the
    /// `documents/` collection or become a query or fragment.
    fn document_url(&self, document_id: &str, suffix: &str) -> Result<Url> {
        if matches!(document_id, "" | "." | "..") {
            return Err(DocsError::invalid(format!(
                "invalid document id {document_id:?}"
            )));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DocsError::Config("base_url cannot hold a path".into()))?
            .pop_if_empty()
            .push("documents")
            .push(&format!("{document_id}{suffix}"));
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder, document_id: &str) -> Result<String> {
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| transport_error(e, document_id))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, document_id))?;

        match status {
            s if s.is_success() => Ok(body),
            StatusCode::NOT_FOUND => Err(DocsError::not_found(document_id)),
            s => Err(DocsError::rejected(format!(
                "HTTP {}: {}",
                s.as_u16(),
                error_message(&body)
            ))),
        }
    }
}

#[async_trait]
impl DocumentBackend for RestBackend {
    async fn get_document(&self, document_id: &str) -> Result<Document> {
        let url = self.document_url(document_id, "")?;
        let body = self.send(self.client.get(url.clone()), document_id).await?;
        let wire: WireDocument = serde_json::from_str(&body).map_err(|e| {
            DocsError::Transport(format!("unexpected document format from {url}: {e}"))
        })?;
        Ok(wire.into_document(document_id))
    }

    async fn submit_edits(&self, document_id: &str, ops: &[EditOperation]) -> Result<BatchReply> {
        let url = self.document_url(document_id, ":batchUpdate")?;
        let requests: Vec<Value> = ops.iter().map(EditOperation::to_request).collect();
        let payload = json!({ "requests": requests });
        let body = self
            .send(self.client.post(url.clone()).json(&payload), document_id)
            .await?;
        let wire: WireBatchResponse = serde_json::from_str(&body).map_err(|e| {
            DocsError::Transport(format!("unexpected batch reply from {url}: {e}"))
        })?;
        Ok(wire.into_reply(ops.len()))
    }

    fn name(&self) -> &'static str {
        "rest"
    }
}

fn transport_error(e: reqwest::Error, document_id: &str) -> DocsError {
    let kind = if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connection failed"
    } else if e.is_decode() {
        "undecodable response"
    } else {
        "request failed"
    };
    DocsError::Transport(format!("{kind} for document {document_id}: {e}"))
}

/// Pull the diagnostic out of an API error body, else truncate the raw body.
fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct Envelope {
        error: ApiError,
    }
    #[derive(Deserialize)]
    struct ApiError {
        message: String,
    }

    if let Ok(envelope) = serde_json::from_str::<Envelope>(body) {
        return envelope.error.message;
    }
    if body.len() > MAX_ERROR_BODY {
        let cut = (0..=MAX_ERROR_BODY)
            .rev()
            .find(|&i| body.is_char_boundary(i))
            .unwrap_or(0);
        format!("{}... (truncated)", &body[..cut])
    } else {
        body.to_string()
    }
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireDocument {
    #[serde(default)]
    document_id: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    body: WireBody,
}

impl WireDocument {
    fn into_document(self, requested_id: &str) -> Document {
        Document {
            id: self.document_id.unwrap_or_else(|| requested_id.to_string()),
            title: self.title,
            tree: ContentTree::new(convert_elements(self.body.content)),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct WireBody {
    #[serde(default)]
    content: Vec<WireElement>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireElement {
    #[serde(default)]
    end_index: u32,
    #[serde(default)]
    paragraph: Option<WireParagraph>,
    #[serde(default)]
    table: Option<WireTable>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireParagraph {
    #[serde(default)]
    elements: Vec<WireParagraphElement>,
    #[serde(default)]
    paragraph_style: Option<WireParagraphStyle>,
    #[serde(default)]
    bullet: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireParagraphElement {
    #[serde(default)]
    text_run: Option<WireTextRun>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTextRun {
    #[serde(default)]
    content: String,
    #[serde(default)]
    text_style: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireParagraphStyle {
    #[serde(default)]
    named_style_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTable {
    #[serde(default)]
    table_rows: Vec<WireTableRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTableRow {
    #[serde(default)]
    table_cells: Vec<WireTableCell>,
}

#[derive(Debug, Default, Deserialize)]
struct WireTableCell {
    #[serde(default)]
    content: Vec<WireElement>,
}

fn convert_elements(elements: Vec<WireElement>) -> Vec<Block> {
    elements.into_iter().map(convert_element).collect()
}

fn convert_element(element: WireElement) -> Block {
    let end_index = element.end_index;
    if let Some(p) = element.paragraph {
        return Block::Paragraph(Paragraph {
            runs: p
                .elements
                .into_iter()
                .filter_map(|e| e.text_run)
                .map(|run| Run {
                    style: run.text_style.as_ref().and_then(run_style_name),
                    text: run.content,
                })
                .collect(),
            end_index,
            style: p
                .paragraph_style
                .and_then(|s| s.named_style_type)
                .and_then(|name| ParagraphStyle::parse(&name))
                .unwrap_or_default(),
            bulleted: p.bullet.is_some(),
        });
    }
    if let Some(t) = element.table {
        return Block::Table(Table {
            rows: t
                .table_rows
                .into_iter()
                .map(|row| TableRow {
                    cells: row
                        .table_cells
                        .into_iter()
                        .map(|cell| TableCell {
                            content: convert_elements(cell.content),
                        })
                        .collect(),
                })
                .collect(),
            end_index,
        });
    }
    // Section breaks, tables of contents: structure without extractable text.
    Block::SectionBreak { end_index }
}

/// Name the character flags set on a run, e.g. `bold+italic`.
fn run_style_name(style: &Value) -> Option<String> {
    let flags: Vec<&str> = ["bold", "italic", "underline", "strikethrough"]
        .into_iter()
        .filter(|flag| style.get(*flag).and_then(Value::as_bool).unwrap_or(false))
        .collect();
    (!flags.is_empty()).then(|| flags.join("+"))
}

#[derive(Debug, Default, Deserialize)]
struct WireBatchResponse {
    #[serde(default)]
    replies: Vec<WireReply>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireReply {
    #[serde(default)]
    replace_all_text: Option<WireReplaceAllReply>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireReplaceAllReply {
    #[serde(default)]
    occurrences_changed: u32,
}

impl WireBatchResponse {
    /// One reply per submitted op; the API may omit trailing empty replies.
    fn into_reply(self, submitted: usize) -> BatchReply {
        let mut replies: Vec<OpReply> = self
            .replies
            .into_iter()
            .map(|r| match r.replace_all_text {
                Some(reply) => OpReply::ReplaceAllText {
                    occurrences_changed: reply.occurrences_changed,
                },
                None => OpReply::Empty,
            })
            .collect();
        if replies.len() < submitted {
            replies.resize(submitted, OpReply::Empty);
        }
        BatchReply::new(replies)
    }
}
