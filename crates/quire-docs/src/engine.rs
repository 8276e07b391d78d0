//! High-level document operations.
//!
//! Each mutating operation reads the document fresh, derives indices from
//! that read, and submits exactly one batch. Nothing is cached between calls
//! and no operation locks the document: two concurrent appends may both read
//! the same end index. Callers needing serialization must provide it.

use serde::Serialize;

use crate::backend::SharedBackend;
use crate::batch;
use crate::error::Result;
use crate::index;
use crate::ops::{BatchReply, BulletPreset, EditOperation};
use crate::reader::extract_text;
use crate::tree::{Block, Document, ParagraphStyle};

/// Flattened text of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentText {
    pub title: String,
    pub text: String,
}

/// Structural overview of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    pub id: String,
    pub title: String,
    pub end_index: u32,
    pub paragraphs: usize,
    pub headings: usize,
    pub list_items: usize,
    pub tables: usize,
    pub characters: usize,
}

/// Document mutation and extraction façade over a backend.
#[derive(Clone)]
pub struct DocumentEngine {
    backend: SharedBackend,
}

impl std::fmt::Debug for DocumentEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentEngine")
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl DocumentEngine {
    pub fn new(backend: SharedBackend) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &SharedBackend {
        &self.backend
    }

    async fn read(&self, document_id: &str) -> Result<Document> {
        self.backend.get_document(document_id).await.inspect_err(|e| {
            tracing::warn!(document_id, error = %e, "Document read failed");
        })
    }

    async fn submit(&self, document_id: &str, ops: &[EditOperation]) -> Result<BatchReply> {
        tracing::debug!(
            document_id,
            ops = ops.len(),
            kinds = ?ops.iter().map(EditOperation::kind).collect::<Vec<_>>(),
            "Submitting batch"
        );
        self.backend
            .submit_edits(document_id, ops)
            .await
            .inspect_err(|e| {
                tracing::warn!(document_id, error = %e, "Batch rejected");
            })
    }

    /// Title and flattened body text.
    #[tracing::instrument(skip(self), name = "docs.read_text")]
    pub async fn read_text(&self, document_id: &str) -> Result<DocumentText> {
        let doc = self.read(document_id).await?;
        Ok(DocumentText {
            title: doc.title,
            text: extract_text(&doc.tree),
        })
    }

    /// Counts of top-level structure, plus the current end index.
    #[tracing::instrument(skip(self), name = "docs.describe")]
    pub async fn describe(&self, document_id: &str) -> Result<DocumentSummary> {
        let doc = self.read(document_id).await?;
        let mut summary = DocumentSummary {
            id: doc.id.clone(),
            title: doc.title.clone(),
            end_index: index::end_of_document_index(&doc.tree),
            paragraphs: 0,
            headings: 0,
            list_items: 0,
            tables: 0,
            characters: extract_text(&doc.tree).chars().count(),
        };
        for block in doc.tree.iter() {
            match block {
                Block::Paragraph(p) => {
                    summary.paragraphs += 1;
                    if p.style.is_heading() {
                        summary.headings += 1;
                    }
                    if p.bulleted {
                        summary.list_items += 1;
                    }
                }
                Block::Table(_) => summary.tables += 1,
                Block::SectionBreak { .. } => {}
            }
        }
        Ok(summary)
    }

    /// Append text just before the document's trailing terminator.
    ///
    /// Returns the insertion index, or `None` when `text` is empty and
    /// nothing was sent.
    #[tracing::instrument(skip(self, text), fields(len = text.len()), name = "docs.append")]
    pub async fn append(&self, document_id: &str, text: &str) -> Result<Option<u32>> {
        if text.is_empty() {
            tracing::debug!(document_id, "Empty append skipped");
            return Ok(None);
        }
        let doc = self.read(document_id).await?;
        let at = index::append_insertion_index(&doc.tree);
        self.submit(document_id, &batch::build_append(text, at)).await?;
        Ok(Some(at))
    }

    /// Insert text at a caller-supplied index.
    ///
    /// The index is not re-derived or checked here; the backend rejects the
    /// whole batch if it is out of range.
    #[tracing::instrument(skip(self, text), fields(len = text.len()), name = "docs.insert_at")]
    pub async fn insert_at(&self, document_id: &str, text: &str, index: u32) -> Result<()> {
        if text.is_empty() {
            tracing::debug!(document_id, "Empty insert skipped");
            return Ok(());
        }
        self.submit(document_id, &batch::build_append(text, index)).await?;
        Ok(())
    }

    /// Replace every occurrence of `find`. Returns the number changed.
    #[tracing::instrument(skip(self, find, replace), name = "docs.replace_all")]
    pub async fn replace_all(
        &self,
        document_id: &str,
        find: &str,
        replace: &str,
        case_sensitive: bool,
    ) -> Result<u32> {
        let ops = batch::build_replace_all(find, replace, case_sensitive)?;
        let reply = self.submit(document_id, &ops).await?;
        Ok(reply.occurrences_changed())
    }

    /// Delete all content. Returns whether anything was deleted.
    #[tracing::instrument(skip(self), name = "docs.clear")]
    pub async fn clear(&self, document_id: &str) -> Result<bool> {
        let doc = self.read(document_id).await?;
        let ops = batch::build_clear(index::clearable_range(&doc.tree))?;
        if ops.is_empty() {
            tracing::debug!(document_id, "Document already empty");
            return Ok(false);
        }
        self.submit(document_id, &ops).await?;
        Ok(true)
    }

    /// Replace all content with `new_text`.
    ///
    /// Two round trips, not one batch: if the append fails after the clear
    /// succeeded, the document is left empty and the append error returned.
    #[tracing::instrument(skip(self, new_text), fields(len = new_text.len()), name = "docs.update")]
    pub async fn update(&self, document_id: &str, new_text: &str) -> Result<()> {
        self.clear(document_id).await?;
        if new_text.is_empty() {
            return Ok(());
        }
        self.append(document_id, new_text).await.inspect_err(|e| {
            tracing::warn!(document_id, error = %e, "Update left document cleared");
        })?;
        Ok(())
    }

    /// Append a styled heading paragraph in a single batch.
    #[tracing::instrument(skip(self, text), name = "docs.add_heading")]
    pub async fn add_heading(
        &self,
        document_id: &str,
        text: &str,
        style: ParagraphStyle,
    ) -> Result<()> {
        let doc = self.read(document_id).await?;
        let at = index::append_insertion_index(&doc.tree);
        let ops = batch::build_heading(text, style, at)?;
        self.submit(document_id, &ops).await?;
        Ok(())
    }

    /// Append a list, one item per paragraph, in a single batch.
    ///
    /// Returns the number of items inserted; an empty list sends nothing.
    #[tracing::instrument(skip(self, items), fields(items = items.len()), name = "docs.add_bullet_list")]
    pub async fn add_bullet_list(
        &self,
        document_id: &str,
        items: &[String],
        preset: BulletPreset,
    ) -> Result<usize> {
        if items.is_empty() {
            tracing::debug!(document_id, "Empty list skipped");
            return Ok(0);
        }
        let doc = self.read(document_id).await?;
        let at = index::append_insertion_index(&doc.tree);
        let ops = batch::build_bullet_list(items, preset, at)?;
        self.submit(document_id, &ops).await?;
        Ok(items.len())
    }
}
