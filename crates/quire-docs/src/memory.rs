//! In-memory document backend.
//!
//! Models the remote coordinate space exactly: a section break occupies
//! `[0, 1)`, body text follows, and the body always ends in a terminator
//! newline that can never be deleted. Batches apply against a scratch copy
//! and only replace the stored document when every operation succeeds.
//!
//! All data is lost when dropped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::backend::DocumentBackend;
use crate::error::{DocsError, Result};
use crate::index::{CONTENT_START, validate_insertion_index};
use crate::ops::{BatchReply, BulletPreset, EditOperation, OpReply};
use crate::tree::{Block, ContentTree, Document, Paragraph, ParagraphStyle, Run};

/// One character of body text.
///
/// Paragraph attributes live on the paragraph's terminating newline.
#[derive(Debug, Clone, PartialEq)]
struct Cell {
    ch: char,
    style: ParagraphStyle,
    bullet: Option<BulletPreset>,
}

impl Cell {
    fn plain(ch: char) -> Self {
        Self {
            ch,
            style: ParagraphStyle::NormalText,
            bullet: None,
        }
    }

    fn width(&self) -> u32 {
        self.ch.len_utf16() as u32
    }
}

#[derive(Debug, Clone)]
struct MemoryDocument {
    title: String,
    cells: Vec<Cell>,
}

impl MemoryDocument {
    fn new(title: impl Into<String>, text: &str) -> Self {
        let mut cells: Vec<Cell> = text.chars().map(Cell::plain).collect();
        if cells.last().map(|c| c.ch) != Some('\n') {
            cells.push(Cell::plain('\n'));
        }
        Self {
            title: title.into(),
            cells,
        }
    }

    fn end_index(&self) -> u32 {
        CONTENT_START + self.cells.iter().map(Cell::width).sum::<u32>()
    }

    /// Cell position of `index`. `index == end_index` maps to `cells.len()`.
    fn position(&self, index: u32) -> Result<usize> {
        let mut at = CONTENT_START;
        for (pos, cell) in self.cells.iter().enumerate() {
            if at == index {
                return Ok(pos);
            }
            if at > index {
                return Err(DocsError::rejected(format!(
                    "index {index} splits a surrogate pair"
                )));
            }
            at += cell.width();
        }
        if at == index {
            return Ok(self.cells.len());
        }
        Err(DocsError::rejected(format!(
            "index {index} must be less than the end index {at}"
        )))
    }

    /// Validate `[start, end)` for a delete or style range.
    fn range(&self, start: u32, end: u32, limit: u32) -> Result<(usize, usize)> {
        if start < CONTENT_START {
            return Err(DocsError::rejected(format!(
                "range start {start} is before content start {CONTENT_START}"
            )));
        }
        if start >= end {
            return Err(DocsError::rejected(format!(
                "range [{start}, {end}) is empty or inverted"
            )));
        }
        if end > limit {
            return Err(DocsError::rejected(format!(
                "range end {end} must not exceed {limit}"
            )));
        }
        Ok((self.position(start)?, self.position(end)?))
    }

    /// Position of the paragraph terminator at or after `pos`.
    fn terminator_from(&self, pos: usize) -> usize {
        self.cells[pos..]
            .iter()
            .position(|c| c.ch == '\n')
            .map(|offset| pos + offset)
            .unwrap_or(self.cells.len() - 1)
    }

    /// Cells for inserted text; new paragraphs inherit the split paragraph.
    fn cells_for(&self, text: &str, pos: usize) -> Vec<Cell> {
        let parent = &self.cells[self.terminator_from(pos)];
        text.chars()
            .map(|ch| {
                if ch == '\n' {
                    Cell {
                        ch,
                        style: parent.style,
                        bullet: parent.bullet,
                    }
                } else {
                    Cell::plain(ch)
                }
            })
            .collect()
    }

    fn insert(&mut self, index: u32, text: &str) -> Result<()> {
        validate_insertion_index(&self.tree(), index).map_err(into_rejection)?;
        let pos = self.position(index)?;
        let cells = self.cells_for(text, pos);
        self.cells.splice(pos..pos, cells);
        Ok(())
    }

    fn delete(&mut self, start: u32, end: u32) -> Result<()> {
        // The final terminator is not deletable.
        let (from, to) = self.range(start, end, self.end_index() - 1)?;
        self.cells.drain(from..to);
        Ok(())
    }

    /// Positions of every paragraph terminator overlapping `[start, end)`.
    fn terminators_in(&self, start: u32, end: u32) -> Result<Vec<usize>> {
        let (from, to) = self.range(start, end, self.end_index())?;
        let last = self.terminator_from(to - 1);
        Ok((from..=last).filter(|&pos| self.cells[pos].ch == '\n').collect())
    }

    fn set_style(&mut self, start: u32, end: u32, style: ParagraphStyle) -> Result<()> {
        for pos in self.terminators_in(start, end)? {
            self.cells[pos].style = style;
        }
        Ok(())
    }

    fn set_bullets(&mut self, start: u32, end: u32, preset: BulletPreset) -> Result<()> {
        for pos in self.terminators_in(start, end)? {
            self.cells[pos].bullet = Some(preset);
        }
        Ok(())
    }

    fn replace_all(&mut self, needle: &str, replacement: &str, case_sensitive: bool) -> Result<u32> {
        let needle: Vec<char> = needle.chars().collect();
        if needle.is_empty() {
            return Err(DocsError::rejected("replaceAllText requires non-empty text"));
        }
        let same = |a: char, b: char| {
            if case_sensitive {
                a == b
            } else {
                a.to_lowercase().eq(b.to_lowercase())
            }
        };

        let mut count = 0;
        let mut pos = 0;
        // Matches never include the final terminator.
        while pos + needle.len() < self.cells.len() {
            let hit = needle
                .iter()
                .zip(&self.cells[pos..pos + needle.len()])
                .all(|(n, c)| same(*n, c.ch));
            if hit {
                let cells = self.cells_for(replacement, pos + needle.len());
                let advance = cells.len();
                self.cells.splice(pos..pos + needle.len(), cells);
                pos += advance;
                count += 1;
            } else {
                pos += 1;
            }
        }
        Ok(count)
    }

    fn apply(&mut self, op: &EditOperation) -> Result<OpReply> {
        match op {
            EditOperation::InsertText { index, text } => self.insert(*index, text)?,
            EditOperation::DeleteRange { start_index, end_index } => {
                self.delete(*start_index, *end_index)?
            }
            EditOperation::SetParagraphStyle { start_index, end_index, style } => {
                self.set_style(*start_index, *end_index, *style)?
            }
            EditOperation::SetBullets { start_index, end_index, preset } => {
                self.set_bullets(*start_index, *end_index, *preset)?
            }
            EditOperation::ReplaceAllText { match_text, replacement, case_sensitive } => {
                let occurrences_changed = self.replace_all(match_text, replacement, *case_sensitive)?;
                return Ok(OpReply::ReplaceAllText { occurrences_changed });
            }
        }
        Ok(OpReply::Empty)
    }

    fn tree(&self) -> ContentTree {
        let mut blocks = vec![Block::SectionBreak { end_index: CONTENT_START }];
        let mut at = CONTENT_START;
        let mut text = String::new();
        for cell in &self.cells {
            text.push(cell.ch);
            at += cell.width();
            if cell.ch == '\n' {
                blocks.push(Block::Paragraph(Paragraph {
                    runs: vec![Run::new(std::mem::take(&mut text))],
                    end_index: at,
                    style: cell.style,
                    bulleted: cell.bullet.is_some(),
                }));
            }
        }
        ContentTree::new(blocks)
    }
}

fn into_rejection(err: DocsError) -> DocsError {
    match err {
        DocsError::InvalidArgument(msg) => DocsError::BackendRejected(msg),
        other => other,
    }
}

/// In-memory backend.
///
/// Thread-safe via internal `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    documents: RwLock<HashMap<String, MemoryDocument>>,
    next_id: AtomicU64,
}

impl MemoryBackend {
    /// Create a new empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty document and return its generated id.
    pub fn create_document(&self, title: impl Into<String>) -> String {
        let id = format!("mem-{}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.insert_document(id.clone(), title, "");
        id
    }

    /// Create or overwrite a document under a chosen id with initial text.
    pub fn insert_document(&self, id: impl Into<String>, title: impl Into<String>, text: &str) {
        self.documents
            .write()
            .insert(id.into(), MemoryDocument::new(title, text));
    }

    /// Sorted ids of all stored documents.
    pub fn list_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.documents.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Raw body text including the terminator, for inspection.
    pub fn body_text(&self, id: &str) -> Option<String> {
        self.documents
            .read()
            .get(id)
            .map(|doc| doc.cells.iter().map(|c| c.ch).collect())
    }
}

#[async_trait]
impl DocumentBackend for MemoryBackend {
    async fn get_document(&self, document_id: &str) -> Result<Document> {
        let documents = self.documents.read();
        let doc = documents
            .get(document_id)
            .ok_or_else(|| DocsError::not_found(document_id))?;
        Ok(Document {
            id: document_id.to_string(),
            title: doc.title.clone(),
            tree: doc.tree(),
        })
    }

    async fn submit_edits(&self, document_id: &str, ops: &[EditOperation]) -> Result<BatchReply> {
        let mut documents = self.documents.write();
        let stored = documents
            .get_mut(document_id)
            .ok_or_else(|| DocsError::not_found(document_id))?;

        let mut scratch = stored.clone();
        let mut replies = Vec::with_capacity(ops.len());
        for (idx, op) in ops.iter().enumerate() {
            let reply = scratch.apply(op).map_err(|e| match e {
                DocsError::BackendRejected(msg) => DocsError::BackendRejected(format!(
                    "requests[{idx}].{}: {msg}",
                    op.kind()
                )),
                other => other,
            })?;
            replies.push(reply);
        }
        *stored = scratch;
        Ok(BatchReply::new(replies))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::extract_text;

    fn paragraphs(doc: &Document) -> Vec<&Paragraph> {
        doc.tree
            .iter()
            .filter_map(|b| match b {
                Block::Paragraph(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_new_document_has_only_terminator() {
        let backend = MemoryBackend::new();
        let id = backend.create_document("Empty");
        let doc = backend.get_document(&id).await.unwrap();
        assert_eq!(doc.title, "Empty");
        assert_eq!(doc.tree.blocks.len(), 2);
        assert_eq!(doc.tree.last().unwrap().end_index(), 2);
        assert_eq!(extract_text(&doc.tree), "");
    }

    #[tokio::test]
    async fn test_unknown_document() {
        let backend = MemoryBackend::new();
        let err = backend.get_document("nope").await.unwrap_err();
        assert_eq!(err, DocsError::not_found("nope"));
        let err = backend.submit_edits("nope", &[]).await.unwrap_err();
        assert!(matches!(err, DocsError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_insert_before_terminator() {
        let backend = MemoryBackend::new();
        backend.insert_document("d", "Doc", "Hello\n");
        let ops = [EditOperation::InsertText { index: 6, text: " world".into() }];
        backend.submit_edits("d", &ops).await.unwrap();
        assert_eq!(backend.body_text("d").unwrap(), "Hello world\n");
    }

    #[tokio::test]
    async fn test_insert_at_end_index_rejected() {
        let backend = MemoryBackend::new();
        backend.insert_document("d", "Doc", "Hello\n");
        let ops = [EditOperation::InsertText { index: 7, text: "x".into() }];
        let err = backend.submit_edits("d", &ops).await.unwrap_err();
        assert!(matches!(err, DocsError::BackendRejected(_)));
        assert!(err.to_string().contains("requests[0].insert_text"));

        let ops = [EditOperation::InsertText { index: 0, text: "x".into() }];
        assert!(backend.submit_edits("d", &ops).await.is_err());
    }

    #[tokio::test]
    async fn test_batch_is_atomic() {
        let backend = MemoryBackend::new();
        backend.insert_document("d", "Doc", "Hello\n");
        let ops = [
            EditOperation::InsertText { index: 1, text: "Oh, ".into() },
            EditOperation::DeleteRange { start_index: 3, end_index: 100 },
        ];
        let err = backend.submit_edits("d", &ops).await.unwrap_err();
        assert!(err.to_string().contains("requests[1].delete_range"));
        assert_eq!(backend.body_text("d").unwrap(), "Hello\n");
    }

    #[tokio::test]
    async fn test_terminator_cannot_be_deleted() {
        let backend = MemoryBackend::new();
        backend.insert_document("d", "Doc", "Hello\n");
        let ops = [EditOperation::DeleteRange { start_index: 1, end_index: 7 }];
        assert!(backend.submit_edits("d", &ops).await.is_err());

        let ops = [EditOperation::DeleteRange { start_index: 1, end_index: 6 }];
        backend.submit_edits("d", &ops).await.unwrap();
        assert_eq!(backend.body_text("d").unwrap(), "\n");
    }

    #[tokio::test]
    async fn test_style_applies_to_overlapping_paragraphs() {
        let backend = MemoryBackend::new();
        backend.insert_document("d", "Doc", "one\ntwo\nthree\n");
        // Range touches "one" and the first character of "two".
        let ops = [EditOperation::SetParagraphStyle {
            start_index: 2,
            end_index: 6,
            style: ParagraphStyle::Heading2,
        }];
        backend.submit_edits("d", &ops).await.unwrap();
        let doc = backend.get_document("d").await.unwrap();
        let styles: Vec<_> = paragraphs(&doc).iter().map(|p| p.style).collect();
        assert_eq!(
            styles,
            vec![ParagraphStyle::Heading2, ParagraphStyle::Heading2, ParagraphStyle::NormalText]
        );
    }

    #[tokio::test]
    async fn test_bullets_and_paragraph_end_indices() {
        let backend = MemoryBackend::new();
        backend.insert_document("d", "Doc", "a\nb\n");
        let ops = [EditOperation::SetBullets {
            start_index: 1,
            end_index: 5,
            preset: BulletPreset::BulletCheckbox,
        }];
        backend.submit_edits("d", &ops).await.unwrap();
        let doc = backend.get_document("d").await.unwrap();
        let paras = paragraphs(&doc);
        assert!(paras.iter().all(|p| p.bulleted));
        assert_eq!(paras[0].end_index, 3);
        assert_eq!(paras[1].end_index, 5);
    }

    #[tokio::test]
    async fn test_replace_all_counts() {
        let backend = MemoryBackend::new();
        backend.insert_document("d", "Doc", "Cat cat CAT\n");
        let ops = [EditOperation::ReplaceAllText {
            match_text: "cat".into(),
            replacement: "dog".into(),
            case_sensitive: true,
        }];
        let reply = backend.submit_edits("d", &ops).await.unwrap();
        assert_eq!(reply.occurrences_changed(), 1);
        assert_eq!(backend.body_text("d").unwrap(), "Cat dog CAT\n");

        let ops = [EditOperation::ReplaceAllText {
            match_text: "cat".into(),
            replacement: "cow".into(),
            case_sensitive: false,
        }];
        let reply = backend.submit_edits("d", &ops).await.unwrap();
        assert_eq!(reply.occurrences_changed(), 2);
        assert_eq!(backend.body_text("d").unwrap(), "cow dog cow\n");
    }

    #[tokio::test]
    async fn test_replacement_containing_match_does_not_loop() {
        let backend = MemoryBackend::new();
        backend.insert_document("d", "Doc", "aa\n");
        let ops = [EditOperation::ReplaceAllText {
            match_text: "a".into(),
            replacement: "aa".into(),
            case_sensitive: true,
        }];
        let reply = backend.submit_edits("d", &ops).await.unwrap();
        assert_eq!(reply.occurrences_changed(), 2);
        assert_eq!(backend.body_text("d").unwrap(), "aaaa\n");
    }

    #[tokio::test]
    async fn test_surrogate_pairs_use_two_indices() {
        let backend = MemoryBackend::new();
        backend.insert_document("d", "Doc", "🎉\n");
        let doc = backend.get_document("d").await.unwrap();
        assert_eq!(doc.tree.last().unwrap().end_index(), 4);

        let ops = [EditOperation::InsertText { index: 2, text: "x".into() }];
        assert!(backend.submit_edits("d", &ops).await.is_err());
        let ops = [EditOperation::InsertText { index: 3, text: "x".into() }];
        backend.submit_edits("d", &ops).await.unwrap();
        assert_eq!(backend.body_text("d").unwrap(), "🎉x\n");
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let backend = MemoryBackend::new();
        let a = backend.create_document("A");
        let b = backend.create_document("B");
        assert_ne!(a, b);
        assert_eq!(backend.list_ids(), vec![a, b]);
    }
}
