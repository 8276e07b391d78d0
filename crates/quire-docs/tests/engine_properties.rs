//! Behavioural properties of the document engine.
//!
//! Each test drives `DocumentEngine` against `MemoryBackend`, wrapped in a
//! recorder that captures every submitted batch so tests can assert on what
//! was (or was not) sent.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use quire_docs::{
    BatchReply, BulletPreset, DocsError, Document, DocumentBackend, DocumentEngine, EditOperation,
    MemoryBackend, ParagraphStyle, Result, index,
};

// ============================================================================
// Shared test setup
// ============================================================================

/// Records every batch before forwarding it to the wrapped backend.
struct RecordingBackend {
    inner: MemoryBackend,
    batches: Mutex<Vec<Vec<EditOperation>>>,
    reads: Mutex<usize>,
    /// When set, every insert batch is rejected before reaching `inner`.
    reject_inserts: AtomicBool,
}

impl RecordingBackend {
    fn with_text(text: &str) -> Arc<Self> {
        let inner = MemoryBackend::new();
        inner.insert_document("doc", "Test Document", text);
        Arc::new(Self {
            inner,
            batches: Mutex::new(Vec::new()),
            reads: Mutex::new(0),
            reject_inserts: AtomicBool::new(false),
        })
    }

    fn batches(&self) -> Vec<Vec<EditOperation>> {
        self.batches.lock().clone()
    }

    fn submit_count(&self) -> usize {
        self.batches.lock().len()
    }

    fn read_count(&self) -> usize {
        *self.reads.lock()
    }
}

#[async_trait]
impl DocumentBackend for RecordingBackend {
    async fn get_document(&self, document_id: &str) -> Result<Document> {
        *self.reads.lock() += 1;
        self.inner.get_document(document_id).await
    }

    async fn submit_edits(&self, document_id: &str, ops: &[EditOperation]) -> Result<BatchReply> {
        self.batches.lock().push(ops.to_vec());
        let inserts = ops.iter().any(|op| matches!(op, EditOperation::InsertText { .. }));
        if inserts && self.reject_inserts.load(Ordering::SeqCst) {
            return Err(DocsError::rejected("simulated outage"));
        }
        self.inner.submit_edits(document_id, ops).await
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

fn engine(backend: &Arc<RecordingBackend>) -> DocumentEngine {
    DocumentEngine::new(backend.clone())
}

// ============================================================================
// Round trip
// ============================================================================

#[tokio::test]
async fn append_round_trip_places_text_after_prior_text() {
    for prior in ["", "Existing paragraph\n", "Line one\nLine two\n"] {
        let backend = RecordingBackend::with_text(prior);
        let engine = engine(&backend);
        let before = engine.read_text("doc").await.unwrap().text;

        engine.append("doc", "Appended text").await.unwrap();

        let after = engine.read_text("doc").await.unwrap().text;
        assert_eq!(after, format!("{before}Appended text"), "prior = {prior:?}");
    }
}

#[tokio::test]
async fn repeated_appends_accumulate_in_order() {
    let backend = RecordingBackend::with_text("");
    let engine = engine(&backend);
    for chunk in ["alpha ", "beta ", "gamma"] {
        engine.append("doc", chunk).await.unwrap();
    }
    assert_eq!(engine.read_text("doc").await.unwrap().text, "alpha beta gamma");
    assert_eq!(backend.read_count(), 3 + 1);
}

// ============================================================================
// Clear
// ============================================================================

#[tokio::test]
async fn clear_is_idempotent() {
    let backend = RecordingBackend::with_text("Some words\nMore words\n");
    let engine = engine(&backend);

    assert!(engine.clear("doc").await.unwrap());
    let once = backend.inner.get_document("doc").await.unwrap();

    assert!(!engine.clear("doc").await.unwrap());
    let twice = backend.inner.get_document("doc").await.unwrap();

    assert_eq!(once.tree, twice.tree);
    assert_eq!(backend.submit_count(), 1);
    assert_eq!(engine.read_text("doc").await.unwrap().text, "");
}

#[tokio::test]
async fn clear_deletes_everything_but_the_terminator() {
    let backend = RecordingBackend::with_text("Hello\n");
    let engine = engine(&backend);
    engine.clear("doc").await.unwrap();
    assert_eq!(
        backend.batches(),
        vec![vec![EditOperation::DeleteRange { start_index: 1, end_index: 6 }]]
    );
}

// ============================================================================
// Index invariant
// ============================================================================

#[tokio::test]
async fn append_index_is_end_minus_one_and_at_least_one() {
    for text in ["", "x\n", "a longer body\nwith two paragraphs\n", "🎉 party\n"] {
        let backend = RecordingBackend::with_text(text);
        let doc = backend.get_document("doc").await.unwrap();
        let end = index::end_of_document_index(&doc.tree);
        let at = index::append_insertion_index(&doc.tree);
        assert_eq!(at, end - 1);
        assert!(at >= 1);
    }
}

// ============================================================================
// Empty inputs
// ============================================================================

#[tokio::test]
async fn empty_inputs_submit_nothing() {
    let backend = RecordingBackend::with_text("Untouched\n");
    let engine = engine(&backend);

    assert_eq!(engine.append("doc", "").await.unwrap(), None);
    assert_eq!(engine.add_bullet_list("doc", &[], BulletPreset::default()).await.unwrap(), 0);
    engine.insert_at("doc", "", 3).await.unwrap();

    assert_eq!(backend.submit_count(), 0);
    assert_eq!(backend.read_count(), 0);
    assert_eq!(engine.read_text("doc").await.unwrap().text, "Untouched");
}

// ============================================================================
// Atomic composite edits
// ============================================================================

#[tokio::test]
async fn heading_is_one_batch_insert_then_style() {
    let backend = RecordingBackend::with_text("Intro\n");
    let engine = engine(&backend);

    engine.add_heading("doc", "Title", ParagraphStyle::Heading1).await.unwrap();

    let batches = backend.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(
        batches[0],
        vec![
            EditOperation::InsertText { index: 6, text: "Title\n".into() },
            EditOperation::SetParagraphStyle {
                start_index: 6,
                end_index: 12,
                style: ParagraphStyle::Heading1,
            },
        ]
    );
}

#[tokio::test]
async fn heading_on_empty_document_is_styled() {
    let backend = RecordingBackend::with_text("");
    let engine = engine(&backend);

    engine.add_heading("doc", "Title", ParagraphStyle::Heading1).await.unwrap();

    let doc = backend.get_document("doc").await.unwrap();
    let heading = doc
        .tree
        .iter()
        .find_map(|b| match b {
            quire_docs::Block::Paragraph(p) if p.text() == "Title\n" => Some(p),
            _ => None,
        })
        .expect("heading paragraph present");
    assert_eq!(heading.style, ParagraphStyle::Heading1);
}

#[tokio::test]
async fn bullet_list_is_one_batch_covering_all_items() {
    let backend = RecordingBackend::with_text("");
    let engine = engine(&backend);
    let items = vec!["milk".to_string(), "eggs".to_string()];

    engine
        .add_bullet_list("doc", &items, BulletPreset::NumberedDecimalAlphaRoman)
        .await
        .unwrap();

    let batches = backend.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(
        batches[0][1],
        EditOperation::SetBullets {
            start_index: 1,
            end_index: 11,
            preset: BulletPreset::NumberedDecimalAlphaRoman,
        }
    );
    assert_eq!(engine.describe("doc").await.unwrap().list_items, 2);
}

// ============================================================================
// Failure propagation
// ============================================================================

#[tokio::test]
async fn stale_index_is_rejected_and_document_unchanged() {
    let backend = RecordingBackend::with_text("Short\n");
    let engine = engine(&backend);

    let err = engine.insert_at("doc", "late", 40).await.unwrap_err();
    assert!(err.is_backend_rejection());
    assert_eq!(engine.read_text("doc").await.unwrap().text, "Short");
}

#[tokio::test]
async fn update_failure_after_clear_leaves_document_empty() {
    let backend = RecordingBackend::with_text("Original content\n");
    let engine = engine(&backend);
    backend.reject_inserts.store(true, Ordering::SeqCst);

    let err = engine.update("doc", "Replacement").await.unwrap_err();
    assert_eq!(err, DocsError::rejected("simulated outage"));
    assert_eq!(backend.submit_count(), 2);
    assert_eq!(engine.read_text("doc").await.unwrap().text, "");
}

#[tokio::test]
async fn update_is_clear_then_append() {
    let backend = RecordingBackend::with_text("Old\n");
    let engine = engine(&backend);

    engine.update("doc", "New").await.unwrap();

    let batches = backend.batches();
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0][0].kind(), "delete_range");
    assert_eq!(batches[1], vec![EditOperation::InsertText { index: 1, text: "New".into() }]);
    assert_eq!(engine.read_text("doc").await.unwrap().text, "New");
}
