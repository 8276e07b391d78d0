//! The backend seam: one atomic read and one atomic batched write.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::ops::{BatchReply, EditOperation};
use crate::tree::Document;

/// Storage backend holding the documents.
///
/// Implementations must apply a batch all-or-nothing, in array order.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Read the current title and content tree of a document.
    async fn get_document(&self, document_id: &str) -> Result<Document>;

    /// Apply `ops` to a document as one atomic batch.
    ///
    /// Returns one reply per operation, in submission order.
    async fn submit_edits(&self, document_id: &str, ops: &[EditOperation]) -> Result<BatchReply>;

    /// Short backend name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Thread-safe shared backend handle.
pub type SharedBackend = Arc<dyn DocumentBackend>;
