//! Error types for document operations.
//!
//! Every failure from a read or submit step reaches the caller unchanged;
//! nothing here retries or reconciles.

use thiserror::Error;

/// Errors that can occur while reading or mutating a document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocsError {
    /// The backend does not know this document id.
    #[error("document not found: {0}")]
    NotFound(String),

    /// A precondition on caller-supplied arguments was violated.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The backend refused the request (bad index, stale range, validation).
    ///
    /// Carries the backend's own diagnostic text.
    #[error("backend rejected request: {0}")]
    BackendRejected(String),

    /// The request never got a usable answer from the backend.
    #[error("transport error: {0}")]
    Transport(String),

    /// Configuration could not be loaded or is incomplete.
    #[error("configuration error: {0}")]
    Config(String),
}

impl DocsError {
    /// Create a NotFound error.
    pub fn not_found(document_id: impl Into<String>) -> Self {
        Self::NotFound(document_id.into())
    }

    /// Create an InvalidArgument error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a BackendRejected error.
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::BackendRejected(msg.into())
    }

    /// Whether callers should treat this as a backend-side rejection.
    ///
    /// Transport failures count: from the caller's side the batch did not land.
    pub fn is_backend_rejection(&self) -> bool {
        matches!(self, Self::BackendRejected(_) | Self::Transport(_))
    }
}

/// Result type for document operations.
pub type Result<T> = std::result::Result<T, DocsError>;
