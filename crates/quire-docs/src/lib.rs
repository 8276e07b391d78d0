//! Document mutation and extraction engine.
//!
//! Models a rich-text document body as a flat, index-addressed content
//! stream held by a remote backend, and edits it through ordered, atomic
//! batches of structural operations.
//!
//! # Coordinate space
//!
//! Every character of the body has one integer index, measured in UTF-16
//! code units. Index 0 is unaddressable; content begins at 1. The last
//! top-level block ends with an implicit terminator newline, so appended
//! text is inserted one index before the document's end index.
//!
//! # Layering
//!
//! ```text
//!   DocumentEngine          read → derive indices → submit one batch
//!     ├── reader            content tree → linear text
//!     ├── index             end index, append index, clearable range
//!     └── batch             ordered EditOperation lists
//!   DocumentBackend         get_document / submit_edits
//!     ├── MemoryBackend     ephemeral, exact index validation
//!     └── RestBackend       HTTP documents API
//! ```
//!
//! # Module Structure
//!
//! - `tree`: content tree types (blocks, paragraphs, runs, tables)
//! - `ops`: edit operations and batch replies
//! - `config`: backend connection settings

pub mod backend;
pub mod batch;
pub mod config;
mod engine;
mod error;
pub mod index;
pub mod memory;
mod ops;
pub mod reader;
pub mod rest;
mod tree;

pub use backend::{DocumentBackend, SharedBackend};
pub use config::BackendConfig;
pub use engine::{DocumentEngine, DocumentSummary, DocumentText};
pub use error::{DocsError, Result};
pub use memory::MemoryBackend;
pub use ops::{BatchReply, BulletPreset, EditOperation, OpReply};
pub use rest::RestBackend;
pub use tree::{
    Block, ContentTree, Document, Paragraph, ParagraphStyle, Run, Table, TableCell, TableRow,
};
