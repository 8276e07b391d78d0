//! MCP server exposing quire document editing.
//!
//! Each tool is a thin call into [`DocumentEngine`]; results come back as
//! JSON strings and failures as `Error: ...` text so agents can read and
//! correct them.
//!
//! ## Backends
//!
//! - **Memory**: ephemeral in-process documents, for inspection and testing
//! - **Rest**: the remote documents API, authenticated with a bearer token

mod models;

use std::sync::{Arc, Mutex};

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{LoggingLevel, ServerCapabilities, ServerInfo, SetLevelRequestParams},
    service::RequestContext,
    tool, tool_handler, tool_router,
};

use quire_docs::index::index_len;
use quire_docs::{BulletPreset, DocumentEngine, MemoryBackend, ParagraphStyle, SharedBackend};

pub use models::*;

/// Shared state for server-side MCP features.
#[derive(Clone)]
pub struct McpServerState {
    /// Current logging level (default: info)
    pub log_level: Arc<Mutex<LoggingLevel>>,
}

impl Default for McpServerState {
    fn default() -> Self {
        Self {
            log_level: Arc::new(Mutex::new(LoggingLevel::Info)),
        }
    }
}

/// MCP server exposing document tools.
#[derive(Clone)]
pub struct QuireMcp {
    engine: DocumentEngine,
    /// Set when running against the in-memory backend.
    memory: Option<Arc<MemoryBackend>>,
    tool_router: ToolRouter<Self>,
    server_state: McpServerState,
}

impl std::fmt::Debug for QuireMcp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuireMcp")
            .field("engine", &self.engine)
            .field("tool_router", &self.tool_router)
            .finish()
    }
}

impl QuireMcp {
    /// Create a server over any backend.
    pub fn with_backend(backend: SharedBackend) -> Self {
        Self {
            engine: DocumentEngine::new(backend),
            memory: None,
            tool_router: Self::tool_router(),
            server_state: McpServerState::default(),
        }
    }

    /// Create a server over an in-memory backend.
    pub fn with_memory(memory: Arc<MemoryBackend>) -> Self {
        let mut server = Self::with_backend(memory.clone());
        server.memory = Some(memory);
        server
    }

    /// Create a server over a fresh, empty in-memory backend.
    pub fn new() -> Self {
        Self::with_memory(Arc::new(MemoryBackend::new()))
    }

    pub fn engine(&self) -> &DocumentEngine {
        &self.engine
    }

    pub fn memory(&self) -> Option<&Arc<MemoryBackend>> {
        self.memory.as_ref()
    }
}

impl Default for QuireMcp {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl QuireMcp {
    // ========================================================================
    // Reading
    // ========================================================================

    #[tool(description = "Read a document as plain text. Paragraphs are returned in order; tables appear between [TABLE] and [/TABLE] markers with cells separated by ' | '.")]
    #[tracing::instrument(skip(self, req), name = "mcp.doc_read")]
    async fn doc_read(&self, Parameters(req): Parameters<DocumentRequest>) -> String {
        match self.engine.read_text(&req.document_id).await {
            Ok(doc) => format!("# {}\n\n{}", doc.title, doc.text),
            Err(e) => format!("Error: {e}"),
        }
    }

    #[tool(description = "Summarize a document's structure: title, end index, and counts of paragraphs, headings, list items, tables, and characters.")]
    #[tracing::instrument(skip(self, req), name = "mcp.doc_describe")]
    async fn doc_describe(&self, Parameters(req): Parameters<DocumentRequest>) -> String {
        match self.engine.describe(&req.document_id).await {
            Ok(summary) => serde_json::to_string(&summary)
                .unwrap_or_else(|e| format!("Error: {e}")),
            Err(e) => format!("Error: {e}"),
        }
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    #[tool(description = "Create an empty document. Only available with the in-memory backend; remote documents are created outside this server.")]
    fn doc_create(&self, Parameters(req): Parameters<DocCreateRequest>) -> String {
        let Some(memory) = self.memory() else {
            return "Error: doc_create requires the in-memory backend (--memory)".to_string();
        };
        let id = memory.create_document(req.title.clone());
        serde_json::json!({
            "success": true,
            "document_id": id,
            "title": req.title,
        }).to_string()
    }

    #[tool(description = "Append text at the end of a document, just before its final paragraph break. Empty text is accepted and does nothing.")]
    #[tracing::instrument(skip(self, req), name = "mcp.doc_append")]
    async fn doc_append(&self, Parameters(req): Parameters<DocAppendRequest>) -> String {
        match self.engine.append(&req.document_id, &req.text).await {
            Ok(Some(index)) => serde_json::json!({
                "success": true,
                "inserted_at": index,
                "length": index_len(&req.text),
            }).to_string(),
            Ok(None) => serde_json::json!({
                "success": true,
                "skipped": "empty text",
            }).to_string(),
            Err(e) => format!("Error: {e}"),
        }
    }

    #[tool(description = "Insert text at an explicit index. Content starts at index 1 and the index must be below the document's end index (see doc_describe); out-of-range indices are rejected without changing the document.")]
    #[tracing::instrument(skip(self, req), name = "mcp.doc_insert")]
    async fn doc_insert(&self, Parameters(req): Parameters<DocInsertRequest>) -> String {
        match self.engine.insert_at(&req.document_id, &req.text, req.index).await {
            Ok(()) => serde_json::json!({
                "success": true,
                "index": req.index,
            }).to_string(),
            Err(e) => format!("Error: {e}"),
        }
    }

    #[tool(description = "Replace every occurrence of a string in a document. Case-sensitive unless match_case is false. Returns the number of occurrences changed.")]
    #[tracing::instrument(skip(self, req), name = "mcp.doc_replace")]
    async fn doc_replace(&self, Parameters(req): Parameters<DocReplaceRequest>) -> String {
        match self
            .engine
            .replace_all(&req.document_id, &req.find, &req.replace, req.match_case)
            .await
        {
            Ok(occurrences) => serde_json::json!({
                "success": true,
                "occurrences": occurrences,
            }).to_string(),
            Err(e) => format!("Error: {e}"),
        }
    }

    #[tool(description = "Delete all content from a document. Clearing an already empty document does nothing.")]
    #[tracing::instrument(skip(self, req), name = "mcp.doc_clear")]
    async fn doc_clear(&self, Parameters(req): Parameters<DocumentRequest>) -> String {
        match self.engine.clear(&req.document_id).await {
            Ok(cleared) => serde_json::json!({
                "success": true,
                "cleared": cleared,
            }).to_string(),
            Err(e) => format!("Error: {e}"),
        }
    }

    #[tool(description = "Replace all document content with new text. Runs as two steps (clear, then append): if the second step fails the document is left empty.")]
    #[tracing::instrument(skip(self, req), name = "mcp.doc_update")]
    async fn doc_update(&self, Parameters(req): Parameters<DocUpdateRequest>) -> String {
        match self.engine.update(&req.document_id, &req.text).await {
            Ok(()) => serde_json::json!({
                "success": true,
                "length": index_len(&req.text),
            }).to_string(),
            Err(e) => format!("Error: {e}"),
        }
    }

    #[tool(description = "Append a heading paragraph at the end of a document, inserted and styled in one atomic batch.")]
    #[tracing::instrument(skip(self, req), name = "mcp.doc_heading")]
    async fn doc_heading(&self, Parameters(req): Parameters<DocHeadingRequest>) -> String {
        let Some(style) = ParagraphStyle::parse(&req.level) else {
            return format!(
                "Error: invalid heading level '{}'. Use: HEADING_1 to HEADING_6, TITLE, SUBTITLE, or NORMAL_TEXT",
                req.level
            );
        };
        match self.engine.add_heading(&req.document_id, &req.text, style).await {
            Ok(()) => serde_json::json!({
                "success": true,
                "style": style.to_string(),
            }).to_string(),
            Err(e) => format!("Error: {e}"),
        }
    }

    #[tool(description = "Append a bulleted (or numbered) list at the end of a document, one paragraph per item, inserted and formatted in one atomic batch. An empty list does nothing.")]
    #[tracing::instrument(skip(self, req), name = "mcp.doc_bullets")]
    async fn doc_bullets(&self, Parameters(req): Parameters<DocBulletsRequest>) -> String {
        let preset = if req.ordered {
            BulletPreset::NumberedDecimalAlphaRoman
        } else {
            BulletPreset::BulletDiscCircleSquare
        };
        match self.engine.add_bullet_list(&req.document_id, &req.items, preset).await {
            Ok(items) => serde_json::json!({
                "success": true,
                "items": items,
                "preset": preset.to_string(),
            }).to_string(),
            Err(e) => format!("Error: {e}"),
        }
    }
}

#[tool_handler]
impl ServerHandler for QuireMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(
            ServerCapabilities::builder()
                .enable_tools()
                .enable_logging()
                .build(),
        )
        .with_instructions(
            "Quire document server. Read, append, insert, replace, clear, and format text in rich-text documents. Indices address a flat coordinate space starting at 1.",
        )
    }

    // ========================================================================
    // Logging
    // ========================================================================

    /// Set the logging level.
    fn set_level(
        &self,
        request: SetLevelRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<(), McpError>> + Send + '_ {
        async move {
            let mut level = self.server_state.log_level.lock()
                .map_err(|_| McpError::internal_error("Lock error", None))?;
            *level = request.level;
            tracing::info!("Log level set to {:?}", request.level);
            Ok(())
        }
    }
}
