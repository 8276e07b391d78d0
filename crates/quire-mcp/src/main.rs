//! Quire MCP server binary.
//!
//! Exposes document editing to MCP clients over stdio.
//!
//! Usage:
//!   # In-memory mode (ephemeral)
//!   cargo run -p quire-mcp -- --memory --seed notes="Meeting notes"
//!
//!   # Remote documents API, token from $QUIRE_ACCESS_TOKEN or config file
//!   cargo run -p quire-mcp
//!   cargo run -p quire-mcp -- --config ./quire.toml
//!
//! Test with MCP inspector:
//!   npx @modelcontextprotocol/inspector cargo run -p quire-mcp -- --memory

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use rmcp::{ServiceExt, transport::stdio};
use tracing_subscriber::{EnvFilter, fmt};

use quire_docs::{BackendConfig, MemoryBackend, RestBackend};
use quire_mcp::QuireMcp;

/// MCP server for rich-text document editing.
#[derive(Parser, Debug)]
#[command(name = "quire-mcp")]
#[command(about = "MCP server for index-addressed document editing")]
struct Args {
    /// Use an ephemeral in-memory backend instead of the remote API
    #[arg(short, long)]
    memory: bool,

    /// Path to config.toml (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pre-create an in-memory document, as ID=TITLE (repeatable)
    #[arg(long, value_name = "ID=TITLE")]
    seed: Vec<String>,
}

fn parse_seed(seed: &str) -> Result<(&str, &str)> {
    match seed.split_once('=') {
        Some((id, title)) if !id.is_empty() => Ok((id, title)),
        _ => bail!("invalid --seed '{seed}', expected ID=TITLE"),
    }
}

fn build_server(args: &Args) -> Result<QuireMcp> {
    if args.memory {
        let memory = Arc::new(MemoryBackend::new());
        for seed in &args.seed {
            let (id, title) = parse_seed(seed)?;
            memory.insert_document(id, title, "");
        }
        tracing::info!(seeded = args.seed.len(), "Starting with in-memory backend");
        return Ok(QuireMcp::with_memory(memory));
    }

    if !args.seed.is_empty() {
        bail!("--seed requires --memory");
    }
    let config = BackendConfig::load(args.config.as_deref()).context("loading backend config")?;
    let backend = RestBackend::new(&config).context("creating REST backend")?;
    tracing::info!(base_url = %config.base_url, "Starting with REST backend");
    Ok(QuireMcp::with_backend(Arc::new(backend)))
}

#[tokio::main]
async fn main() -> Result<()> {
    // MCP uses stdout for protocol, logs go to stderr
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let args = Args::parse();
    let mcp = build_server(&args)?;

    let service = mcp
        .serve(stdio())
        .await
        .inspect_err(|e| {
            tracing::error!("MCP server error: {:?}", e);
        })?;

    tracing::info!("quire-mcp server ready");

    service.waiting().await?;

    tracing::info!("quire-mcp server shutting down");
    Ok(())
}
