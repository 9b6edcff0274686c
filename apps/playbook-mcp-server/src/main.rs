//! Playbook MCP Server Binary
//!
//! Entry point for the MCP server supporting multiple transports.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use playbook_core::config::parse_stop_words;
use playbook_core::{PlaybookConfig, PlaybookLoader, SearchType};
use playbook_mcp_server::PlaybookMcpServer;

#[derive(Parser, Debug)]
#[command(name = "playbook-mcp-server")]
#[command(
    version,
    about = "Playbook repository served via Model Context Protocol"
)]
struct Args {
    /// Transport mode: stdio or http
    #[arg(short, long, default_value = "stdio")]
    transport: String,

    /// HTTP server address (only used with http transport)
    #[arg(long, default_value = "127.0.0.1:3000")]
    http_addr: String,

    /// Directory of markdown playbooks to load (repeatable)
    #[arg(short = 'd', long = "playbooks-dir")]
    playbooks_dir: Vec<PathBuf>,

    /// Index file listing playbook locations
    #[arg(long)]
    index: Option<PathBuf>,

    /// Scoring strategy: keyword or simple
    #[arg(long)]
    search: Option<SearchType>,

    /// Comma-separated stop words for keyword search
    #[arg(long)]
    stop_words: Option<String>,

    /// Author recorded on loaded playbooks
    #[arg(long)]
    author: Option<String>,
}

impl Args {
    /// Environment configuration with command-line overrides applied
    fn config(&self) -> anyhow::Result<PlaybookConfig> {
        let mut config = PlaybookConfig::from_env().context("invalid PLAYBOOK_* environment")?;

        if let Some(search) = self.search {
            config.search = search;
        }
        if let Some(stop_words) = &self.stop_words {
            config.stop_words = parse_stop_words(stop_words);
        }
        if !self.playbooks_dir.is_empty() {
            config.playbook_dirs = self.playbooks_dir.clone();
        }
        if let Some(index) = &self.index {
            config.index_path = Some(index.clone());
        }
        if let Some(author) = &self.author {
            config.author = Some(author.clone());
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing - CRITICAL: use stderr for stdio transport
    let use_stderr = args.transport == "stdio";

    if use_stderr {
        // For stdio transport, ALL output must go to stderr
        tracing_subscriber::registry()
            .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting Playbook MCP Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Transport: {}", args.transport);

    let config = args.config()?;
    let service = config.build_service();

    let loaded = PlaybookLoader::new(service.clone())
        .load_configured(&config)
        .await;
    tracing::info!("Loaded {} playbooks", loaded);

    let server = PlaybookMcpServer::new(service);

    match args.transport.as_str() {
        "stdio" => {
            playbook_mcp_server::transport::stdio::run_stdio_server(server).await?;
        }
        #[cfg(feature = "http")]
        "http" => {
            playbook_mcp_server::transport::http::run_http_server(&args.http_addr, server).await?;
        }
        #[cfg(not(feature = "http"))]
        "http" => {
            anyhow::bail!("HTTP transport not enabled. Rebuild with --features http");
        }
        other => {
            anyhow::bail!("Unknown transport: {}. Use 'stdio' or 'http'", other);
        }
    }

    Ok(())
}
