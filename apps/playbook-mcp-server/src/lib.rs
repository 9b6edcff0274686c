//! Playbook MCP Server
//!
//! A Model Context Protocol server that lets MCP-compliant AI agents query,
//! ingest and read playbooks held in a [`playbook_core`] repository.

pub mod error;
pub mod mcp;
pub mod transport;

pub use error::ServerError;
pub use mcp::server::PlaybookMcpServer;
pub use playbook_core::{Playbook, PlaybookConfig, PlaybookService};
