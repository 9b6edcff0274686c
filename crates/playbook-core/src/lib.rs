//! Playbook Core - Domain types and query engine for the playbook repository
//!
//! This crate provides:
//! - Playbook and metadata types
//! - Pluggable scoring strategies (substring and keyword) and ranking
//! - Storage abstraction with an in-memory backend
//! - The service facade used by tool endpoints
//! - Markdown ingestion from files, directories and index files
//! - Configuration management

pub mod config;
pub mod document;
pub mod error;
pub mod loader;
pub mod search;
pub mod service;
pub mod storage;

// Re-export commonly used types
pub use config::PlaybookConfig;
pub use document::{Playbook, PlaybookMetadata, PlaybookQuery};
pub use error::{PlaybookError, Result};
pub use loader::{IndexLocation, PlaybookLoader};
pub use search::{KeywordSearch, SearchProvider, SearchType, SimpleSearch};
pub use service::PlaybookService;
pub use storage::{InMemoryStorage, PlaybookStore, StorageType};
