//! Storage layer for playbooks
//!
//! Stores own the playbook collection and delegate ranking to a
//! [`SearchProvider`]. The in-memory backend is the only built-in one; any
//! durable backend implements the same [`PlaybookStore`] contract.

pub mod memory;

pub use memory::InMemoryStorage;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::document::Playbook;
use crate::error::{PlaybookError, Result};
use crate::search::SearchProvider;

/// A collection of playbooks keyed by title
///
/// Every operation is atomic with respect to the collection: readers see a
/// playbook either before or after a concurrent write, never in between.
#[async_trait]
pub trait PlaybookStore: Send + Sync {
    /// Add a playbook, replacing any playbook with the same title
    async fn add_playbook(&self, playbook: Playbook) -> Result<()>;

    /// Get a playbook by exact title
    async fn get_playbook(&self, title: &str) -> Result<Option<Arc<Playbook>>>;

    /// Rank playbooks against `question` and return at most `top_k`.
    ///
    /// With a non-empty `tags` filter only playbooks sharing at least one
    /// tag with it are considered.
    async fn query(
        &self,
        question: &str,
        top_k: usize,
        tags: Option<&[String]>,
    ) -> Result<Vec<Arc<Playbook>>>;

    /// All titles, sorted alphabetically
    async fn list_all(&self) -> Result<Vec<String>>;

    /// Every stored playbook from one consistent view, sorted by title
    async fn snapshot(&self) -> Result<Vec<Arc<Playbook>>>;

    /// Delete a playbook by title. Returns false if it was not present.
    async fn delete_playbook(&self, title: &str) -> Result<bool>;

    /// Remove every playbook
    async fn clear(&self) -> Result<()>;

    /// Number of stored playbooks
    async fn count(&self) -> Result<usize>;
}

/// Built-in storage backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    /// Volatile storage for the lifetime of the process
    #[default]
    Memory,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::Memory => "memory",
        }
    }

    /// Build a store ranking with `search`
    pub fn create(self, search: Arc<dyn SearchProvider>) -> Arc<dyn PlaybookStore> {
        match self {
            StorageType::Memory => Arc::new(InMemoryStorage::new(search)),
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageType {
    type Err = PlaybookError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(StorageType::Memory),
            _ => Err(PlaybookError::UnsupportedStorageType(s.to_string())),
        }
    }
}
