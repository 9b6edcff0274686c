//! Service layer for playbook operations

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::document::{Playbook, PlaybookQuery};
use crate::error::Result;
use crate::storage::PlaybookStore;

/// Stats key for the number of stored playbooks
pub const STAT_TOTAL_PLAYBOOKS: &str = "total_playbooks";

/// Orchestrates store operations for the tool endpoints and the loader.
///
/// Holds nothing but a shared store handle, so clones are cheap and all
/// clones see the same playbooks.
#[derive(Clone)]
pub struct PlaybookService {
    store: Arc<dyn PlaybookStore>,
}

impl PlaybookService {
    pub fn new(store: Arc<dyn PlaybookStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn PlaybookStore> {
        &self.store
    }

    /// Build a playbook and store it, replacing any playbook with the same title
    pub async fn create_playbook(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
        description: impl Into<String>,
        tags: Option<Vec<String>>,
        author: Option<String>,
    ) -> Result<Playbook> {
        let playbook = Playbook::new(title, description, content)
            .with_tags(tags.unwrap_or_default())
            .with_author(author);

        tracing::debug!(title = %playbook.title(), "Creating playbook");
        self.store.add_playbook(playbook.clone()).await?;
        Ok(playbook)
    }

    pub async fn get_playbook(&self, title: &str) -> Result<Option<Arc<Playbook>>> {
        self.store.get_playbook(title).await
    }

    /// Query playbooks with a natural language question
    pub async fn query_playbooks(
        &self,
        question: &str,
        top_k: usize,
        tags: Option<&[String]>,
    ) -> Result<Vec<Arc<Playbook>>> {
        self.store.query(question, top_k, tags).await
    }

    /// Run a validated [`PlaybookQuery`]
    pub async fn query(&self, query: &PlaybookQuery) -> Result<Vec<Arc<Playbook>>> {
        query.validate()?;
        self.query_playbooks(&query.question, query.top_k, query.tags.as_deref())
            .await
    }

    pub async fn list_playbooks(&self) -> Result<Vec<String>> {
        self.store.list_all().await
    }

    /// Every stored playbook, sorted by title
    pub async fn all_playbooks(&self) -> Result<Vec<Arc<Playbook>>> {
        self.store.snapshot().await
    }

    pub async fn delete_playbook(&self, title: &str) -> Result<bool> {
        self.store.delete_playbook(title).await
    }

    /// Storage statistics keyed by metric name
    pub async fn get_stats(&self) -> Result<BTreeMap<String, usize>> {
        let mut stats = BTreeMap::new();
        stats.insert(STAT_TOTAL_PLAYBOOKS.to_string(), self.store.count().await?);
        Ok(stats)
    }
}
