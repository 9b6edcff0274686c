//! In-memory storage provider with pluggable search

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::PlaybookStore;
use crate::document::Playbook;
use crate::error::Result;
use crate::search::{self, KeywordSearch, SearchProvider};

struct Entry {
    /// Position of the first insert, used as the ranking tiebreak
    seq: u64,
    playbook: Arc<Playbook>,
}

#[derive(Default)]
struct Inner {
    entries: BTreeMap<String, Entry>,
    next_seq: u64,
}

impl Inner {
    /// Playbooks in first-insert order
    fn in_insertion_order(&self) -> Vec<(u64, Arc<Playbook>)> {
        let mut playbooks: Vec<_> = self
            .entries
            .values()
            .map(|entry| (entry.seq, Arc::clone(&entry.playbook)))
            .collect();
        playbooks.sort_by_key(|(seq, _)| *seq);
        playbooks
    }
}

/// Volatile playbook store guarded by a single read-write lock
///
/// Playbooks are shared as `Arc<Playbook>` and never mutated, so a reader
/// holding a result is unaffected by later writes. Overwriting a title keeps
/// its original position in the ranking tiebreak order.
pub struct InMemoryStorage {
    inner: RwLock<Inner>,
    search: Arc<dyn SearchProvider>,
}

impl InMemoryStorage {
    pub fn new(search: Arc<dyn SearchProvider>) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            search,
        }
    }

    pub fn search_provider(&self) -> &Arc<dyn SearchProvider> {
        &self.search
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new(Arc::new(KeywordSearch::new()))
    }
}

#[async_trait]
impl PlaybookStore for InMemoryStorage {
    async fn add_playbook(&self, playbook: Playbook) -> Result<()> {
        let title = playbook.metadata.title.clone();
        let playbook = Arc::new(playbook);

        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        if let Some(entry) = inner.entries.get_mut(&title) {
            tracing::debug!(title = %title, "Replacing playbook");
            entry.playbook = playbook;
        } else {
            let seq = inner.next_seq;
            inner.next_seq += 1;
            inner.entries.insert(title, Entry { seq, playbook });
        }
        Ok(())
    }

    async fn get_playbook(&self, title: &str) -> Result<Option<Arc<Playbook>>> {
        let inner = self.inner.read().await;
        Ok(inner
            .entries
            .get(title)
            .map(|entry| Arc::clone(&entry.playbook)))
    }

    async fn query(
        &self,
        question: &str,
        top_k: usize,
        tags: Option<&[String]>,
    ) -> Result<Vec<Arc<Playbook>>> {
        // Snapshot under the lock, score outside it
        let candidates: Vec<Arc<Playbook>> = {
            let inner = self.inner.read().await;
            inner
                .in_insertion_order()
                .into_iter()
                .map(|(_, playbook)| playbook)
                .filter(|playbook| match tags {
                    Some(filter) if !filter.is_empty() => playbook.has_any_tag(filter),
                    _ => true,
                })
                .collect()
        };

        Ok(search::rank(self.search.as_ref(), candidates, question, top_k))
    }

    async fn list_all(&self) -> Result<Vec<String>> {
        let inner = self.inner.read().await;
        Ok(inner.entries.keys().cloned().collect())
    }

    async fn snapshot(&self) -> Result<Vec<Arc<Playbook>>> {
        let inner = self.inner.read().await;
        Ok(inner
            .entries
            .values()
            .map(|entry| Arc::clone(&entry.playbook))
            .collect())
    }

    async fn delete_playbook(&self, title: &str) -> Result<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner.entries.remove(title).is_some())
    }

    async fn clear(&self) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.entries.clear();
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.inner.read().await.entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SimpleSearch;
    use pretty_assertions::assert_eq;

    fn playbook(title: &str, tags: &[&str]) -> Playbook {
        Playbook::new(title, format!("{} playbook", title), "content").with_tags(tags.iter().copied())
    }

    #[tokio::test]
    async fn test_add_get_count() {
        let store = InMemoryStorage::default();
        store.add_playbook(playbook("Test", &["test"])).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let fetched = store.get_playbook("Test").await.unwrap().unwrap();
        assert_eq!(fetched.title(), "Test");
        assert!(store.get_playbook("test").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_replaces_whole_playbook() {
        let store = InMemoryStorage::default();
        store
            .add_playbook(Playbook::new("Same", "first", "old content").with_tags(["a"]))
            .await
            .unwrap();
        store
            .add_playbook(Playbook::new("Same", "second", "new content"))
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let fetched = store.get_playbook("Same").await.unwrap().unwrap();
        assert_eq!(fetched.content, "new content");
        assert!(fetched.tags().is_empty());
    }

    #[tokio::test]
    async fn test_list_all_sorted() {
        let store = InMemoryStorage::default();
        for title in ["B", "A", "C"] {
            store.add_playbook(playbook(title, &[])).await.unwrap();
        }
        assert_eq!(store.list_all().await.unwrap(), vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_snapshot_sorted_by_title() {
        let store = InMemoryStorage::default();
        for title in ["B", "A", "C"] {
            store.add_playbook(playbook(title, &[])).await.unwrap();
        }

        let snapshot = store.snapshot().await.unwrap();
        let titles: Vec<&str> = snapshot.iter().map(|p| p.title()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);

        // Later writes do not touch an existing snapshot
        store.delete_playbook("A").await.unwrap();
        assert_eq!(snapshot[0].title(), "A");
        assert_eq!(store.snapshot().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let store = InMemoryStorage::default();
        store.add_playbook(playbook("One", &[])).await.unwrap();
        store.add_playbook(playbook("Two", &[])).await.unwrap();

        assert!(store.delete_playbook("One").await.unwrap());
        assert!(!store.delete_playbook("One").await.unwrap());
        assert!(!store.delete_playbook("Missing").await.unwrap());
        assert_eq!(store.count().await.unwrap(), 1);

        store.clear().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_tag_filter() {
        let store = InMemoryStorage::default();
        store
            .add_playbook(
                Playbook::new("Weather Report", "Weather information", "forecast")
                    .with_tags(["weather"]),
            )
            .await
            .unwrap();
        store
            .add_playbook(
                Playbook::new("Database Report", "Database information", "tables")
                    .with_tags(["database"]),
            )
            .await
            .unwrap();

        let all = store.query("information", 3, None).await.unwrap();
        assert_eq!(all.len(), 2);

        let filter = vec!["weather".to_string()];
        let filtered = store.query("information", 3, Some(filter.as_slice())).await.unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title(), "Weather Report");

        // An empty filter means no filter
        let empty: Vec<String> = Vec::new();
        assert_eq!(store.query("information", 3, Some(empty.as_slice())).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_overwrite_keeps_tiebreak_position() {
        let store = InMemoryStorage::new(Arc::new(SimpleSearch));
        store.add_playbook(playbook("Alpha guide", &[])).await.unwrap();
        store.add_playbook(playbook("Beta guide", &[])).await.unwrap();
        store.add_playbook(playbook("Alpha guide", &[])).await.unwrap();

        let ranked = store.query("guide", 5, None).await.unwrap();
        let titles: Vec<&str> = ranked.iter().map(|p| p.title()).collect();
        assert_eq!(titles, vec!["Alpha guide", "Beta guide"]);

        // Delete then re-add moves the title to the end
        store.delete_playbook("Alpha guide").await.unwrap();
        store.add_playbook(playbook("Alpha guide", &[])).await.unwrap();
        let ranked = store.query("guide", 5, None).await.unwrap();
        let titles: Vec<&str> = ranked.iter().map(|p| p.title()).collect();
        assert_eq!(titles, vec!["Beta guide", "Alpha guide"]);
    }
}
