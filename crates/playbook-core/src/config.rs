//! Configuration for building a playbook service
//!
//! Values come from environment variables and can be overridden by the
//! caller (the server binary applies its command-line flags on top).

use std::collections::HashSet;
use std::path::PathBuf;

use crate::error::Result;
use crate::search::SearchType;
use crate::service::PlaybookService;
use crate::storage::StorageType;

/// Playbook service configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybookConfig {
    /// Scoring strategy
    pub search: SearchType,
    /// Storage backend
    pub storage: StorageType,
    /// Replacement stop-word set for keyword search
    pub stop_words: Option<HashSet<String>>,
    /// Directories scanned recursively for markdown playbooks at start-up
    pub playbook_dirs: Vec<PathBuf>,
    /// Index file listing playbook locations, used when no directories are given
    pub index_path: Option<PathBuf>,
    /// Author recorded on loaded playbooks
    pub author: Option<String>,
}

impl PlaybookConfig {
    /// Load configuration from environment variables
    ///
    /// Expected variables:
    /// - PLAYBOOK_SEARCH: "keyword" (default) or "simple"
    /// - PLAYBOOK_STORAGE: "memory" (default)
    /// - PLAYBOOK_STOP_WORDS: comma-separated stop words for keyword search
    /// - PLAYBOOK_DIRS: directories to load, separated like PATH
    /// - PLAYBOOK_INDEX: path to an index file of playbook locations
    /// - PLAYBOOK_AUTHOR: author recorded on loaded playbooks
    pub fn from_env() -> Result<Self> {
        let search = match std::env::var("PLAYBOOK_SEARCH") {
            Ok(value) => value.parse()?,
            Err(_) => SearchType::default(),
        };

        let storage = match std::env::var("PLAYBOOK_STORAGE") {
            Ok(value) => value.parse()?,
            Err(_) => StorageType::default(),
        };

        let stop_words = std::env::var("PLAYBOOK_STOP_WORDS")
            .ok()
            .and_then(|value| parse_stop_words(&value));

        let playbook_dirs = std::env::var_os("PLAYBOOK_DIRS")
            .map(|value| std::env::split_paths(&value).collect())
            .unwrap_or_default();

        let index_path = std::env::var_os("PLAYBOOK_INDEX").map(PathBuf::from);
        let author = std::env::var("PLAYBOOK_AUTHOR")
            .ok()
            .filter(|a| !a.trim().is_empty());

        Ok(Self {
            search,
            storage,
            stop_words,
            playbook_dirs,
            index_path,
            author,
        })
    }

    pub fn with_search(mut self, search: SearchType) -> Self {
        self.search = search;
        self
    }

    pub fn with_stop_words(mut self, stop_words: HashSet<String>) -> Self {
        self.stop_words = Some(stop_words);
        self
    }

    /// Build the store and service described by this configuration
    pub fn build_service(&self) -> PlaybookService {
        let search = self.search.create(self.stop_words.clone());
        tracing::info!(search = %self.search, storage = %self.storage, "Building playbook service");
        PlaybookService::new(self.storage.create(search))
    }
}

/// Parse a comma-separated stop-word list. Blank input means "use defaults".
pub fn parse_stop_words(value: &str) -> Option<HashSet<String>> {
    let words: HashSet<String> = value
        .split(',')
        .map(|word| word.trim().to_lowercase())
        .filter(|word| !word.is_empty())
        .collect();

    if words.is_empty() {
        None
    } else {
        Some(words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlaybookConfig::default();
        assert_eq!(config.search, SearchType::Keyword);
        assert_eq!(config.storage, StorageType::Memory);
        assert!(config.stop_words.is_none());
        assert!(config.playbook_dirs.is_empty());
    }

    #[test]
    fn test_parse_stop_words() {
        let words = parse_stop_words(" How, what ,when,,").unwrap();
        assert_eq!(words.len(), 3);
        assert!(words.contains("how"));
        assert!(parse_stop_words(" , ").is_none());
    }

    #[tokio::test]
    async fn test_build_service() {
        let service = PlaybookConfig::default()
            .with_search(SearchType::Simple)
            .build_service();
        assert_eq!(service.list_playbooks().await.unwrap().len(), 0);
    }
}
