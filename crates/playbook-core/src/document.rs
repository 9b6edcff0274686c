use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PlaybookError, Result};

/// Default number of results returned by a query
pub const DEFAULT_TOP_K: usize = 3;

/// Largest `top_k` a [`PlaybookQuery`] accepts
pub const MAX_TOP_K: usize = 10;

/// Metadata for a playbook. `title` is the identity within a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybookMetadata {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A markdown procedure plus its metadata
///
/// Playbooks are never edited in place. Storing a playbook whose title is
/// already present replaces the old one wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playbook {
    pub metadata: PlaybookMetadata,
    pub content: String,
}

impl Playbook {
    /// Create a playbook with no tags or author, timestamped now
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            metadata: PlaybookMetadata {
                title: title.into(),
                description: description.into(),
                tags: Vec::new(),
                author: None,
                created_at: now,
                updated_at: now,
            },
            content: content.into(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.metadata.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.metadata.author = author;
        self
    }

    pub fn title(&self) -> &str {
        &self.metadata.title
    }

    pub fn tags(&self) -> &[String] {
        &self.metadata.tags
    }

    /// True when at least one of `filter` is among this playbook's tags
    pub fn has_any_tag(&self, filter: &[String]) -> bool {
        filter.iter().any(|tag| self.metadata.tags.contains(tag))
    }
}

/// Query parameters for searching playbooks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybookQuery {
    pub question: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

impl PlaybookQuery {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            top_k: DEFAULT_TOP_K,
            tags: None,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Check `top_k` is within `1..=MAX_TOP_K`
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 || self.top_k > MAX_TOP_K {
            return Err(PlaybookError::InvalidQuery(format!(
                "top_k must be between 1 and {}, got {}",
                MAX_TOP_K, self.top_k
            )));
        }
        Ok(())
    }
}
