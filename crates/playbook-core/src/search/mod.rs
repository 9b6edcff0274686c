//! Search module - pluggable lexical scoring and ranking
//!
//! This module provides:
//! - The [`SearchProvider`] trait every scoring strategy implements
//! - Substring matching ([`SimpleSearch`])
//! - Keyword matching with stop-word filtering ([`KeywordSearch`])
//! - The ranking engine shared by all strategies ([`rank`])
//! - [`SearchType`], the closed set of built-in strategies

pub mod keyword;
pub mod ranking;
pub mod simple;

pub use keyword::{KeywordSearch, DEFAULT_STOP_WORDS};
pub use ranking::rank;
pub use simple::SimpleSearch;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::document::Playbook;
use crate::error::PlaybookError;

// Per-field weights for a matched term
pub const TITLE_WEIGHT: f32 = 0.5;
pub const TAG_WEIGHT: f32 = 0.3;
pub const DESCRIPTION_WEIGHT: f32 = 0.2;
pub const CONTENT_WEIGHT: f32 = 0.1;

/// A scoring strategy for ranking playbooks against a free-text query.
///
/// Implementations must be pure: the same playbook and query always give
/// the same result, and the playbook is never modified. The returned score
/// lies in `[0.0, 1.0]` and `matches` is true exactly when the score is
/// positive.
pub trait SearchProvider: Send + Sync + fmt::Debug {
    /// Score a playbook against a query, returning `(matches, score)`
    fn score(&self, playbook: &Playbook, query: &str) -> (bool, f32);

    /// Short name used in logs and stats
    fn name(&self) -> &'static str;
}

/// Lower-cased copies of the searchable fields of one playbook
pub(crate) struct FieldText {
    title: String,
    description: String,
    content: String,
    tags: Vec<String>,
}

impl FieldText {
    pub(crate) fn new(playbook: &Playbook) -> Self {
        Self {
            title: playbook.metadata.title.to_lowercase(),
            description: playbook.metadata.description.to_lowercase(),
            content: playbook.content.to_lowercase(),
            tags: playbook
                .metadata
                .tags
                .iter()
                .map(|tag| tag.to_lowercase())
                .collect(),
        }
    }

    /// Weighted score for a single lower-cased term. At most one tag counts.
    pub(crate) fn term_score(&self, term: &str) -> f32 {
        let mut score = 0.0;

        if self.title.contains(term) {
            score += TITLE_WEIGHT;
        }
        if self.tags.iter().any(|tag| tag.contains(term)) {
            score += TAG_WEIGHT;
        }
        if self.description.contains(term) {
            score += DESCRIPTION_WEIGHT;
        }
        if self.content.contains(term) {
            score += CONTENT_WEIGHT;
        }

        score
    }
}

/// Clamp a raw score into `[0, 1]` and derive the match flag from it
pub(crate) fn finish_score(raw: f32) -> (bool, f32) {
    let score = raw.clamp(0.0, 1.0);
    (score > 0.0, score)
}

/// Built-in search strategies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    /// Keyword matching with stop-word filtering, suited to natural language
    #[default]
    Keyword,
    /// Whole-query substring matching
    Simple,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Keyword => "keyword",
            SearchType::Simple => "simple",
        }
    }

    /// Build the provider for this strategy.
    ///
    /// `stop_words` replaces the default stop-word set of the keyword
    /// strategy and is ignored by the simple strategy.
    pub fn create(self, stop_words: Option<HashSet<String>>) -> Arc<dyn SearchProvider> {
        match self {
            SearchType::Keyword => match stop_words {
                Some(words) => Arc::new(KeywordSearch::with_stop_words(words)),
                None => Arc::new(KeywordSearch::new()),
            },
            SearchType::Simple => {
                if stop_words.is_some() {
                    tracing::debug!("Stop words are ignored by the simple search strategy");
                }
                Arc::new(SimpleSearch)
            }
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchType {
    type Err = PlaybookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "keyword" => Ok(SearchType::Keyword),
            "simple" => Ok(SearchType::Simple),
            _ => Err(PlaybookError::UnsupportedSearchType(s.to_string())),
        }
    }
}
