//! Simple substring-based search

use super::{finish_score, FieldText, SearchProvider};
use crate::document::Playbook;

/// Case-insensitive substring matching of the whole query.
///
/// The query is not tokenized: "sunset times" only matches fields that
/// contain that exact phrase. A blank query matches nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleSearch;

impl SearchProvider for SimpleSearch {
    fn score(&self, playbook: &Playbook, query: &str) -> (bool, f32) {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return (false, 0.0);
        }
        let fields = FieldText::new(playbook);
        finish_score(fields.term_score(&query))
    }

    fn name(&self) -> &'static str {
        "simple"
    }
}
