//! Keyword-based search with stop-word filtering

use std::collections::HashSet;

use super::{finish_score, FieldText, SearchProvider};
use crate::document::Playbook;

/// Common English function words dropped from natural-language queries
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "how", "do", "i", "get", "the", "a", "an", "is", "are", "what", "show", "me", "about", "can",
    "you", "tell", "find", "to", "for",
];

/// Tokens this short never count as keywords
const MIN_KEYWORD_CHARS: usize = 3;

/// Keyword search provider
///
/// The query is lower-cased and split on whitespace. Stop words and tokens
/// shorter than three characters are dropped; if nothing survives, the
/// unfiltered tokens are used instead. Every keyword is scored on its own
/// with the shared field weights and the total is divided by the number of
/// keywords, so a playbook matching a larger share of the query ranks higher.
#[derive(Debug, Clone)]
pub struct KeywordSearch {
    stop_words: HashSet<String>,
}

impl KeywordSearch {
    /// Keyword search with [`DEFAULT_STOP_WORDS`]
    pub fn new() -> Self {
        Self::with_stop_words(DEFAULT_STOP_WORDS.iter().copied())
    }

    /// Keyword search with a custom stop-word set replacing the defaults.
    /// An empty set keeps [`DEFAULT_STOP_WORDS`].
    pub fn with_stop_words<I, S>(stop_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words: HashSet<String> = stop_words
            .into_iter()
            .map(|word| word.as_ref().to_lowercase())
            .collect();

        if words.is_empty() {
            words = DEFAULT_STOP_WORDS.iter().map(|word| word.to_string()).collect();
        }

        Self { stop_words: words }
    }

    pub fn stop_words(&self) -> &HashSet<String> {
        &self.stop_words
    }

    /// Extract the keywords scored for `query`
    pub fn extract_keywords(&self, query: &str) -> Vec<String> {
        let tokens: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .map(|token| token.trim_matches(|c: char| c.is_ascii_punctuation()))
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect();

        let keywords: Vec<String> = tokens
            .iter()
            .filter(|token| {
                !self.stop_words.contains(token.as_str())
                    && token.chars().count() >= MIN_KEYWORD_CHARS
            })
            .cloned()
            .collect();

        if keywords.is_empty() {
            tokens
        } else {
            keywords
        }
    }
}

impl Default for KeywordSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchProvider for KeywordSearch {
    fn score(&self, playbook: &Playbook, query: &str) -> (bool, f32) {
        let keywords = self.extract_keywords(query);
        if keywords.is_empty() {
            return (false, 0.0);
        }

        let fields = FieldText::new(playbook);
        let total: f32 = keywords
            .iter()
            .map(|keyword| fields.term_score(keyword))
            .sum();

        finish_score(total / keywords.len() as f32)
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sunset() -> Playbook {
        Playbook::new(
            "Get Sunset and Sunrise Times",
            "Retrieve sunset and sunrise times for a location",
            "# Sunset\n\nCall the weather tool.",
        )
        .with_tags(["weather", "sunset"])
    }

    #[test]
    fn test_extract_keywords_drops_stop_words() {
        let search = KeywordSearch::new();
        assert_eq!(
            search.extract_keywords("How do I get sunset times?"),
            vec!["sunset", "times"]
        );
    }

    #[test]
    fn test_extract_keywords_falls_back_to_all_tokens() {
        let search = KeywordSearch::new();
        assert_eq!(
            search.extract_keywords("how do I"),
            vec!["how", "do", "i"]
        );
    }

    #[test]
    fn test_extract_keywords_empty_query() {
        let search = KeywordSearch::new();
        assert!(search.extract_keywords("").is_empty());
        assert!(search.extract_keywords("  ?! ").is_empty());
        assert_eq!(search.score(&sunset(), ""), (false, 0.0));
    }

    #[test]
    fn test_custom_stop_words_replace_defaults() {
        let search = KeywordSearch::with_stop_words(["How", "what", "when"]);
        assert!(search.stop_words().contains("how"));
        assert!(!search.stop_words().contains("the"));
        assert_eq!(
            search.extract_keywords("how do I get the forecast"),
            vec!["get", "the", "forecast"]
        );
    }

    #[test]
    fn test_empty_custom_stop_words_keep_defaults() {
        let search = KeywordSearch::with_stop_words(Vec::<String>::new());
        assert_eq!(search.stop_words(), KeywordSearch::new().stop_words());
        assert_eq!(
            search.extract_keywords("how do I get the forecast"),
            vec!["forecast"]
        );
    }

    #[test]
    fn test_natural_language_query_matches() {
        let (matches, score) = KeywordSearch::new().score(&sunset(), "How do I get sunset times?");
        assert!(matches);
        // sunset: title, tag, description, content = 1.1; times: title, description = 0.7
        assert!((score - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_score_is_normalized_by_keyword_count() {
        let search = KeywordSearch::new();
        let (_, single) = search.score(&sunset(), "sunrise");
        let (_, diluted) = search.score(&sunset(), "sunrise database");
        assert!((single - 0.7).abs() < 1e-6);
        assert!((diluted - 0.35).abs() < 1e-6);
    }

    #[test]
    fn test_unrelated_query() {
        assert_eq!(KeywordSearch::new().score(&sunset(), "database"), (false, 0.0));
    }
}
