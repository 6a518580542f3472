//! Word lookup across every list the user can see.

use crate::model::Word;

/// A word together with the name of the list it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordHit {
    pub word: Word,
    pub source: String,
}

/// Normalized search query. Blank input matches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    needle: Option<String>,
}

impl SearchQuery {
    #[must_use]
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        let needle = (!trimmed.is_empty()).then(|| raw.to_lowercase());
        Self { needle }
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.needle.is_none()
    }

    /// Case-insensitive substring match on either side of the word.
    #[must_use]
    pub fn matches(&self, word: &Word) -> bool {
        let Some(needle) = self.needle.as_deref() else {
            return false;
        };
        word.original().to_lowercase().contains(needle)
            || word.translation().to_lowercase().contains(needle)
    }
}

/// Keeps the hits that match, preserving input order.
#[must_use]
pub fn filter_hits(query: &SearchQuery, hits: impl IntoIterator<Item = WordHit>) -> Vec<WordHit> {
    if query.is_blank() {
        return Vec::new();
    }
    hits.into_iter().filter(|hit| query.matches(&hit.word)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{WordDraft, WordId};

    fn hit(id: u64, original: &str, translation: &str, source: &str) -> WordHit {
        WordHit {
            word: WordDraft::new(original, translation)
                .validate(WordId::new(id))
                .unwrap(),
            source: source.to_string(),
        }
    }

    fn corpus() -> Vec<WordHit> {
        vec![
            hit(1, "Apple", "tapuach", "Food"),
            hit(2, "pineapple", "ananas", "Food"),
            hit(3, "table", "shulchan", "Home"),
        ]
    }

    #[test]
    fn blank_query_matches_nothing() {
        assert!(filter_hits(&SearchQuery::new("   "), corpus()).is_empty());
        assert!(filter_hits(&SearchQuery::new(""), corpus()).is_empty());
    }

    #[test]
    fn matches_either_side_ignoring_case() {
        let found = filter_hits(&SearchQuery::new("APPLE"), corpus());
        assert_eq!(
            found.iter().map(|h| h.word.id()).collect::<Vec<_>>(),
            vec![WordId::new(1), WordId::new(2)]
        );

        let found = filter_hits(&SearchQuery::new("shul"), corpus());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].source, "Home");
    }

    #[test]
    fn untrimmed_query_keeps_inner_spaces() {
        assert!(filter_hits(&SearchQuery::new("apple "), corpus()).is_empty());
    }
}
