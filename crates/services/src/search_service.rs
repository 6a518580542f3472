use std::sync::Arc;

use vocab_core::search::{SearchQuery, WordHit, filter_hits};

use crate::error::VocabularyServiceError;
use crate::useful_words::UsefulWordsCatalog;
use crate::vocabulary_service::VocabularyService;

/// Looks words up across the built-in catalog and every user list.
#[derive(Clone)]
pub struct SearchService {
    catalog: Arc<UsefulWordsCatalog>,
    vocabulary: Arc<VocabularyService>,
}

impl SearchService {
    #[must_use]
    pub fn new(catalog: Arc<UsefulWordsCatalog>, vocabulary: Arc<VocabularyService>) -> Self {
        Self {
            catalog,
            vocabulary,
        }
    }

    /// Every searchable word, catalog first, tagged with its list name.
    ///
    /// # Errors
    ///
    /// Returns `VocabularyServiceError` on storage failures.
    pub async fn all_words(&self) -> Result<Vec<WordHit>, VocabularyServiceError> {
        let mut hits: Vec<WordHit> = self
            .catalog
            .lists()
            .iter()
            .flat_map(|list| {
                list.words().iter().map(|word| WordHit {
                    word: word.clone(),
                    source: list.name().to_owned(),
                })
            })
            .collect();

        for list in self.vocabulary.lists().await? {
            let words = self.vocabulary.words(list.id()).await?;
            hits.extend(words.into_iter().map(|word| WordHit {
                word,
                source: list.name().to_owned(),
            }));
        }

        Ok(hits)
    }

    /// Case-insensitive substring search. A blank query returns nothing.
    ///
    /// # Errors
    ///
    /// Returns `VocabularyServiceError` on storage failures.
    pub async fn search(&self, raw_query: &str) -> Result<Vec<WordHit>, VocabularyServiceError> {
        let query = SearchQuery::new(raw_query);
        if query.is_blank() {
            return Ok(Vec::new());
        }
        Ok(filter_hits(&query, self.all_words().await?))
    }
}
