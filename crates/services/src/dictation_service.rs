use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use vocab_core::model::{Direction, DictationResult, ListId, Word, WordId, check_answers};

use crate::error::DictationServiceError;
use crate::useful_words::UsefulWordsCatalog;
use crate::vocabulary_service::VocabularyService;

/// Order in which a round presents its words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DictationOrder {
    #[default]
    ListOrder,
    Shuffled,
}

/// A prompt shown to the learner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictationPrompt {
    pub word_id: WordId,
    pub text: String,
}

/// A dictation over one list, ready to be answered and checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictationRound {
    source: String,
    direction: Direction,
    words: Vec<Word>,
}

impl DictationRound {
    /// # Errors
    ///
    /// Returns `DictationServiceError::EmptyList` when `words` is empty.
    pub fn new(
        source: impl Into<String>,
        direction: Direction,
        words: Vec<Word>,
    ) -> Result<Self, DictationServiceError> {
        if words.is_empty() {
            return Err(DictationServiceError::EmptyList);
        }
        Ok(Self {
            source: source.into(),
            direction,
            words,
        })
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    #[must_use]
    pub fn prompts(&self) -> Vec<DictationPrompt> {
        self.words
            .iter()
            .map(|word| DictationPrompt {
                word_id: word.id(),
                text: self.direction.prompt(word).to_owned(),
            })
            .collect()
    }

    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.words.shuffle(rng);
    }

    #[must_use]
    pub fn check(&self, answers: &HashMap<WordId, String>) -> DictationResult {
        let result = check_answers(&self.words, answers, self.direction);
        debug!(
            source = %self.source,
            correct = result.correct,
            total = result.total,
            "dictation checked"
        );
        result
    }
}

/// Builds dictation rounds from user lists or the built-in catalog.
#[derive(Clone)]
pub struct DictationService {
    catalog: Arc<UsefulWordsCatalog>,
    vocabulary: Arc<VocabularyService>,
}

impl DictationService {
    #[must_use]
    pub fn new(catalog: Arc<UsefulWordsCatalog>, vocabulary: Arc<VocabularyService>) -> Self {
        Self {
            catalog,
            vocabulary,
        }
    }

    /// # Errors
    ///
    /// Returns `EmptyList` for a list without words, or vocabulary errors.
    pub async fn start_for_list(
        &self,
        list_id: ListId,
        direction: Direction,
        order: DictationOrder,
    ) -> Result<DictationRound, DictationServiceError> {
        let list = self.vocabulary.list(list_id).await?;
        let words = self.vocabulary.words(list_id).await?;
        let round = DictationRound::new(list.name(), direction, words)?;
        Ok(arrange(round, order))
    }

    /// # Errors
    ///
    /// Returns `UnknownCatalogList` for an unknown slug.
    pub fn start_for_catalog(
        &self,
        slug: &str,
        direction: Direction,
        order: DictationOrder,
    ) -> Result<DictationRound, DictationServiceError> {
        let list = self
            .catalog
            .get(slug)
            .ok_or_else(|| DictationServiceError::UnknownCatalogList(slug.to_owned()))?;
        let round = DictationRound::new(list.name(), direction, list.words().to_vec())?;
        Ok(arrange(round, order))
    }
}

fn arrange(mut round: DictationRound, order: DictationOrder) -> DictationRound {
    if order == DictationOrder::Shuffled {
        round.shuffle_with(&mut rand::rng());
    }
    round
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use storage::repository::InMemoryStore;
    use vocab_core::model::{Encouragement, WordDraft};

    fn service() -> DictationService {
        DictationService::new(
            Arc::new(UsefulWordsCatalog::builtin()),
            Arc::new(VocabularyService::new(Arc::new(InMemoryStore::new()))),
        )
    }

    #[test]
    fn catalog_round_in_list_order() {
        let round = service()
            .start_for_catalog("greetings", Direction::OriginalToTranslation, DictationOrder::ListOrder)
            .unwrap();
        assert_eq!(round.source(), "Greetings");
        assert_eq!(round.len(), 6);
        assert_eq!(round.prompts()[0].text, "hello");
    }

    #[test]
    fn unknown_catalog_slug_is_rejected() {
        let err = service()
            .start_for_catalog("nope", Direction::default(), DictationOrder::ListOrder)
            .unwrap_err();
        assert!(matches!(err, DictationServiceError::UnknownCatalogList(slug) if slug == "nope"));
    }

    #[test]
    fn empty_round_is_rejected() {
        let err = DictationRound::new("Empty", Direction::default(), Vec::new()).unwrap_err();
        assert!(matches!(err, DictationServiceError::EmptyList));
    }

    #[test]
    fn shuffle_keeps_every_word() {
        let mut round = service()
            .start_for_catalog("food", Direction::default(), DictationOrder::ListOrder)
            .unwrap();
        let mut before: Vec<WordId> = round.prompts().iter().map(|p| p.word_id).collect();
        round.shuffle_with(&mut StdRng::seed_from_u64(7));
        let mut after: Vec<WordId> = round.prompts().iter().map(|p| p.word_id).collect();
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn user_list_round_grades_answers() {
        let vocabulary = Arc::new(VocabularyService::new(Arc::new(InMemoryStore::new())));
        let list = vocabulary.create_list("Animals").await.unwrap();
        let dog = vocabulary
            .add_word(list.id(), WordDraft::new("dog", "kelev"))
            .await
            .unwrap();
        vocabulary
            .add_word(list.id(), WordDraft::new("cat", "chatul"))
            .await
            .unwrap();

        let svc = DictationService::new(Arc::new(UsefulWordsCatalog::builtin()), vocabulary);
        let round = svc
            .start_for_list(list.id(), Direction::TranslationToOriginal, DictationOrder::ListOrder)
            .await
            .unwrap();
        assert_eq!(round.prompts()[0].text, "kelev");

        let mut answers = HashMap::new();
        answers.insert(dog.id(), " DOG ".to_string());
        let result = round.check(&answers);
        assert_eq!(result.correct, 1);
        assert_eq!(result.total, 2);
        assert_eq!(result.encouragement(), Encouragement::Good);
    }

    #[tokio::test]
    async fn empty_user_list_cannot_start() {
        let vocabulary = Arc::new(VocabularyService::new(Arc::new(InMemoryStore::new())));
        let list = vocabulary.create_list("Later").await.unwrap();
        let svc = DictationService::new(Arc::new(UsefulWordsCatalog::builtin()), vocabulary);
        let err = svc
            .start_for_list(list.id(), Direction::default(), DictationOrder::Shuffled)
            .await
            .unwrap_err();
        assert!(matches!(err, DictationServiceError::EmptyList));
    }
}
