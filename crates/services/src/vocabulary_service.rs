use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use storage::repository::{KeyValueStore, keys};
use vocab_core::model::{ListId, Word, WordDraft, WordId, WordList};

use crate::error::VocabularyServiceError;

/// User word lists kept as JSON arrays in the key/value store.
///
/// List headers live under `vocabularyLists`; each list's words live under
/// `vocabularyWords_{id}`. Reads tolerate unreadable JSON as an empty
/// collection; writes refuse to touch it so nothing stored is overwritten.
#[derive(Clone)]
pub struct VocabularyService {
    store: Arc<dyn KeyValueStore>,
}

impl VocabularyService {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// # Errors
    ///
    /// Returns `VocabularyServiceError::Storage` on storage failures.
    pub async fn lists(&self) -> Result<Vec<WordList>, VocabularyServiceError> {
        self.load_lenient(keys::VOCABULARY_LISTS).await
    }

    /// # Errors
    ///
    /// Returns `ListNotFound` if no list has this id.
    pub async fn list(&self, id: ListId) -> Result<WordList, VocabularyServiceError> {
        self.lists()
            .await?
            .into_iter()
            .find(|list| list.id() == id)
            .ok_or(VocabularyServiceError::ListNotFound(id))
    }

    /// Create an empty list.
    ///
    /// # Errors
    ///
    /// Returns `WordList` if the name is blank, `Corrupt` if the stored lists
    /// cannot be read, or storage errors.
    pub async fn create_list(&self, name: &str) -> Result<WordList, VocabularyServiceError> {
        let mut lists: Vec<WordList> = self.load_strict(keys::VOCABULARY_LISTS).await?;
        let next = lists.iter().map(|l| l.id().value()).max().unwrap_or(0) + 1;
        let list = WordList::new(ListId::new(next), name)?;
        lists.push(list.clone());
        self.save(keys::VOCABULARY_LISTS, &lists).await?;
        debug!(list_id = %list.id(), name = list.name(), "created word list");
        Ok(list)
    }

    /// # Errors
    ///
    /// Returns `ListNotFound`, `WordList` for a blank name, `Corrupt`, or
    /// storage errors.
    pub async fn rename_list(
        &self,
        id: ListId,
        name: &str,
    ) -> Result<WordList, VocabularyServiceError> {
        let mut lists: Vec<WordList> = self.load_strict(keys::VOCABULARY_LISTS).await?;
        let list = lists
            .iter_mut()
            .find(|list| list.id() == id)
            .ok_or(VocabularyServiceError::ListNotFound(id))?;
        list.rename(name)?;
        let renamed = list.clone();
        self.save(keys::VOCABULARY_LISTS, &lists).await?;
        debug!(list_id = %id, name = renamed.name(), "renamed word list");
        Ok(renamed)
    }

    /// Delete a list together with its words.
    ///
    /// # Errors
    ///
    /// Returns `ListNotFound`, `Corrupt`, or storage errors.
    pub async fn delete_list(&self, id: ListId) -> Result<(), VocabularyServiceError> {
        let mut lists: Vec<WordList> = self.load_strict(keys::VOCABULARY_LISTS).await?;
        let before = lists.len();
        lists.retain(|list| list.id() != id);
        if lists.len() == before {
            return Err(VocabularyServiceError::ListNotFound(id));
        }
        self.save(keys::VOCABULARY_LISTS, &lists).await?;
        self.store.remove(&keys::vocabulary_words(id)).await?;
        debug!(list_id = %id, "deleted word list");
        Ok(())
    }

    /// Words of a list in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `ListNotFound` or storage errors.
    pub async fn words(&self, list_id: ListId) -> Result<Vec<Word>, VocabularyServiceError> {
        self.list(list_id).await?;
        self.load_lenient(&keys::vocabulary_words(list_id)).await
    }

    /// Append a word to a list.
    ///
    /// # Errors
    ///
    /// Returns `ListNotFound`, `Word` for blank input, `Corrupt`, or storage
    /// errors.
    pub async fn add_word(
        &self,
        list_id: ListId,
        draft: WordDraft,
    ) -> Result<Word, VocabularyServiceError> {
        self.list(list_id).await?;
        let mut words: Vec<Word> = self.load_strict(&keys::vocabulary_words(list_id)).await?;
        let next = words.iter().map(|w| w.id().value()).max().unwrap_or(0) + 1;
        let word = draft.validate(WordId::new(next))?;
        words.push(word.clone());
        self.save(&keys::vocabulary_words(list_id), &words).await?;
        Ok(word)
    }

    /// # Errors
    ///
    /// Returns `ListNotFound`, `WordNotFound`, `Corrupt`, or storage errors.
    pub async fn delete_word(
        &self,
        list_id: ListId,
        word_id: WordId,
    ) -> Result<(), VocabularyServiceError> {
        self.list(list_id).await?;
        let mut words: Vec<Word> = self.load_strict(&keys::vocabulary_words(list_id)).await?;
        let before = words.len();
        words.retain(|word| word.id() != word_id);
        if words.len() == before {
            return Err(VocabularyServiceError::WordNotFound {
                list: list_id,
                word: word_id,
            });
        }
        self.save(&keys::vocabulary_words(list_id), &words).await
    }

    async fn load_strict<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Vec<T>, VocabularyServiceError> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).map_err(|source| VocabularyServiceError::Corrupt {
            key: key.to_owned(),
            source,
        })
    }

    async fn load_lenient<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Vec<T>, VocabularyServiceError> {
        match self.load_strict(key).await {
            Err(VocabularyServiceError::Corrupt { source, .. }) => {
                warn!(key, error = %source, "stored value is not readable, treating as empty");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    async fn save<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), VocabularyServiceError> {
        let raw = serde_json::to_string(items)?;
        self.store.set(key, &raw).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryStore;

    fn service(store: &InMemoryStore) -> VocabularyService {
        VocabularyService::new(Arc::new(store.clone()))
    }

    #[tokio::test]
    async fn create_list_assigns_increasing_ids() {
        let store = InMemoryStore::new();
        let svc = service(&store);
        let first = svc.create_list("Food").await.unwrap();
        let second = svc.create_list("  Travel ").await.unwrap();
        assert_eq!(first.id(), ListId::new(1));
        assert_eq!(second.id(), ListId::new(2));
        assert_eq!(second.name(), "Travel");

        let raw = store.get(keys::VOCABULARY_LISTS).await.unwrap().unwrap();
        assert_eq!(raw, r#"[{"id":"1","name":"Food"},{"id":"2","name":"Travel"}]"#);
    }

    #[tokio::test]
    async fn blank_list_name_is_rejected() {
        let svc = service(&InMemoryStore::new());
        let err = svc.create_list("   ").await.unwrap_err();
        assert!(matches!(err, VocabularyServiceError::WordList(_)));
        assert!(svc.lists().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreadable_lists_are_never_overwritten() {
        let store = InMemoryStore::with_entries([(keys::VOCABULARY_LISTS, "{not json")]);
        let svc = service(&store);
        assert!(svc.lists().await.unwrap().is_empty());

        let err = svc.create_list("Fresh").await.unwrap_err();
        assert!(matches!(
            err,
            VocabularyServiceError::Corrupt { ref key, .. } if key == keys::VOCABULARY_LISTS
        ));
        assert!(svc.delete_list(ListId::new(1)).await.is_err());
        assert_eq!(
            store.get(keys::VOCABULARY_LISTS).await.unwrap().as_deref(),
            Some("{not json")
        );
    }

    #[tokio::test]
    async fn unreadable_words_are_never_overwritten() {
        let store = InMemoryStore::with_entries([
            (keys::VOCABULARY_LISTS, r#"[{"id":"4","name":"Food"}]"#),
            ("vocabularyWords_4", "[{\"id\":"),
        ]);
        let svc = service(&store);
        assert!(svc.words(ListId::new(4)).await.unwrap().is_empty());

        let err = svc
            .add_word(ListId::new(4), WordDraft::new("bread", "lechem"))
            .await
            .unwrap_err();
        assert!(matches!(err, VocabularyServiceError::Corrupt { .. }));
        assert_eq!(
            store.get("vocabularyWords_4").await.unwrap().as_deref(),
            Some("[{\"id\":")
        );
    }

    #[tokio::test]
    async fn browser_lists_with_string_ids_are_kept() {
        let store = InMemoryStore::with_entries([
            (keys::VOCABULARY_LISTS, r#"[{"id":"1700000000000","name":"Food"}]"#),
            (
                "vocabularyWords_1700000000000",
                r#"[{"id":"1700000000123","original":"bread","translation":"lechem"}]"#,
            ),
        ]);
        let svc = service(&store);
        let food = ListId::new(1_700_000_000_000);

        let lists = svc.lists().await.unwrap();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].id(), food);
        assert_eq!(svc.words(food).await.unwrap()[0].original(), "bread");

        let travel = svc.create_list("Travel").await.unwrap();
        assert_eq!(travel.id(), ListId::new(1_700_000_000_001));
        let word = svc
            .add_word(food, WordDraft::new("milk", "chalav"))
            .await
            .unwrap();
        assert_eq!(word.id(), WordId::new(1_700_000_000_124));

        assert_eq!(
            store.get(keys::VOCABULARY_LISTS).await.unwrap().as_deref(),
            Some(r#"[{"id":"1700000000000","name":"Food"},{"id":"1700000000001","name":"Travel"}]"#)
        );
        assert_eq!(svc.words(food).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn rename_list_updates_stored_name() {
        let store = InMemoryStore::new();
        let svc = service(&store);
        let list = svc.create_list("Fod").await.unwrap();

        let renamed = svc.rename_list(list.id(), "  Food ").await.unwrap();
        assert_eq!(renamed.id(), list.id());
        assert_eq!(renamed.name(), "Food");
        assert_eq!(
            store.get(keys::VOCABULARY_LISTS).await.unwrap().as_deref(),
            Some(r#"[{"id":"1","name":"Food"}]"#)
        );

        let err = svc.rename_list(list.id(), "   ").await.unwrap_err();
        assert!(matches!(err, VocabularyServiceError::WordList(_)));
        let err = svc.rename_list(ListId::new(9), "Travel").await.unwrap_err();
        assert!(matches!(err, VocabularyServiceError::ListNotFound(id) if id == ListId::new(9)));
        assert_eq!(svc.list(list.id()).await.unwrap().name(), "Food");
    }

    #[tokio::test]
    async fn words_require_existing_list() {
        let svc = service(&InMemoryStore::new());
        let err = svc
            .add_word(ListId::new(7), WordDraft::new("a", "b"))
            .await
            .unwrap_err();
        assert!(matches!(err, VocabularyServiceError::ListNotFound(id) if id == ListId::new(7)));
    }

    #[tokio::test]
    async fn delete_word_reports_missing() {
        let svc = service(&InMemoryStore::new());
        let list = svc.create_list("Food").await.unwrap();
        let word = svc
            .add_word(list.id(), WordDraft::new("bread", "lechem"))
            .await
            .unwrap();
        svc.delete_word(list.id(), word.id()).await.unwrap();
        let err = svc.delete_word(list.id(), word.id()).await.unwrap_err();
        assert!(matches!(err, VocabularyServiceError::WordNotFound { .. }));
    }
}
