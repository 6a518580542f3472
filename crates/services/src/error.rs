//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use vocab_core::model::{ListId, WordError, WordId, WordListError};

/// Errors emitted by `VocabularyService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VocabularyServiceError {
    #[error("word list {0} not found")]
    ListNotFound(ListId),
    #[error("word {word} not found in list {list}")]
    WordNotFound { list: ListId, word: WordId },
    #[error(transparent)]
    Word(#[from] WordError),
    #[error(transparent)]
    WordList(#[from] WordListError),
    #[error("stored value under {key} is not readable")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode stored value: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `DictationService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DictationServiceError {
    #[error("cannot start a dictation on an empty list")]
    EmptyList,
    #[error("no built-in list named {0:?}")]
    UnknownCatalogList(String),
    #[error(transparent)]
    Vocabulary(#[from] VocabularyServiceError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
