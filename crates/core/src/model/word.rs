use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{ListId, WordId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WordError {
    #[error("original word cannot be empty")]
    EmptyOriginal,

    #[error("translation cannot be empty")]
    EmptyTranslation,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WordListError {
    #[error("list name cannot be empty")]
    EmptyName,
}

//
// ─── WORD ──────────────────────────────────────────────────────────────────────
//

/// A word and its translation.
///
/// The serialized shape is the one stored under `vocabularyWords_{list}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    id: WordId,
    original: String,
    translation: String,
}

/// Unvalidated input for a new word.
#[derive(Debug, Clone, Default)]
pub struct WordDraft {
    pub original: String,
    pub translation: String,
}

impl WordDraft {
    #[must_use]
    pub fn new(original: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            translation: translation.into(),
        }
    }

    /// Trim both sides and reject blanks.
    ///
    /// # Errors
    ///
    /// Returns `WordError` if either side is empty after trimming.
    pub fn validate(self, id: WordId) -> Result<Word, WordError> {
        let original = self.original.trim();
        if original.is_empty() {
            return Err(WordError::EmptyOriginal);
        }
        let translation = self.translation.trim();
        if translation.is_empty() {
            return Err(WordError::EmptyTranslation);
        }
        Ok(Word {
            id,
            original: original.to_owned(),
            translation: translation.to_owned(),
        })
    }
}

impl Word {
    #[must_use]
    pub fn id(&self) -> WordId {
        self.id
    }

    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    #[must_use]
    pub fn translation(&self) -> &str {
        &self.translation
    }
}

//
// ─── LIST ──────────────────────────────────────────────────────────────────────
//

/// A named, user-owned collection of words.
///
/// Only the header lives here; words are stored per list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordList {
    id: ListId,
    name: String,
}

impl WordList {
    /// # Errors
    ///
    /// Returns `WordListError::EmptyName` if the trimmed name is empty.
    pub fn new(id: ListId, name: impl AsRef<str>) -> Result<Self, WordListError> {
        Ok(Self {
            id,
            name: normalize_name(name.as_ref())?,
        })
    }

    #[must_use]
    pub fn id(&self) -> ListId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// # Errors
    ///
    /// Returns `WordListError::EmptyName` if the trimmed name is empty.
    pub fn rename(&mut self, name: impl AsRef<str>) -> Result<(), WordListError> {
        self.name = normalize_name(name.as_ref())?;
        Ok(())
    }
}

fn normalize_name(raw: &str) -> Result<String, WordListError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(WordListError::EmptyName);
    }
    Ok(trimmed.to_owned())
}
