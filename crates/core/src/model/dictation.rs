use std::collections::HashMap;

use crate::model::ids::WordId;
use crate::model::word::Word;

/// Which side of a word is shown; the learner types the other one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Show the original, answer with the translation.
    #[default]
    OriginalToTranslation,
    /// Show the translation, answer with the original.
    TranslationToOriginal,
}

impl Direction {
    #[must_use]
    pub fn prompt<'a>(self, word: &'a Word) -> &'a str {
        match self {
            Self::OriginalToTranslation => word.original(),
            Self::TranslationToOriginal => word.translation(),
        }
    }

    #[must_use]
    pub fn expected<'a>(self, word: &'a Word) -> &'a str {
        match self {
            Self::OriginalToTranslation => word.translation(),
            Self::TranslationToOriginal => word.original(),
        }
    }
}

/// One graded answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictationAnswer {
    pub word_id: WordId,
    pub user_answer: String,
    pub expected: String,
    pub is_correct: bool,
}

/// Feedback band for a finished dictation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encouragement {
    Excellent,
    Great,
    Good,
    KeepPracticing,
}

impl Encouragement {
    #[must_use]
    pub fn for_percentage(percentage: f64) -> Self {
        if percentage >= 90.0 {
            Self::Excellent
        } else if percentage >= 70.0 {
            Self::Great
        } else if percentage >= 50.0 {
            Self::Good
        } else {
            Self::KeepPracticing
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent! Keep it up!",
            Self::Great => "Very nice, you are on the right track!",
            Self::Good => "Not bad, keep practicing!",
            Self::KeepPracticing => "No worries, a little more practice and you will improve!",
        }
    }
}

/// Outcome of checking a whole dictation.
#[derive(Debug, Clone, PartialEq)]
pub struct DictationResult {
    pub answers: Vec<DictationAnswer>,
    pub correct: usize,
    pub total: usize,
}

impl DictationResult {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total as f64 * 100.0
    }

    #[must_use]
    pub fn encouragement(&self) -> Encouragement {
        Encouragement::for_percentage(self.percentage())
    }
}

/// Trimmed, case-insensitive comparison.
#[must_use]
pub fn answer_matches(user_answer: &str, expected: &str) -> bool {
    user_answer.trim().to_lowercase() == expected.trim().to_lowercase()
}

/// Grades every word in order. Words without an answer count as wrong.
#[must_use]
pub fn check_answers(
    words: &[Word],
    answers: &HashMap<WordId, String>,
    direction: Direction,
) -> DictationResult {
    let graded: Vec<DictationAnswer> = words
        .iter()
        .map(|word| {
            let user_answer = answers
                .get(&word.id())
                .map(|raw| raw.trim().to_owned())
                .unwrap_or_default();
            let expected = direction.expected(word);
            DictationAnswer {
                word_id: word.id(),
                is_correct: answer_matches(&user_answer, expected),
                user_answer,
                expected: expected.to_owned(),
            }
        })
        .collect();

    let correct = graded.iter().filter(|a| a.is_correct).count();
    DictationResult {
        total: graded.len(),
        correct,
        answers: graded,
    }
}
