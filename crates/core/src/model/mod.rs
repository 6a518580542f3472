mod dictation;
mod ids;
mod practice;
mod word;

pub use ids::{ListId, ParseIdError, WordId};

pub use dictation::{
    Direction, DictationAnswer, DictationResult, Encouragement, answer_matches, check_answers,
};
pub use practice::{
    DailyPracticeState, DailyProgress, GoalMinutes, GoalMinutesError, PersistedPractice,
    PracticeField, RestoredPractice, TickOutcome, format_elapsed,
};
pub use word::{Word, WordDraft, WordError, WordList, WordListError};
