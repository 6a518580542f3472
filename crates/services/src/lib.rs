#![forbid(unsafe_code)]

pub mod app_services;
pub mod dictation_service;
pub mod error;
pub mod practice_session;
pub mod practice_timer;
pub mod search_service;
pub mod ticker;
pub mod useful_words;
pub mod vocabulary_service;

pub use vocab_core::Clock;

pub use app_services::AppServices;
pub use dictation_service::{DictationOrder, DictationPrompt, DictationRound, DictationService};
pub use error::{AppServicesError, DictationServiceError, VocabularyServiceError};
pub use practice_session::PracticeSession;
pub use practice_timer::{DailyPracticeTimer, PracticeEvent};
pub use search_service::SearchService;
pub use ticker::{TickFuture, TickHandle, TickScheduler, TickTask, TokioScheduler};
pub use useful_words::{UsefulWordList, UsefulWordsCatalog};
pub use vocabulary_service::VocabularyService;
