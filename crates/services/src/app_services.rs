use std::sync::Arc;

use storage::repository::{KeyValueStore, Storage};

use crate::Clock;
use crate::dictation_service::DictationService;
use crate::error::AppServicesError;
use crate::practice_session::PracticeSession;
use crate::practice_timer::DailyPracticeTimer;
use crate::search_service::SearchService;
use crate::ticker::TickScheduler;
use crate::useful_words::UsefulWordsCatalog;
use crate::vocabulary_service::VocabularyService;

/// Assembles app-facing services over one key/value store.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    store: Arc<dyn KeyValueStore>,
    catalog: Arc<UsefulWordsCatalog>,
    vocabulary: Arc<VocabularyService>,
    search: Arc<SearchService>,
    dictation: Arc<DictationService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock))
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), clock)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock) -> Self {
        let store = Arc::clone(&storage.kv);
        let catalog = Arc::new(UsefulWordsCatalog::builtin());
        let vocabulary = Arc::new(VocabularyService::new(Arc::clone(&store)));
        let search = Arc::new(SearchService::new(
            Arc::clone(&catalog),
            Arc::clone(&vocabulary),
        ));
        let dictation = Arc::new(DictationService::new(
            Arc::clone(&catalog),
            Arc::clone(&vocabulary),
        ));

        Self {
            clock,
            store,
            catalog,
            vocabulary,
            search,
            dictation,
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<UsefulWordsCatalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn vocabulary(&self) -> Arc<VocabularyService> {
        Arc::clone(&self.vocabulary)
    }

    #[must_use]
    pub fn search(&self) -> Arc<SearchService> {
        Arc::clone(&self.search)
    }

    #[must_use]
    pub fn dictation(&self) -> Arc<DictationService> {
        Arc::clone(&self.dictation)
    }

    /// Load today's practice timer without starting it.
    pub async fn practice_timer(&self) -> DailyPracticeTimer {
        DailyPracticeTimer::initialize(self.clock, Arc::clone(&self.store)).await
    }

    /// Load today's practice timer and start ticking it.
    pub async fn start_practice(&self, scheduler: &dyn TickScheduler) -> PracticeSession {
        PracticeSession::start(self.practice_timer().await, scheduler)
    }
}
