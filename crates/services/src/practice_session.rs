use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, broadcast};
use tracing::info;

use vocab_core::model::{DailyProgress, GoalMinutes, GoalMinutesError};

use crate::practice_timer::{DailyPracticeTimer, PracticeEvent};
use crate::ticker::{TickFuture, TickHandle, TickScheduler};

/// One active practice view: an initialized timer ticking once per second.
///
/// Stopping or dropping the session stops the ticker after any tick in
/// progress. The persisted record stays as last written.
pub struct PracticeSession {
    timer: Arc<Mutex<DailyPracticeTimer>>,
    ticker: TickHandle,
}

impl PracticeSession {
    pub const TICK_PERIOD: Duration = Duration::from_secs(1);

    /// Start ticking `timer` through `scheduler`.
    #[must_use]
    pub fn start(timer: DailyPracticeTimer, scheduler: &dyn TickScheduler) -> Self {
        let progress = timer.progress();
        info!(
            elapsed_seconds = progress.elapsed_seconds,
            goal_minutes = progress.goal_minutes,
            "practice session started"
        );

        let timer = Arc::new(Mutex::new(timer));
        let ticking = Arc::clone(&timer);
        let ticker = scheduler.every(
            Self::TICK_PERIOD,
            Box::new(move || -> TickFuture {
                let timer = Arc::clone(&ticking);
                Box::pin(async move {
                    timer.lock().await.tick().await;
                })
            }),
        );

        Self { timer, ticker }
    }

    pub async fn progress(&self) -> DailyProgress {
        self.timer.lock().await.progress()
    }

    /// # Errors
    ///
    /// Returns `GoalMinutesError` if `minutes` is outside 5..=120.
    pub async fn set_goal_minutes(&self, minutes: u32) -> Result<GoalMinutes, GoalMinutesError> {
        self.timer.lock().await.set_goal_minutes(minutes).await
    }

    pub async fn subscribe(&self) -> broadcast::Receiver<PracticeEvent> {
        self.timer.lock().await.subscribe()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.ticker.is_active()
    }

    /// Stop ticking and return the final progress.
    ///
    /// A tick already under way finishes first, so its writes and events are
    /// not lost.
    pub async fn stop(mut self) -> DailyProgress {
        self.ticker.stop().await;
        let progress = self.timer.lock().await.progress();
        info!(
            elapsed_seconds = progress.elapsed_seconds,
            goal_reached = progress.goal_reached,
            "practice session stopped"
        );
        progress
    }
}
