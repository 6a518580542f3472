use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use storage::repository::{KeyValueStore, keys};
use vocab_core::Clock;
use vocab_core::model::{
    DailyPracticeState, DailyProgress, GoalMinutes, GoalMinutesError, PersistedPractice,
    TickOutcome,
};
use vocab_core::time::format_day;

const EVENT_CAPACITY: usize = 16;

/// Notifications for whoever renders the practice view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PracticeEvent {
    /// The daily goal was crossed for the first time today.
    GoalReached {
        date: NaiveDate,
        elapsed_seconds: u64,
        goal_minutes: u32,
    },
    /// A running session crossed midnight and started a new day.
    DayRolledOver { date: NaiveDate },
}

//
// ─── TIMER ─────────────────────────────────────────────────────────────────────
//

/// Seconds practiced today, persisted after every change.
///
/// Reads never fail: absent or malformed values fall back to defaults. Writes
/// that fail are logged and dropped, so the in-memory count stays
/// authoritative for the rest of the session.
///
/// Several timers on the same store (one per open view) do not coordinate;
/// whichever writes last wins.
pub struct DailyPracticeTimer {
    clock: Clock,
    store: Arc<dyn KeyValueStore>,
    state: DailyPracticeState,
    events: broadcast::Sender<PracticeEvent>,
}

impl DailyPracticeTimer {
    /// Restore today's record, or start a fresh one and persist it.
    pub async fn initialize(clock: Clock, store: Arc<dyn KeyValueStore>) -> Self {
        let today = clock.today();
        let persisted = PersistedPractice {
            date: read(store.as_ref(), keys::TIMER_DATE).await,
            elapsed_seconds: read(store.as_ref(), keys::TIMER_SECONDS).await,
            goal_reached: read(store.as_ref(), keys::GOAL_REACHED).await,
            goal_minutes: read(store.as_ref(), keys::DAILY_GOAL_MINUTES).await,
        };

        let restored = DailyPracticeState::restore(&persisted, today);
        for field in &restored.malformed {
            warn!(field = field.as_str(), "ignoring malformed persisted practice value");
        }

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let timer = Self {
            clock,
            store,
            state: restored.state,
            events,
        };

        if restored.rolled_over {
            info!(date = %today, "starting a new practice day");
            timer.persist_day().await;
        } else {
            debug!(
                date = %today,
                elapsed_seconds = timer.state.elapsed_seconds(),
                goal_reached = timer.state.goal_reached(),
                "restored practice state"
            );
        }

        timer
    }

    /// Count one practiced second.
    ///
    /// Emits `PracticeEvent::GoalReached` the first time the goal is crossed
    /// today.
    pub async fn tick(&mut self) -> TickOutcome {
        let today = self.clock.today();
        if self.state.is_stale(today) {
            info!(from = %self.state.date(), to = %today, "practice day rolled over");
            self.state.roll_over(today);
            self.persist_day().await;
            let _ = self.events.send(PracticeEvent::DayRolledOver { date: today });
        }

        let outcome = self.state.tick();
        self.write(
            keys::TIMER_SECONDS,
            &self.state.elapsed_seconds().to_string(),
        )
        .await;

        if outcome == TickOutcome::GoalReached {
            self.write(keys::GOAL_REACHED, "true").await;
            info!(
                elapsed_seconds = self.state.elapsed_seconds(),
                goal_minutes = self.state.goal().minutes(),
                "daily goal reached"
            );
            // No receivers is fine; the outcome is also returned.
            let _ = self.events.send(PracticeEvent::GoalReached {
                date: self.state.date(),
                elapsed_seconds: self.state.elapsed_seconds(),
                goal_minutes: self.state.goal().minutes(),
            });
        } else {
            debug!(elapsed_seconds = self.state.elapsed_seconds(), "tick");
        }

        outcome
    }

    /// Change the daily goal and persist it.
    ///
    /// Today's `goal_reached` flag is kept as is.
    ///
    /// # Errors
    ///
    /// Returns `GoalMinutesError` outside 5..=120; nothing is changed then.
    pub async fn set_goal_minutes(&mut self, minutes: u32) -> Result<GoalMinutes, GoalMinutesError> {
        let goal = GoalMinutes::new(minutes)?;
        self.state.set_goal(goal);
        self.write(keys::DAILY_GOAL_MINUTES, &goal.minutes().to_string())
            .await;
        info!(goal_minutes = goal.minutes(), "daily goal updated");
        Ok(goal)
    }

    #[must_use]
    pub fn state(&self) -> &DailyPracticeState {
        &self.state
    }

    #[must_use]
    pub fn progress(&self) -> DailyProgress {
        self.state.progress()
    }

    /// Subscribe to practice events emitted after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PracticeEvent> {
        self.events.subscribe()
    }

    async fn persist_day(&self) {
        self.write(keys::TIMER_DATE, &format_day(self.state.date()))
            .await;
        self.write(
            keys::TIMER_SECONDS,
            &self.state.elapsed_seconds().to_string(),
        )
        .await;
        self.write(
            keys::GOAL_REACHED,
            if self.state.goal_reached() { "true" } else { "false" },
        )
        .await;
    }

    async fn write(&self, key: &str, value: &str) {
        if let Err(err) = self.store.set(key, value).await {
            warn!(key, error = %err, "failed to persist practice value");
        }
    }
}

async fn read(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key).await {
        Ok(value) => value,
        Err(err) => {
            warn!(key, error = %err, "failed to read practice value, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use storage::repository::InMemoryStore;
    use vocab_core::time::fixed_clock;

    #[tokio::test]
    async fn midnight_crossing_starts_new_day() {
        // 2023-11-14T22:13:20Z; a little under two hours to midnight UTC.
        let clock = fixed_clock();
        let store = InMemoryStore::new();
        let mut timer = DailyPracticeTimer::initialize(clock, Arc::new(store.clone())).await;
        let mut events = timer.subscribe();

        timer.tick().await;
        timer.tick().await;
        assert_eq!(timer.state().elapsed_seconds(), 2);

        timer.clock.advance(Duration::hours(2));
        timer.tick().await;

        assert_eq!(timer.state().elapsed_seconds(), 1);
        assert_eq!(
            timer.state().date(),
            NaiveDate::from_ymd_opt(2023, 11, 15).unwrap()
        );
        assert_eq!(
            store.get(keys::TIMER_DATE).await.unwrap().as_deref(),
            Some("2023-11-15")
        );
        assert_eq!(
            events.try_recv().unwrap(),
            PracticeEvent::DayRolledOver {
                date: NaiveDate::from_ymd_opt(2023, 11, 15).unwrap()
            }
        );
    }

    #[tokio::test]
    async fn rejected_goal_leaves_store_untouched() {
        let store = InMemoryStore::with_entries([(keys::DAILY_GOAL_MINUTES, "20")]);
        let mut timer = DailyPracticeTimer::initialize(fixed_clock(), Arc::new(store.clone())).await;

        assert!(timer.set_goal_minutes(4).await.is_err());
        assert_eq!(timer.state().goal().minutes(), 20);
        assert_eq!(
            store.get(keys::DAILY_GOAL_MINUTES).await.unwrap().as_deref(),
            Some("20")
        );
    }
}
