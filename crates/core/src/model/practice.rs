use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

use crate::time::parse_day;

//
// ─── GOAL ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum GoalMinutesError {
    #[error("daily goal must be between {min} and {max} minutes, got {got}", min = GoalMinutes::MIN, max = GoalMinutes::MAX)]
    OutOfRange { got: u32 },
}

/// Daily practice target in whole minutes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GoalMinutes(u32);

impl GoalMinutes {
    pub const MIN: u32 = 5;
    pub const MAX: u32 = 120;
    pub const DEFAULT: u32 = 15;

    /// Validates a goal.
    ///
    /// # Errors
    ///
    /// Returns `GoalMinutesError::OutOfRange` outside `[MIN, MAX]`.
    pub fn new(minutes: u32) -> Result<Self, GoalMinutesError> {
        if (Self::MIN..=Self::MAX).contains(&minutes) {
            Ok(Self(minutes))
        } else {
            Err(GoalMinutesError::OutOfRange { got: minutes })
        }
    }

    /// Accepts any positive stored goal; the range only binds new choices.
    ///
    /// Returns `None` for zero.
    #[must_use]
    pub fn from_persisted(minutes: u32) -> Option<Self> {
        (minutes > 0).then_some(Self(minutes))
    }

    #[must_use]
    pub fn minutes(self) -> u32 {
        self.0
    }

    #[must_use]
    pub fn as_seconds(self) -> u64 {
        u64::from(self.0) * 60
    }
}

impl Default for GoalMinutes {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl fmt::Debug for GoalMinutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GoalMinutes({})", self.0)
    }
}

impl fmt::Display for GoalMinutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Result of counting one practiced second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The second was counted; nothing else changed.
    Counted,
    /// This second crossed the daily goal for the first time today.
    GoalReached,
}

/// Persisted field of the daily practice record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PracticeField {
    Date,
    ElapsedSeconds,
    GoalReached,
    GoalMinutes,
}

impl PracticeField {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::ElapsedSeconds => "elapsed_seconds",
            Self::GoalReached => "goal_reached",
            Self::GoalMinutes => "goal_minutes",
        }
    }
}

/// Raw persisted values, exactly as read from the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedPractice {
    pub date: Option<String>,
    pub elapsed_seconds: Option<String>,
    pub goal_reached: Option<String>,
    pub goal_minutes: Option<String>,
}

/// Outcome of rebuilding state from persisted values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoredPractice {
    pub state: DailyPracticeState,
    /// True when the stored day was missing or not today; the caller must
    /// persist the fresh record.
    pub rolled_over: bool,
    /// Fields present in the store that could not be parsed.
    pub malformed: Vec<PracticeField>,
}

/// Seconds practiced on one calendar day, plus the goal bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyPracticeState {
    date: NaiveDate,
    elapsed_seconds: u64,
    goal: GoalMinutes,
    goal_reached: bool,
}

impl DailyPracticeState {
    /// Fresh record for `date`: nothing practiced, goal not reached.
    #[must_use]
    pub fn new_day(date: NaiveDate, goal: GoalMinutes) -> Self {
        Self {
            date,
            elapsed_seconds: 0,
            goal,
            goal_reached: false,
        }
    }

    #[must_use]
    pub fn from_persisted(
        date: NaiveDate,
        elapsed_seconds: u64,
        goal: GoalMinutes,
        goal_reached: bool,
    ) -> Self {
        Self {
            date,
            elapsed_seconds,
            goal,
            goal_reached,
        }
    }

    /// Rebuilds today's state from raw stored values.
    ///
    /// Missing or malformed values fall back to defaults: goal 15, elapsed 0,
    /// not reached. A stored goal outside 5..=120 is kept if positive. A
    /// stored day other than `today` starts a new day.
    #[must_use]
    pub fn restore(persisted: &PersistedPractice, today: NaiveDate) -> RestoredPractice {
        let mut malformed = Vec::new();

        let goal = match persisted.goal_minutes.as_deref() {
            None => GoalMinutes::default(),
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .and_then(GoalMinutes::from_persisted)
                .unwrap_or_else(|| {
                    malformed.push(PracticeField::GoalMinutes);
                    GoalMinutes::default()
                }),
        };

        let stored_day = match persisted.date.as_deref() {
            None => None,
            Some(raw) => {
                let parsed = parse_day(raw);
                if parsed.is_none() {
                    malformed.push(PracticeField::Date);
                }
                parsed
            }
        };

        if stored_day != Some(today) {
            return RestoredPractice {
                state: Self::new_day(today, goal),
                rolled_over: true,
                malformed,
            };
        }

        let elapsed_seconds = match persisted.elapsed_seconds.as_deref() {
            None => 0,
            Some(raw) => raw.trim().parse::<u64>().unwrap_or_else(|_| {
                malformed.push(PracticeField::ElapsedSeconds);
                0
            }),
        };

        let goal_reached = match persisted.goal_reached.as_deref().map(str::trim) {
            None | Some("false") => false,
            Some("true") => true,
            Some(_) => {
                malformed.push(PracticeField::GoalReached);
                false
            }
        };

        RestoredPractice {
            state: Self::from_persisted(today, elapsed_seconds, goal, goal_reached),
            rolled_over: false,
            malformed,
        }
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    #[must_use]
    pub fn goal(&self) -> GoalMinutes {
        self.goal
    }

    #[must_use]
    pub fn goal_reached(&self) -> bool {
        self.goal_reached
    }

    /// True if this record belongs to a day other than `today`.
    #[must_use]
    pub fn is_stale(&self, today: NaiveDate) -> bool {
        self.date != today
    }

    /// Starts `today` over, keeping the configured goal.
    pub fn roll_over(&mut self, today: NaiveDate) {
        *self = Self::new_day(today, self.goal);
    }

    /// Changes the goal. Today's `goal_reached` flag is left untouched.
    pub fn set_goal(&mut self, goal: GoalMinutes) {
        self.goal = goal;
    }

    /// Counts one practiced second.
    ///
    /// The goal is reached once whole elapsed minutes meet the goal, and only
    /// the first crossing of the day reports `GoalReached`.
    pub fn tick(&mut self) -> TickOutcome {
        self.elapsed_seconds = self.elapsed_seconds.saturating_add(1);
        let minutes = self.elapsed_seconds / 60;
        if !self.goal_reached && minutes >= u64::from(self.goal.minutes()) {
            self.goal_reached = true;
            return TickOutcome::GoalReached;
        }
        TickOutcome::Counted
    }

    #[must_use]
    pub fn progress(&self) -> DailyProgress {
        DailyProgress::from_state(self)
    }
}

//
// ─── PROGRESS ──────────────────────────────────────────────────────────────────
//

/// Read-only snapshot for rendering a progress indicator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyProgress {
    pub elapsed_seconds: u64,
    pub goal_minutes: u32,
    pub goal_reached: bool,
    /// Share of the goal practiced, capped at 100.
    pub percent: f64,
}

impl DailyProgress {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_state(state: &DailyPracticeState) -> Self {
        let goal_seconds = state.goal.as_seconds() as f64;
        let percent = (state.elapsed_seconds as f64 / goal_seconds * 100.0).min(100.0);
        Self {
            elapsed_seconds: state.elapsed_seconds,
            goal_minutes: state.goal.minutes(),
            goal_reached: state.goal_reached,
            percent,
        }
    }

    #[must_use]
    pub fn elapsed_label(&self) -> String {
        format_elapsed(self.elapsed_seconds)
    }
}

/// `"1h 2m 3s"` from one hour on, `"2m 3s"` below.
#[must_use]
pub fn format_elapsed(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else {
        format!("{minutes}m {seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn persisted(date: &str, seconds: &str, reached: &str) -> PersistedPractice {
        PersistedPractice {
            date: Some(date.to_string()),
            elapsed_seconds: Some(seconds.to_string()),
            goal_reached: Some(reached.to_string()),
            goal_minutes: None,
        }
    }

    #[test]
    fn persisted_goal_only_rejects_zero() {
        assert_eq!(GoalMinutes::from_persisted(0), None);
        assert_eq!(GoalMinutes::from_persisted(1).unwrap().as_seconds(), 60);
        assert_eq!(GoalMinutes::from_persisted(500).unwrap().minutes(), 500);
    }

    #[test]
    fn goal_minutes_bounds() {
        assert_eq!(
            GoalMinutes::new(3).unwrap_err(),
            GoalMinutesError::OutOfRange { got: 3 }
        );
        assert!(GoalMinutes::new(121).is_err());
        assert_eq!(GoalMinutes::new(5).unwrap().minutes(), 5);
        assert_eq!(GoalMinutes::new(120).unwrap().minutes(), 120);
        assert_eq!(GoalMinutes::new(15).unwrap(), GoalMinutes::default());
    }

    #[test]
    fn goal_reached_exactly_at_threshold_for_every_valid_goal() {
        for minutes in GoalMinutes::MIN..=GoalMinutes::MAX {
            let goal = GoalMinutes::new(minutes).unwrap();
            let mut state = DailyPracticeState::new_day(day(1), goal);
            let threshold = goal.as_seconds();
            let mut reached_at = None;
            for _ in 0..threshold + 5 {
                if state.tick() == TickOutcome::GoalReached {
                    assert!(reached_at.is_none(), "goal reported twice for {minutes}");
                    reached_at = Some(state.elapsed_seconds());
                }
                assert_eq!(state.goal_reached(), state.elapsed_seconds() >= threshold);
            }
            assert_eq!(reached_at, Some(threshold));
        }
    }

    #[test]
    fn one_minute_goal_scenario() {
        let goal = GoalMinutes::from_persisted(1).unwrap();
        let mut state = DailyPracticeState::from_persisted(day(1), 58, goal, false);
        assert_eq!(state.tick(), TickOutcome::Counted);
        assert_eq!(state.tick(), TickOutcome::GoalReached);
        assert_eq!(state.elapsed_seconds(), 60);
        assert!(state.goal_reached());
        assert_eq!(state.tick(), TickOutcome::Counted);
        assert_eq!(state.elapsed_seconds(), 61);
        assert!(state.goal_reached());
    }

    #[test]
    fn raising_goal_does_not_revert_flag() {
        let mut state = DailyPracticeState::from_persisted(day(1), 300, GoalMinutes::new(5).unwrap(), true);
        state.set_goal(GoalMinutes::new(60).unwrap());
        assert!(state.goal_reached());
        assert_eq!(state.tick(), TickOutcome::Counted);
        assert!(state.goal_reached());
    }

    #[test]
    fn restore_same_day_keeps_values() {
        let restored = DailyPracticeState::restore(&persisted("2024-03-02", "754", "true"), day(2));
        assert!(!restored.rolled_over);
        assert!(restored.malformed.is_empty());
        assert_eq!(restored.state.elapsed_seconds(), 754);
        assert!(restored.state.goal_reached());
        assert_eq!(restored.state.goal(), GoalMinutes::default());
    }

    #[test]
    fn restore_other_day_resets() {
        let restored = DailyPracticeState::restore(&persisted("2024-03-01", "900", "true"), day(2));
        assert!(restored.rolled_over);
        assert_eq!(restored.state.date(), day(2));
        assert_eq!(restored.state.elapsed_seconds(), 0);
        assert!(!restored.state.goal_reached());
    }

    #[test]
    fn restore_empty_store_starts_today() {
        let restored = DailyPracticeState::restore(&PersistedPractice::default(), day(5));
        assert!(restored.rolled_over);
        assert!(restored.malformed.is_empty());
        assert_eq!(restored.state, DailyPracticeState::new_day(day(5), GoalMinutes::default()));
    }

    #[test]
    fn restore_tolerates_malformed_values() {
        let mut raw = persisted("2024-03-02", "lots", "maybe");
        raw.goal_minutes = Some("0".to_string());
        let restored = DailyPracticeState::restore(&raw, day(2));
        assert!(!restored.rolled_over);
        assert_eq!(restored.state.elapsed_seconds(), 0);
        assert!(!restored.state.goal_reached());
        assert_eq!(restored.state.goal(), GoalMinutes::default());
        assert_eq!(
            restored.malformed,
            vec![
                PracticeField::GoalMinutes,
                PracticeField::ElapsedSeconds,
                PracticeField::GoalReached
            ]
        );
    }

    #[test]
    fn restore_garbled_date_rolls_over() {
        let restored = DailyPracticeState::restore(&persisted("Sat Mar 02 2024", "10", "false"), day(2));
        assert!(restored.rolled_over);
        assert_eq!(restored.malformed, vec![PracticeField::Date]);
    }

    #[test]
    fn progress_caps_at_hundred() {
        let state = DailyPracticeState::from_persisted(day(1), 450, GoalMinutes::new(15).unwrap(), false);
        let progress = state.progress();
        assert!((progress.percent - 50.0).abs() < f64::EPSILON);

        let done = DailyPracticeState::from_persisted(day(1), 5000, GoalMinutes::new(15).unwrap(), true);
        assert!((done.progress().percent - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn elapsed_label_formats() {
        assert_eq!(format_elapsed(0), "0m 0s");
        assert_eq!(format_elapsed(61), "1m 1s");
        assert_eq!(format_elapsed(3723), "1h 2m 3s");
    }
}
