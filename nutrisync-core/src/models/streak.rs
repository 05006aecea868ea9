use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Consecutive-day logging streak, embedded in the user profile.
///
/// `longest_streak >= current_streak` holds for every value produced by the
/// transitions below.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_activity_date: Option<NaiveDate>,
}

impl StreakState {
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.last_activity_date == Some(date)
    }

    /// Activity-driven transition.
    ///
    /// Same-day calls are a no-op. Otherwise the streak continues when
    /// yesterday has logged meals or was the last activity date, and drops to
    /// zero when neither holds. A reset sets `current_streak` to 0 and
    /// `last_activity_date` to today.
    pub fn advanced(&self, today: NaiveDate, yesterday_logged: bool) -> StreakState {
        if self.is_active_on(today) {
            return *self;
        }

        let yesterday = today.pred_opt();
        let continues = yesterday_logged || (yesterday.is_some() && self.last_activity_date == yesterday);
        let current = if continues {
            self.current_streak.saturating_add(1)
        } else {
            0
        };

        StreakState {
            current_streak: current,
            longest_streak: self.longest_streak.max(current),
            last_activity_date: Some(today),
        }
    }

    /// Explicit "day complete" confirmation: always one more, no lookback.
    pub fn confirmed(&self, today: NaiveDate) -> StreakState {
        let current = self.current_streak.saturating_add(1);
        StreakState {
            current_streak: current,
            longest_streak: self.longest_streak.max(current),
            last_activity_date: Some(today),
        }
    }
}
