//! Rest timer between sets
//!
//! Stores only the start instant and the duration. Whoever polls it
//! recomputes the remaining time from the wall clock, so a timer saved to
//! the database keeps counting across restarts.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_REST_SECS: u32 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestTimer {
    pub started_at: DateTime<Utc>,
    pub duration_secs: u32,
}

impl RestTimer {
    pub fn start(now: DateTime<Utc>, duration_secs: u32) -> Self {
        Self { started_at: now, duration_secs }
    }

    pub fn ends_at(&self) -> DateTime<Utc> {
        self.started_at + Duration::seconds(i64::from(self.duration_secs))
    }

    /// Whole seconds left, 0 once finished
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> u32 {
        // Clock behind the start: nothing has elapsed yet
        let elapsed = (now - self.started_at).num_seconds().max(0);
        let remaining = i64::from(self.duration_secs) - elapsed;
        u32::try_from(remaining.max(0)).unwrap_or(0)
    }

    pub fn is_finished(&self, now: DateTime<Utc>) -> bool {
        self.remaining_secs(now) == 0
    }
}
