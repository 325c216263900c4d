//! Consecutive-day training streak.

use crate::calendar::local_date;
use crate::WorkoutSession;
use chrono::{DateTime, Duration, TimeZone};
use std::collections::HashSet;

/// Current streak of consecutive calendar days with a completed session
///
/// Days are evaluated in `now`'s time zone and a session counts for the day
/// it started on. When nothing was completed today the walk starts at
/// yesterday, so today's missing session only breaks the streak once the day
/// is over.
pub fn current_streak<Tz: TimeZone>(sessions: &[WorkoutSession], now: &DateTime<Tz>) -> u32 {
    let tz = now.timezone();
    let days: HashSet<_> = sessions
        .iter()
        .filter(|s| s.is_completed())
        .map(|s| local_date(&s.started_at, &tz))
        .collect();

    if days.is_empty() {
        return 0;
    }

    let today = now.date_naive();
    let mut day = if days.contains(&today) {
        today
    } else {
        today - Duration::days(1)
    };

    let mut streak = 0;
    while days.contains(&day) {
        streak += 1;
        day -= Duration::days(1);
    }

    tracing::debug!(
        "Streak of {} days from {} distinct training days",
        streak,
        days.len()
    );
    streak
}
