//! Weekly training summary (Monday 00:00 through Sunday 23:59:59 local time).

use crate::calendar::{current_week, local_date};
use crate::{LoggedSet, WeeklySummary, WorkoutSession};
use chrono::{DateTime, TimeZone};
use std::collections::HashSet;

/// Summarize the week containing `now`
///
/// Only completed sessions that started inside the week count, and a set is
/// included only through its session; a set logged this week against an
/// older session is ignored.
pub fn weekly_summary<Tz: TimeZone>(
    sessions: &[WorkoutSession],
    sets: &[LoggedSet],
    now: &DateTime<Tz>,
) -> WeeklySummary {
    let tz = now.timezone();
    let (monday, sunday) = current_week(now);

    let mut days = HashSet::new();
    let mut session_ids = HashSet::new();
    for session in sessions.iter().filter(|s| s.is_completed()) {
        let day = local_date(&session.started_at, &tz);
        if day >= monday && day <= sunday {
            days.insert(day);
            session_ids.insert(session.id);
        }
    }

    let mut summary = WeeklySummary {
        days_this_week: days.len() as u32,
        ..WeeklySummary::default()
    };
    for set in sets.iter().filter(|s| session_ids.contains(&s.session_id)) {
        summary.total_volume += set.volume();
        summary.total_sets += 1;
    }

    tracing::debug!(
        "Week of {}: {} days, {} sets, volume {}",
        monday,
        summary.days_this_week,
        summary.total_sets,
        summary.total_volume
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SetRole;
    use chrono::{Duration, FixedOffset, Utc};
    use uuid::Uuid;

    // Thursday
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 14, 18, 0, 0).unwrap()
    }

    fn session_at(started_at: DateTime<Utc>) -> WorkoutSession {
        WorkoutSession {
            id: Uuid::new_v4(),
            user_id: "local".into(),
            started_at,
            ended_at: Some(started_at + Duration::hours(1)),
            split: None,
        }
    }

    fn set_for(session: &WorkoutSession, weight: f64, reps: u32) -> LoggedSet {
        LoggedSet {
            id: Uuid::new_v4(),
            session_id: session.id,
            exercise_id: "squat".into(),
            weight,
            reps,
            role: SetRole::Working,
            is_pr: false,
            logged_at: session.started_at + Duration::minutes(10),
        }
    }

    #[test]
    fn test_empty_week_is_all_zero() {
        let summary = weekly_summary(&[], &[], &now());
        assert_eq!(summary, WeeklySummary::default());
        assert_eq!(summary.total_volume, 0.0);
    }

    #[test]
    fn test_counts_sessions_in_current_week() {
        let monday = session_at(Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap());
        let wednesday = session_at(Utc.with_ymd_and_hms(2024, 3, 13, 7, 0, 0).unwrap());
        let wednesday_pm = session_at(Utc.with_ymd_and_hms(2024, 3, 13, 19, 0, 0).unwrap());
        let last_sunday = session_at(Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 59).unwrap());

        let sets = vec![
            set_for(&monday, 100.0, 5),
            set_for(&monday, 100.0, 5),
            set_for(&wednesday, 60.0, 10),
            set_for(&wednesday_pm, 0.0, 15),
            set_for(&last_sunday, 200.0, 1),
        ];
        let sessions = vec![monday, wednesday, wednesday_pm, last_sunday];

        let summary = weekly_summary(&sessions, &sets, &now());
        assert_eq!(summary.days_this_week, 2);
        assert_eq!(summary.total_sets, 4);
        assert_eq!(summary.total_volume, 100.0 * 5.0 * 2.0 + 600.0);
    }

    #[test]
    fn test_open_session_excluded() {
        let mut open = session_at(now() - Duration::hours(1));
        open.ended_at = None;
        let sets = vec![set_for(&open, 50.0, 10)];

        let summary = weekly_summary(&[open], &sets, &now());
        assert_eq!(summary, WeeklySummary::default());
    }

    #[test]
    fn test_sunday_end_of_week_included() {
        let now = Utc.with_ymd_and_hms(2024, 3, 17, 23, 59, 59).unwrap();
        let late = session_at(Utc.with_ymd_and_hms(2024, 3, 17, 23, 0, 0).unwrap());
        let sets = vec![set_for(&late, 20.0, 12)];

        let summary = weekly_summary(&[late], &sets, &now);
        assert_eq!(summary.days_this_week, 1);
        assert_eq!(summary.total_volume, 240.0);
    }

    #[test]
    fn test_week_boundary_follows_local_time() {
        // Sunday 22:00 at UTC-5 is already Monday 03:00 in UTC
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let now = Utc
            .with_ymd_and_hms(2024, 3, 14, 18, 0, 0)
            .unwrap()
            .with_timezone(&tz);
        let sunday_local = session_at(Utc.with_ymd_and_hms(2024, 3, 11, 3, 0, 0).unwrap());
        let sets = vec![set_for(&sunday_local, 100.0, 3)];

        let summary = weekly_summary(&[sunday_local.clone()], &sets, &now);
        assert_eq!(summary.total_sets, 0);

        // The same data counts when the week is anchored in UTC
        let utc_now = Utc.with_ymd_and_hms(2024, 3, 14, 18, 0, 0).unwrap();
        let summary = weekly_summary(&[sunday_local], &sets, &utc_now);
        assert_eq!(summary.total_sets, 1);
    }
}
