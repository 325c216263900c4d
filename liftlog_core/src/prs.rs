//! Personal record detection over a trailing window.

use crate::calendar::{local_date, within_trailing_days};
use crate::{JoinedSet, PersonalRecord, PrResolution};
use chrono::{DateTime, TimeZone};

/// Maximum number of records returned by [`recent_prs`]
pub const PR_LIMIT: usize = 10;

/// Default trailing window in days
pub const DEFAULT_PR_WINDOW_DAYS: u32 = 7;

/// Display name used when a PR's exercise cannot be resolved
pub const UNKNOWN_EXERCISE: &str = "Unknown exercise";

/// Recent personal records, newest first, at most [`PR_LIMIT`]
///
/// `sets` are expected to come from completed sessions of the querying user
/// (see `TrainingRepository::list_pr_sets`). A record whose exercise no longer
/// resolves keeps its place in the list with a placeholder name and a
/// [`PrResolution::MissingExercise`] marker.
pub fn recent_prs<Tz: TimeZone>(
    sets: &[JoinedSet],
    window_days: u32,
    now: &DateTime<Tz>,
) -> Vec<PersonalRecord> {
    let tz = now.timezone();
    let mut candidates: Vec<&JoinedSet> = sets
        .iter()
        .filter(|j| j.set.is_pr && within_trailing_days(&j.set.logged_at, window_days, now))
        .collect();

    // Stable: equal timestamps keep input order
    candidates.sort_by(|a, b| b.set.logged_at.cmp(&a.set.logged_at));

    candidates
        .into_iter()
        .take(PR_LIMIT)
        .map(|joined| {
            let set = &joined.set;
            let (exercise_name, resolution) = match &joined.exercise {
                Some(exercise) => (exercise.name.clone(), PrResolution::Resolved),
                None => {
                    tracing::warn!(
                        "PR set {} references unknown exercise {}",
                        set.id,
                        set.exercise_id
                    );
                    (
                        UNKNOWN_EXERCISE.to_string(),
                        PrResolution::MissingExercise {
                            exercise_id: set.exercise_id.clone(),
                        },
                    )
                }
            };

            PersonalRecord {
                exercise_name,
                weight: set.weight,
                reps: set.reps,
                logged_at: set.logged_at,
                date: local_date(&set.logged_at, &tz),
                resolution,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Equipment, Exercise, LoggedSet, MuscleGroup, SetRole};
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 14, 18, 0, 0).unwrap()
    }

    fn bench() -> Exercise {
        Exercise {
            id: "bench".into(),
            name: "Bench Press".into(),
            muscle_group: MuscleGroup::Chest,
            equipment: Equipment::Barbell,
        }
    }

    fn pr_set(hours_ago: i64, weight: f64, is_pr: bool) -> JoinedSet {
        JoinedSet {
            set: LoggedSet {
                id: Uuid::new_v4(),
                session_id: Uuid::new_v4(),
                exercise_id: "bench".into(),
                weight,
                reps: 5,
                role: SetRole::Working,
                is_pr,
                logged_at: now() - Duration::hours(hours_ago),
            },
            exercise: Some(bench()),
        }
    }

    #[test]
    fn test_no_prs_returns_empty() {
        let sets = vec![pr_set(1, 100.0, false)];
        assert!(recent_prs(&sets, DEFAULT_PR_WINDOW_DAYS, &now()).is_empty());
        assert!(recent_prs(&[], DEFAULT_PR_WINDOW_DAYS, &now()).is_empty());
    }

    #[test]
    fn test_newest_first_and_non_pr_excluded() {
        let sets = vec![
            pr_set(30, 100.0, true),
            pr_set(2, 110.0, true),
            pr_set(1, 200.0, false),
            pr_set(50, 95.0, true),
        ];

        let prs = recent_prs(&sets, 7, &now());
        let weights: Vec<f64> = prs.iter().map(|p| p.weight).collect();
        assert_eq!(weights, vec![110.0, 100.0, 95.0]);
        assert!(prs.iter().all(|p| p.is_resolved()));
        assert_eq!(prs[0].exercise_name, "Bench Press");
    }

    #[test]
    fn test_window_excludes_older_prs() {
        let sets = vec![pr_set(24 * 8, 100.0, true), pr_set(24 * 2, 90.0, true)];

        let prs = recent_prs(&sets, 7, &now());
        assert_eq!(prs.len(), 1);
        assert_eq!(prs[0].weight, 90.0);

        let prs = recent_prs(&sets, 30, &now());
        assert_eq!(prs.len(), 2);
    }

    #[test]
    fn test_window_larger_than_calendar_keeps_everything() {
        let sets = vec![pr_set(24 * 365 * 40, 60.0, true), pr_set(1, 90.0, true)];

        let prs = recent_prs(&sets, u32::MAX, &now());
        assert_eq!(prs.len(), 2);
        assert_eq!(prs[1].weight, 60.0);
    }

    #[test]
    fn test_capped_at_limit_and_non_increasing() {
        let sets: Vec<_> = (0..25).map(|i| pr_set(i, 100.0 + i as f64, true)).collect();

        let prs = recent_prs(&sets, 7, &now());
        assert_eq!(prs.len(), PR_LIMIT);
        assert!(prs.windows(2).all(|w| w[0].logged_at >= w[1].logged_at));
        assert_eq!(prs[0].weight, 100.0);
    }

    #[test]
    fn test_equal_timestamps_keep_input_order() {
        let first = pr_set(3, 80.0, true);
        let mut second = pr_set(3, 85.0, true);
        second.set.logged_at = first.set.logged_at;

        let prs = recent_prs(&[first, second], 7, &now());
        assert_eq!(prs[0].weight, 80.0);
        assert_eq!(prs[1].weight, 85.0);
    }

    #[test]
    fn test_missing_exercise_degrades_to_placeholder() {
        let mut orphan = pr_set(1, 140.0, true);
        orphan.exercise = None;
        orphan.set.exercise_id = "deleted_ex".into();
        let sets = vec![orphan, pr_set(2, 100.0, true)];

        let prs = recent_prs(&sets, 7, &now());
        assert_eq!(prs.len(), 2);
        assert_eq!(prs[0].exercise_name, UNKNOWN_EXERCISE);
        assert_eq!(
            prs[0].resolution,
            PrResolution::MissingExercise {
                exercise_id: "deleted_ex".into()
            }
        );
        assert!(prs[1].is_resolved());
    }
}
