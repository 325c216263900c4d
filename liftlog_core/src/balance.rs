//! Muscle group balance: sets per muscle group over a trailing window.
//!
//! This is a training-frequency signal, so it counts sets rather than volume.

use crate::calendar::within_trailing_days;
use crate::{BalanceEntry, JoinedSet, MuscleGroup};
use chrono::{DateTime, TimeZone};
use std::collections::BTreeMap;

/// Default trailing window in days
pub const DEFAULT_BALANCE_WINDOW_DAYS: u32 = 7;

/// Set counts per muscle group trained within the window
///
/// Only groups with at least one set appear, in [`MuscleGroup`] order.
/// Sets without exercise metadata are skipped.
pub fn muscle_balance<Tz: TimeZone>(
    sets: &[JoinedSet],
    window_days: u32,
    now: &DateTime<Tz>,
) -> Vec<BalanceEntry> {
    let mut counts: BTreeMap<MuscleGroup, u32> = BTreeMap::new();
    let mut unresolved = 0;

    for joined in sets
        .iter()
        .filter(|j| within_trailing_days(&j.set.logged_at, window_days, now))
    {
        match &joined.exercise {
            Some(exercise) => *counts.entry(exercise.muscle_group).or_insert(0) += 1,
            None => unresolved += 1,
        }
    }

    if unresolved > 0 {
        tracing::warn!(
            "{} sets skipped in muscle balance: exercise not found",
            unresolved
        );
    }

    counts
        .into_iter()
        .map(|(muscle_group, set_count)| BalanceEntry {
            muscle_group,
            set_count,
        })
        .collect()
}
