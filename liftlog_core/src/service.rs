//! Fetch-then-compute entry points.
//!
//! Each function pulls the full snapshot it needs from a repository and then
//! runs the matching pure analytic. A failed fetch is returned as `Err` and
//! nothing is computed from partial data; callers decide how to render it.

use crate::advisor::{suggest_next_with, OverloadPolicy};
use crate::calendar::trailing_since;
use crate::repository::{DateRange, SetQuery, TrainingRepository};
use crate::{
    current_streak, muscle_balance, recent_prs, weekly_summary, BalanceEntry, Config,
    LoggedSet, OverloadSuggestion, PersonalRecord, Result, TrainingStyle, WeeklySummary,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

pub fn load_streak<R, Tz>(repo: &R, user_id: &str, now: &DateTime<Tz>) -> Result<u32>
where
    R: TrainingRepository + ?Sized,
    Tz: TimeZone,
{
    let sessions = repo.list_completed_sessions(user_id, None)?;
    Ok(current_streak(&sessions, now))
}

pub fn load_weekly_summary<R, Tz>(
    repo: &R,
    user_id: &str,
    now: &DateTime<Tz>,
) -> Result<WeeklySummary>
where
    R: TrainingRepository + ?Sized,
    Tz: TimeZone,
{
    // Wide enough to hold the local week in any offset; weekly_summary trims it
    let now_utc = now.with_timezone(&Utc);
    let range = DateRange::new(now_utc - Duration::days(8), now_utc + Duration::days(8))?;

    let sessions = repo.list_completed_sessions(user_id, Some(&range))?;
    let ids: Vec<Uuid> = sessions.iter().map(|s| s.id).collect();
    let sets: Vec<LoggedSet> = repo
        .list_sets(&SetQuery::Sessions(ids), None)?
        .into_iter()
        .map(|j| j.set)
        .collect();

    Ok(weekly_summary(&sessions, &sets, now))
}

pub fn load_recent_prs<R, Tz>(
    repo: &R,
    user_id: &str,
    window_days: u32,
    now: &DateTime<Tz>,
) -> Result<Vec<PersonalRecord>>
where
    R: TrainingRepository + ?Sized,
    Tz: TimeZone,
{
    let sets = repo.list_pr_sets(user_id, trailing_since(now, window_days))?;
    Ok(recent_prs(&sets, window_days, now))
}

/// Balance over the user's completed sessions
pub fn load_muscle_balance<R, Tz>(
    repo: &R,
    user_id: &str,
    window_days: u32,
    now: &DateTime<Tz>,
) -> Result<Vec<BalanceEntry>>
where
    R: TrainingRepository + ?Sized,
    Tz: TimeZone,
{
    let range = DateRange::new(trailing_since(now, window_days), now.with_timezone(&Utc))?;
    let ids: Vec<Uuid> = repo
        .list_completed_sessions(user_id, None)?
        .iter()
        .map(|s| s.id)
        .collect();

    let sets = repo.list_sets(&SetQuery::Sessions(ids), Some(&range))?;
    Ok(muscle_balance(&sets, window_days, now))
}

/// Working sets of `exercise_id` from the most recent completed session that has any
pub fn last_working_sets<R>(repo: &R, user_id: &str, exercise_id: &str) -> Result<Vec<LoggedSet>>
where
    R: TrainingRepository + ?Sized,
{
    let sessions = repo.list_completed_sessions(user_id, None)?;
    let sets: Vec<LoggedSet> = repo
        .list_sets(&SetQuery::Exercise(exercise_id.to_string()), None)?
        .into_iter()
        .map(|j| j.set)
        .filter(|s| s.is_working())
        .collect();

    // Sessions arrive newest first
    for session in &sessions {
        let in_session: Vec<LoggedSet> = sets
            .iter()
            .filter(|s| s.session_id == session.id)
            .cloned()
            .collect();
        if !in_session.is_empty() {
            tracing::debug!(
                "Using {} working sets of {} from session {}",
                in_session.len(),
                exercise_id,
                session.id
            );
            return Ok(in_session);
        }
    }

    tracing::debug!("No completed working sets for {}", exercise_id);
    Ok(Vec::new())
}

pub fn load_suggestion<R>(
    repo: &R,
    user_id: &str,
    exercise_id: &str,
    style: TrainingStyle,
    policy: &OverloadPolicy,
) -> Result<Option<OverloadSuggestion>>
where
    R: TrainingRepository + ?Sized,
{
    let sets = last_working_sets(repo, user_id, exercise_id)?;
    Ok(suggest_next_with(policy, &sets, style))
}

/// Every dashboard widget, each loaded independently
///
/// One failing fetch leaves the other widgets intact.
#[derive(Debug)]
pub struct Dashboard {
    pub streak: Result<u32>,
    pub week: Result<WeeklySummary>,
    pub prs: Result<Vec<PersonalRecord>>,
    pub balance: Result<Vec<BalanceEntry>>,
}

pub fn load_dashboard<R, Tz>(repo: &R, config: &Config, now: &DateTime<Tz>) -> Dashboard
where
    R: TrainingRepository + ?Sized,
    Tz: TimeZone,
{
    let user_id = config.user.id.as_str();
    let analytics = &config.analytics;

    Dashboard {
        streak: load_streak(repo, user_id, now),
        week: load_weekly_summary(repo, user_id, now),
        prs: load_recent_prs(repo, user_id, analytics.pr_window_days, now),
        balance: load_muscle_balance(repo, user_id, analytics.balance_window_days, now),
    }
}
