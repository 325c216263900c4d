//! Read interface to the training data store.
//!
//! Analytics never talk to storage directly; the service layer fetches a
//! full snapshot through a [`TrainingRepository`] and hands it to the pure
//! functions. Any failure here surfaces as an `Err`, never as partial data.

use crate::{Error, Exercise, JoinedSet, Result, WorkoutSession};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Inclusive time range
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start > end {
            return Err(Error::Other(format!(
                "Invalid date range: {} is after {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        *instant >= self.start && *instant <= self.end
    }
}

/// Which sets to fetch
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SetQuery {
    /// All sets belonging to these sessions
    Sessions(Vec<Uuid>),
    /// All sets of one exercise
    Exercise(String),
}

/// Read queries the analytics consume
pub trait TrainingRepository {
    /// Completed sessions (non-null end) owned by `user_id`, newest first.
    /// The range applies to `started_at`.
    fn list_completed_sessions(
        &self,
        user_id: &str,
        range: Option<&DateRange>,
    ) -> Result<Vec<WorkoutSession>>;

    /// Sets matching `query`, oldest first, joined with exercise metadata.
    /// The range applies to `logged_at`.
    fn list_sets(&self, query: &SetQuery, range: Option<&DateRange>) -> Result<Vec<JoinedSet>>;

    /// PR-flagged sets from completed sessions of `user_id` logged at or after `since`
    fn list_pr_sets(&self, user_id: &str, since: DateTime<Utc>) -> Result<Vec<JoinedSet>>;

    fn get_exercise(&self, id: &str) -> Result<Option<Exercise>>;
}
