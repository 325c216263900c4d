//! Core domain types for liftlog.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercises, muscle groups and equipment
//! - Workout sessions and logged sets
//! - Derived analytics values (summaries, PRs, balance, suggestions)

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Exercise Types
// ============================================================================

/// Primary muscle group targeted by an exercise
///
/// Variant order is the display order used by the balance analyzer.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MuscleGroup {
    Chest,
    Back,
    Shoulders,
    Biceps,
    Triceps,
    Forearms,
    Core,
    Quads,
    Hamstrings,
    Glutes,
    Calves,
    FullBody,
}

impl MuscleGroup {
    pub fn all() -> &'static [MuscleGroup] {
        &[
            MuscleGroup::Chest,
            MuscleGroup::Back,
            MuscleGroup::Shoulders,
            MuscleGroup::Biceps,
            MuscleGroup::Triceps,
            MuscleGroup::Forearms,
            MuscleGroup::Core,
            MuscleGroup::Quads,
            MuscleGroup::Hamstrings,
            MuscleGroup::Glutes,
            MuscleGroup::Calves,
            MuscleGroup::FullBody,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MuscleGroup::Chest => "chest",
            MuscleGroup::Back => "back",
            MuscleGroup::Shoulders => "shoulders",
            MuscleGroup::Biceps => "biceps",
            MuscleGroup::Triceps => "triceps",
            MuscleGroup::Forearms => "forearms",
            MuscleGroup::Core => "core",
            MuscleGroup::Quads => "quads",
            MuscleGroup::Hamstrings => "hamstrings",
            MuscleGroup::Glutes => "glutes",
            MuscleGroup::Calves => "calves",
            MuscleGroup::FullBody => "full_body",
        }
    }
}

impl fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MuscleGroup {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "chest" => Ok(MuscleGroup::Chest),
            "back" | "lats" => Ok(MuscleGroup::Back),
            "shoulders" | "delts" => Ok(MuscleGroup::Shoulders),
            "biceps" => Ok(MuscleGroup::Biceps),
            "triceps" => Ok(MuscleGroup::Triceps),
            "forearms" => Ok(MuscleGroup::Forearms),
            "core" | "abs" => Ok(MuscleGroup::Core),
            "quads" | "quadriceps" => Ok(MuscleGroup::Quads),
            "hamstrings" => Ok(MuscleGroup::Hamstrings),
            "glutes" => Ok(MuscleGroup::Glutes),
            "calves" => Ok(MuscleGroup::Calves),
            "full_body" | "fullbody" | "full" => Ok(MuscleGroup::FullBody),
            other => Err(Error::Other(format!("Unknown muscle group: {}", other))),
        }
    }
}

/// Equipment used by an exercise
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Equipment {
    Barbell,
    Dumbbell,
    Machine,
    Cable,
    Kettlebell,
    Bodyweight,
    Band,
    #[default]
    Other,
}

impl FromStr for Equipment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "barbell" => Ok(Equipment::Barbell),
            "dumbbell" => Ok(Equipment::Dumbbell),
            "machine" => Ok(Equipment::Machine),
            "cable" => Ok(Equipment::Cable),
            "kettlebell" => Ok(Equipment::Kettlebell),
            "bodyweight" => Ok(Equipment::Bodyweight),
            "band" => Ok(Equipment::Band),
            "other" => Ok(Equipment::Other),
            other => Err(Error::Other(format!("Unknown equipment: {}", other))),
        }
    }
}

/// An exercise definition (e.g., "Barbell Bench Press")
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub muscle_group: MuscleGroup,
    #[serde(default)]
    pub equipment: Equipment,
}

// ============================================================================
// Session and Set Types
// ============================================================================

/// A training occasion
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutSession {
    pub id: Uuid,
    pub user_id: String,
    pub started_at: DateTime<Utc>,
    /// `None` while the session is still in progress
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub split: Option<String>,
}

impl WorkoutSession {
    pub fn is_completed(&self) -> bool {
        self.ended_at.is_some()
    }
}

/// Role of a set within a workout
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SetRole {
    Warmup,
    #[default]
    Working,
    Dropset,
}

impl FromStr for SetRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "warmup" | "warm_up" => Ok(SetRole::Warmup),
            "working" | "work" => Ok(SetRole::Working),
            "dropset" | "drop" => Ok(SetRole::Dropset),
            other => Err(Error::Other(format!("Unknown set role: {}", other))),
        }
    }
}

/// One performed set
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LoggedSet {
    pub id: Uuid,
    pub session_id: Uuid,
    pub exercise_id: String,
    /// Non-negative, in the user's unit
    pub weight: f64,
    pub reps: u32,
    pub role: SetRole,
    #[serde(default)]
    pub is_pr: bool,
    pub logged_at: DateTime<Utc>,
}

impl LoggedSet {
    /// weight × reps
    pub fn volume(&self) -> f64 {
        self.weight * f64::from(self.reps)
    }

    pub fn is_working(&self) -> bool {
        self.role == SetRole::Working
    }

    /// Check the set against the data model (finite non-negative weight, positive reps)
    pub fn validate(&self) -> Result<()> {
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(Error::InvalidRecord(format!(
                "set {} has invalid weight {}",
                self.id, self.weight
            )));
        }
        if self.reps == 0 {
            return Err(Error::InvalidRecord(format!("set {} has zero reps", self.id)));
        }
        Ok(())
    }
}

/// A logged set joined with its exercise metadata
///
/// `exercise` is `None` when the exercise reference no longer resolves.
#[derive(Clone, Debug, PartialEq)]
pub struct JoinedSet {
    pub set: LoggedSet,
    pub exercise: Option<Exercise>,
}

// ============================================================================
// Derived Types
// ============================================================================

/// Training totals for the current Monday-to-Sunday week
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct WeeklySummary {
    pub days_this_week: u32,
    pub total_volume: f64,
    pub total_sets: u32,
}

/// Whether a PR's exercise metadata could be resolved
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PrResolution {
    Resolved,
    /// The exercise reference did not resolve; the name is a placeholder
    MissingExercise { exercise_id: String },
}

/// A personal record ready for display
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PersonalRecord {
    pub exercise_name: String,
    pub weight: f64,
    pub reps: u32,
    pub logged_at: DateTime<Utc>,
    pub date: NaiveDate,
    pub resolution: PrResolution,
}

impl PersonalRecord {
    pub fn is_resolved(&self) -> bool {
        self.resolution == PrResolution::Resolved
    }
}

/// Number of sets trained for one muscle group within a window
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct BalanceEntry {
    pub muscle_group: MuscleGroup,
    pub set_count: u32,
}

/// Coarse policy selector for overload progression
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TrainingStyle {
    #[default]
    Hypertrophy,
    Strength,
    Mixed,
}

impl TrainingStyle {
    pub fn all() -> &'static [TrainingStyle] {
        &[
            TrainingStyle::Hypertrophy,
            TrainingStyle::Strength,
            TrainingStyle::Mixed,
        ]
    }
}

impl FromStr for TrainingStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "hypertrophy" => Ok(TrainingStyle::Hypertrophy),
            "strength" => Ok(TrainingStyle::Strength),
            "mixed" => Ok(TrainingStyle::Mixed),
            other => Err(Error::Other(format!("Unknown training style: {}", other))),
        }
    }
}

/// Next weight/rep target for an exercise
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct OverloadSuggestion {
    pub last_weight: f64,
    pub last_reps: u32,
    /// Working sets considered, for display ("based on 3 sets")
    pub last_set_count: u32,
    pub suggested_weight: f64,
    pub suggested_reps: u32,
    pub message: String,
}
