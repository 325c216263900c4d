//! Progressive overload advice for the next session of an exercise.
//!
//! The advice is driven by a small rule table, one rule per training style:
//! - Below the rep threshold: keep the weight, add a rep
//! - At or above it: add weight and reset reps to the rule's target
//!
//! The table is plain configuration ([`OverloadPolicy`]) and can be
//! overridden from `config.toml`.

use crate::{Error, LoggedSet, OverloadSuggestion, Result, TrainingStyle};
use serde::{Deserialize, Serialize};

/// Rep target applied when a set reaches the rule's threshold
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RepTarget {
    /// Always aim for this many reps at the heavier weight
    Fixed { reps: u32 },
    /// Aim for the achieved reps minus `by` at the heavier weight
    BelowAchieved { by: u32 },
}

impl RepTarget {
    fn apply(&self, achieved: u32) -> u32 {
        match *self {
            RepTarget::Fixed { reps } => reps,
            RepTarget::BelowAchieved { by } => achieved.saturating_sub(by).max(1),
        }
    }
}

/// Progression rule for one training style
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProgressionRule {
    pub rep_threshold: u32,
    pub weight_increment: f64,
    pub on_threshold: RepTarget,
}

impl ProgressionRule {
    pub fn hypertrophy() -> Self {
        Self {
            rep_threshold: 12,
            weight_increment: 5.0,
            on_threshold: RepTarget::Fixed { reps: 8 },
        }
    }

    pub fn strength() -> Self {
        Self {
            rep_threshold: 5,
            weight_increment: 10.0,
            on_threshold: RepTarget::Fixed { reps: 3 },
        }
    }

    pub fn mixed() -> Self {
        Self {
            rep_threshold: 10,
            weight_increment: 5.0,
            on_threshold: RepTarget::BelowAchieved { by: 2 },
        }
    }
}

/// Rule table mapping each training style to its progression rule
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct OverloadPolicy {
    #[serde(default = "ProgressionRule::hypertrophy")]
    pub hypertrophy: ProgressionRule,

    #[serde(default = "ProgressionRule::strength")]
    pub strength: ProgressionRule,

    #[serde(default = "ProgressionRule::mixed")]
    pub mixed: ProgressionRule,
}

impl Default for OverloadPolicy {
    fn default() -> Self {
        Self {
            hypertrophy: ProgressionRule::hypertrophy(),
            strength: ProgressionRule::strength(),
            mixed: ProgressionRule::mixed(),
        }
    }
}

impl OverloadPolicy {
    pub fn rule(&self, style: TrainingStyle) -> &ProgressionRule {
        match style {
            TrainingStyle::Hypertrophy => &self.hypertrophy,
            TrainingStyle::Strength => &self.strength,
            TrainingStyle::Mixed => &self.mixed,
        }
    }

    /// Reject rules that could never progress (zero threshold, non-positive increment)
    pub fn validate(&self) -> Result<()> {
        for style in TrainingStyle::all() {
            let rule = self.rule(*style);
            if rule.rep_threshold == 0 {
                return Err(Error::Config(format!(
                    "{:?} policy: rep_threshold must be at least 1",
                    style
                )));
            }
            if !rule.weight_increment.is_finite() || rule.weight_increment <= 0.0 {
                return Err(Error::Config(format!(
                    "{:?} policy: weight_increment must be positive",
                    style
                )));
            }
            if rule.on_threshold == (RepTarget::Fixed { reps: 0 }) {
                return Err(Error::Config(format!(
                    "{:?} policy: rep target must be at least 1",
                    style
                )));
            }
        }
        Ok(())
    }
}

/// Suggest the next target using the default rule table
///
/// See [`suggest_next_with`].
pub fn suggest_next(last_sets: &[LoggedSet], style: TrainingStyle) -> Option<OverloadSuggestion> {
    suggest_next_with(&OverloadPolicy::default(), last_sets, style)
}

/// Suggest the next target from the most recent session's sets for one exercise
///
/// Only working sets are considered; with none, there is nothing to progress
/// from and the result is `None`. The best set is the one with the highest
/// weight × reps. Ties go to the earliest `logged_at`, then to input order.
pub fn suggest_next_with(
    policy: &OverloadPolicy,
    last_sets: &[LoggedSet],
    style: TrainingStyle,
) -> Option<OverloadSuggestion> {
    let working: Vec<&LoggedSet> = last_sets.iter().filter(|s| s.is_working()).collect();
    let best = best_working_set(&working)?;

    let rule = policy.rule(style);
    let (w, r) = (best.weight, best.reps);

    let (suggested_weight, suggested_reps) = if r >= rule.rep_threshold {
        (w + rule.weight_increment, rule.on_threshold.apply(r))
    } else {
        (w, r + 1)
    };

    let message = rationale(style, r >= rule.rep_threshold, w, r, suggested_weight, suggested_reps);

    tracing::debug!(
        "Best of {} working sets: {} x {}; suggesting {} x {} ({:?})",
        working.len(),
        fmt_weight(w),
        r,
        fmt_weight(suggested_weight),
        suggested_reps,
        style
    );

    Some(OverloadSuggestion {
        last_weight: w,
        last_reps: r,
        last_set_count: working.len() as u32,
        suggested_weight,
        suggested_reps,
        message,
    })
}

fn best_working_set<'a>(working: &[&'a LoggedSet]) -> Option<&'a LoggedSet> {
    working.iter().copied().reduce(|best, set| {
        let (v, best_v) = (set.volume(), best.volume());
        if v > best_v || (v == best_v && set.logged_at < best.logged_at) {
            set
        } else {
            best
        }
    })
}

fn rationale(
    style: TrainingStyle,
    progressed: bool,
    weight: f64,
    reps: u32,
    next_weight: f64,
    next_reps: u32,
) -> String {
    let (w, next_w) = (fmt_weight(weight), fmt_weight(next_weight));
    match (style, progressed) {
        (TrainingStyle::Hypertrophy, true) => {
            format!("hit {} reps - bump up to {}, aim for {}+", reps, next_w, next_reps)
        }
        (TrainingStyle::Hypertrophy, false) => format!("try to beat {} reps at {}", reps, w),
        (TrainingStyle::Strength, true) => {
            format!("hit {} reps - try {} for {}+", reps, next_w, next_reps)
        }
        (TrainingStyle::Strength, false) => format!("try to add a rep at {}", w),
        (TrainingStyle::Mixed, true) => {
            format!("progress to {}, aim for {}+ reps", next_w, next_reps)
        }
        (TrainingStyle::Mixed, false) => format!("try {} reps at {}", next_reps, w),
    }
}

/// Render a weight without a trailing `.0` for whole numbers
pub fn fmt_weight(weight: f64) -> String {
    if weight.fract() == 0.0 {
        format!("{:.0}", weight)
    } else {
        format!("{}", weight)
    }
}
