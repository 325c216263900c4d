#![forbid(unsafe_code)]

//! Core domain model and training analytics for liftlog.
//!
//! This crate provides:
//! - Domain types (exercises, sessions, logged sets, derived metrics)
//! - Training analytics (streak, weekly summary, PRs, muscle balance)
//! - Progressive overload advice
//! - Repository access (JSONL store, CSV archive)

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod calendar;
pub mod streak;
pub mod weekly;
pub mod prs;
pub mod balance;
pub mod advisor;
pub mod repository;
pub mod store;
pub mod archive;
pub mod service;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use streak::current_streak;
pub use weekly::weekly_summary;
pub use prs::{recent_prs, PR_LIMIT};
pub use balance::muscle_balance;
pub use advisor::{suggest_next, suggest_next_with, OverloadPolicy};
pub use repository::{DateRange, SetQuery, TrainingRepository};
pub use store::{JsonlSink, JsonlStore, RecordSink};
