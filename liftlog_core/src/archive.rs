//! CSV archive for logged sets.
//!
//! The set log (`sets.jsonl`) grows with every logged set. Rolling it up
//! moves its contents into `sets.csv` and renames the log so it can be
//! removed later.

use crate::{LoggedSet, Result, SetRole};
use chrono::{DateTime, Utc};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::Path;
use uuid::Uuid;

/// A row in the CSV archive
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    id: String,
    session_id: String,
    exercise_id: String,
    weight: f64,
    reps: u32,
    role: SetRole,
    is_pr: bool,
    logged_at: String,
}

impl From<&LoggedSet> for CsvRow {
    fn from(set: &LoggedSet) -> Self {
        CsvRow {
            id: set.id.to_string(),
            session_id: set.session_id.to_string(),
            exercise_id: set.exercise_id.clone(),
            weight: set.weight,
            reps: set.reps,
            role: set.role,
            is_pr: set.is_pr,
            logged_at: set.logged_at.to_rfc3339(),
        }
    }
}

impl TryFrom<CsvRow> for LoggedSet {
    type Error = crate::Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| crate::Error::InvalidRecord(format!("Invalid UUID: {}", e)))?;
        let session_id = Uuid::parse_str(&row.session_id)
            .map_err(|e| crate::Error::InvalidRecord(format!("Invalid session UUID: {}", e)))?;
        let logged_at = DateTime::parse_from_rfc3339(&row.logged_at)
            .map_err(|e| crate::Error::InvalidRecord(format!("Invalid date: {}", e)))?
            .with_timezone(&Utc);

        Ok(LoggedSet {
            id,
            session_id,
            exercise_id: row.exercise_id,
            weight: row.weight,
            reps: row.reps,
            role: row.role,
            is_pr: row.is_pr,
            logged_at,
        })
    }
}

/// Read every set from a CSV archive
///
/// A missing archive is empty. Rows that fail to parse are skipped.
pub fn read_archive(path: &Path) -> Result<Vec<LoggedSet>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut sets = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        match result {
            Ok(row) => match LoggedSet::try_from(row) {
                Ok(set) => sets.push(set),
                Err(e) => tracing::warn!("Failed to parse archived set: {}", e),
            },
            Err(e) => tracing::warn!("Failed to deserialize CSV row: {}", e),
        }
    }

    tracing::debug!("Read {} sets from archive {:?}", sets.len(), path);
    Ok(sets)
}

/// Roll the set log into the CSV archive and mark the log processed
///
/// 1. Read all sets from the log
/// 2. Append them to the CSV (headers only when the file is new)
/// 3. fsync the CSV
/// 4. Rename the log to `*.jsonl.processed`
///
/// Returns the number of sets moved.
pub fn rollup_sets(log_path: &Path, csv_path: &Path) -> Result<usize> {
    let sets: Vec<LoggedSet> = crate::store::read_records(log_path)?;

    if sets.is_empty() {
        tracing::info!("No sets in log to roll up");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for set in &sets {
        writer.serialize(CsvRow::from(set))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Wrote {} sets to {:?}", sets.len(), csv_path);

    let processed_path = log_path.with_extension("jsonl.processed");
    std::fs::rename(log_path, &processed_path)?;
    tracing::info!("Archived set log to {:?}", processed_path);

    Ok(sets.len())
}

/// Remove `*.processed` logs left behind by [`rollup_sets`]
pub fn cleanup_processed(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "processed") {
            std::fs::remove_file(&path)?;
            tracing::debug!("Removed processed log: {:?}", path);
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed logs", count);
    }

    Ok(count)
}
