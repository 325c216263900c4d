//! JSONL-backed local store.
//!
//! A data directory holds one append-only JSON Lines file per record kind:
//!
//! ```text
//! <data_dir>/exercises.jsonl
//! <data_dir>/sessions.jsonl
//! <data_dir>/sets.jsonl
//! <data_dir>/sets.csv        (archive, see `archive`)
//! ```
//!
//! Writers take an exclusive lock per append and readers a shared lock, so a
//! logger running next to a reader never produces a torn line. Records are
//! never rewritten in place: appending a record with an existing id replaces
//! the earlier one on read (last write wins). That is how a session gets its
//! end time.

use crate::archive::read_archive;
use crate::repository::{DateRange, SetQuery, TrainingRepository};
use crate::{Exercise, JoinedSet, LoggedSet, Result, WorkoutSession};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Sink trait for persisting records
pub trait RecordSink<T> {
    fn append(&mut self, record: &T) -> Result<()>;
}

/// JSONL-based record sink with file locking
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl<T: Serialize> RecordSink<T> for JsonlSink {
    fn append(&mut self, record: &T) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(record)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Appended record to {:?}", self.path);
        Ok(())
    }
}

/// Read every record from a JSONL file
///
/// A missing file is empty. Lines that fail to parse are skipped with a warning.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut records = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<T>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(
                    "Failed to parse {:?} at line {}: {}",
                    path,
                    line_num + 1,
                    e
                );
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} records from {:?}", records.len(), path);
    Ok(records)
}

/// Keep the last record per key, in order of first appearance
fn last_write_wins<T, K, F>(records: Vec<T>, key: F) -> Vec<T>
where
    K: std::hash::Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut out: Vec<T> = Vec::with_capacity(records.len());
    for record in records {
        match index.entry(key(&record)) {
            Entry::Occupied(slot) => out[*slot.get()] = record,
            Entry::Vacant(slot) => {
                slot.insert(out.len());
                out.push(record);
            }
        }
    }
    out
}

/// Local store rooted at a data directory
#[derive(Clone, Debug)]
pub struct JsonlStore {
    dir: PathBuf,
}

impl JsonlStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn exercises_path(&self) -> PathBuf {
        self.dir.join("exercises.jsonl")
    }

    pub fn sessions_path(&self) -> PathBuf {
        self.dir.join("sessions.jsonl")
    }

    pub fn sets_path(&self) -> PathBuf {
        self.dir.join("sets.jsonl")
    }

    pub fn archive_path(&self) -> PathBuf {
        self.dir.join("sets.csv")
    }

    pub fn add_exercise(&self, exercise: &Exercise) -> Result<()> {
        JsonlSink::new(self.exercises_path()).append(exercise)
    }

    /// Append a session; appending again with the same id replaces it
    pub fn put_session(&self, session: &WorkoutSession) -> Result<()> {
        JsonlSink::new(self.sessions_path()).append(session)
    }

    /// Validate and append a set
    pub fn log_set(&self, set: &LoggedSet) -> Result<()> {
        set.validate()?;
        JsonlSink::new(self.sets_path()).append(set)
    }

    /// All exercises keyed by id
    pub fn load_exercises(&self) -> Result<HashMap<String, Exercise>> {
        let exercises: Vec<Exercise> = read_records(&self.exercises_path())?;
        Ok(exercises.into_iter().map(|e| (e.id.clone(), e)).collect())
    }

    /// All sessions, latest version of each
    pub fn load_sessions(&self) -> Result<Vec<WorkoutSession>> {
        let sessions: Vec<WorkoutSession> = read_records(&self.sessions_path())?;
        Ok(last_write_wins(sessions, |s: &WorkoutSession| s.id))
    }

    pub fn find_session(&self, id: Uuid) -> Result<Option<WorkoutSession>> {
        Ok(self.load_sessions()?.into_iter().find(|s| s.id == id))
    }

    /// All valid sets from the log and the archive, deduplicated by id
    pub fn load_sets(&self) -> Result<Vec<LoggedSet>> {
        let mut seen_ids = HashSet::new();
        let mut sets = Vec::new();

        let logged: Vec<LoggedSet> = read_records(&self.sets_path())?;
        let archived = read_archive(&self.archive_path())?;

        for set in logged.into_iter().chain(archived) {
            if let Err(e) = set.validate() {
                tracing::warn!("Skipping stored set: {}", e);
                continue;
            }
            if seen_ids.insert(set.id) {
                sets.push(set);
            }
        }

        sets.sort_by(|a, b| a.logged_at.cmp(&b.logged_at));
        tracing::debug!("Loaded {} sets from {:?}", sets.len(), self.dir);
        Ok(sets)
    }

    fn join(&self, sets: Vec<LoggedSet>) -> Result<Vec<JoinedSet>> {
        let exercises = self.load_exercises()?;
        Ok(sets
            .into_iter()
            .map(|set| JoinedSet {
                exercise: exercises.get(&set.exercise_id).cloned(),
                set,
            })
            .collect())
    }
}

impl TrainingRepository for JsonlStore {
    fn list_completed_sessions(
        &self,
        user_id: &str,
        range: Option<&DateRange>,
    ) -> Result<Vec<WorkoutSession>> {
        let mut sessions: Vec<WorkoutSession> = self
            .load_sessions()?
            .into_iter()
            .filter(|s| s.user_id == user_id && s.is_completed())
            .filter(|s| range.map_or(true, |r| r.contains(&s.started_at)))
            .collect();

        sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(sessions)
    }

    fn list_sets(&self, query: &SetQuery, range: Option<&DateRange>) -> Result<Vec<JoinedSet>> {
        let sets: Vec<LoggedSet> = match query {
            SetQuery::Sessions(ids) => {
                let ids: HashSet<&Uuid> = ids.iter().collect();
                self.load_sets()?
                    .into_iter()
                    .filter(|s| ids.contains(&s.session_id))
                    .collect()
            }
            SetQuery::Exercise(exercise_id) => self
                .load_sets()?
                .into_iter()
                .filter(|s| &s.exercise_id == exercise_id)
                .collect(),
        };

        let sets = sets
            .into_iter()
            .filter(|s| range.map_or(true, |r| r.contains(&s.logged_at)))
            .collect();
        self.join(sets)
    }

    fn list_pr_sets(&self, user_id: &str, since: DateTime<Utc>) -> Result<Vec<JoinedSet>> {
        let session_ids: HashSet<Uuid> = self
            .list_completed_sessions(user_id, None)?
            .into_iter()
            .map(|s| s.id)
            .collect();

        let sets = self
            .load_sets()?
            .into_iter()
            .filter(|s| s.is_pr && s.logged_at >= since && session_ids.contains(&s.session_id))
            .collect();
        self.join(sets)
    }

    fn get_exercise(&self, id: &str) -> Result<Option<Exercise>> {
        Ok(self.load_exercises()?.remove(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Equipment, MuscleGroup, SetRole};
    use chrono::Duration;

    fn exercise(id: &str, group: MuscleGroup) -> Exercise {
        Exercise {
            id: id.into(),
            name: id.to_uppercase(),
            muscle_group: group,
            equipment: Equipment::Barbell,
        }
    }

    fn session(user: &str, hours_ago: i64, completed: bool) -> WorkoutSession {
        let started_at = Utc::now() - Duration::hours(hours_ago);
        WorkoutSession {
            id: Uuid::new_v4(),
            user_id: user.into(),
            started_at,
            ended_at: completed.then(|| started_at + Duration::hours(1)),
            split: None,
        }
    }

    fn set(session: &WorkoutSession, exercise_id: &str, is_pr: bool) -> LoggedSet {
        LoggedSet {
            id: Uuid::new_v4(),
            session_id: session.id,
            exercise_id: exercise_id.into(),
            weight: 100.0,
            reps: 5,
            role: SetRole::Working,
            is_pr,
            logged_at: session.started_at + Duration::minutes(5),
        }
    }

    #[test]
    fn test_append_and_read_records() {
        crate::logging::init_test();
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("exercises.jsonl");

        let mut sink = JsonlSink::new(&path);
        for i in 0..5 {
            sink.append(&exercise(&format!("ex{}", i), MuscleGroup::Back))
                .unwrap();
        }

        let records: Vec<Exercise> = read_records(&path).unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(records[0].id, "ex0");
    }

    #[test]
    fn test_concurrent_appends_and_reads_never_tear() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::new(temp_dir.path());
        let s = session("local", 1, true);
        let writers = 4;
        let per_writer = 50;

        std::thread::scope(|scope| {
            for _ in 0..writers {
                scope.spawn(|| {
                    for _ in 0..per_writer {
                        store.log_set(&set(&s, "bench", false)).unwrap();
                    }
                });
            }
            scope.spawn(|| {
                for _ in 0..20 {
                    let seen: Vec<LoggedSet> = read_records(&store.sets_path()).unwrap();
                    assert!(seen.len() <= writers * per_writer);
                }
            });
        });

        // Every line is whole: nothing was skipped as unparseable
        let contents = std::fs::read_to_string(store.sets_path()).unwrap();
        assert_eq!(contents.lines().count(), writers * per_writer);
        for line in contents.lines() {
            serde_json::from_str::<LoggedSet>(line).unwrap();
        }
        assert_eq!(store.load_sets().unwrap().len(), writers * per_writer);
    }

    #[test]
    fn test_read_missing_file_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let records: Vec<Exercise> =
            read_records(&temp_dir.path().join("nonexistent.jsonl")).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_corrupt_lines_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::new(temp_dir.path());
        store.add_exercise(&exercise("bench", MuscleGroup::Chest)).unwrap();

        let mut file = OpenOptions::new()
            .append(true)
            .open(store.exercises_path())
            .unwrap();
        writeln!(file, "{{ truncated").unwrap();
        drop(file);
        store.add_exercise(&exercise("row", MuscleGroup::Back)).unwrap();

        let exercises = store.load_exercises().unwrap();
        assert_eq!(exercises.len(), 2);
        assert!(exercises.contains_key("row"));
    }

    #[test]
    fn test_session_last_write_wins() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::new(temp_dir.path());

        let open = session("local", 2, false);
        store.put_session(&open).unwrap();
        assert!(store
            .list_completed_sessions("local", None)
            .unwrap()
            .is_empty());

        let finished = WorkoutSession {
            ended_at: Some(Utc::now()),
            ..open.clone()
        };
        store.put_session(&finished).unwrap();

        assert_eq!(store.load_sessions().unwrap().len(), 1);
        let completed = store.list_completed_sessions("local", None).unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, open.id);
    }

    #[test]
    fn test_completed_sessions_filtered_and_newest_first() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::new(temp_dir.path());

        let older = session("local", 48, true);
        let newer = session("local", 3, true);
        store.put_session(&older).unwrap();
        store.put_session(&newer).unwrap();
        store.put_session(&session("someone_else", 1, true)).unwrap();
        store.put_session(&session("local", 1, false)).unwrap();

        let sessions = store.list_completed_sessions("local", None).unwrap();
        let ids: Vec<Uuid> = sessions.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);

        let range = DateRange::new(Utc::now() - Duration::hours(24), Utc::now()).unwrap();
        let recent = store.list_completed_sessions("local", Some(&range)).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, newer.id);
    }

    #[test]
    fn test_invalid_sets_rejected_on_write_and_skipped_on_read() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::new(temp_dir.path());
        let s = session("local", 1, true);

        let mut bad = set(&s, "bench", false);
        bad.reps = 0;
        assert!(store.log_set(&bad).is_err());

        // Bypass validation to simulate a bad record written by another tool
        JsonlSink::new(store.sets_path()).append(&bad).unwrap();
        store.log_set(&set(&s, "bench", false)).unwrap();

        assert_eq!(store.load_sets().unwrap().len(), 1);
    }

    #[test]
    fn test_sets_deduplicated_across_log_and_archive() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::new(temp_dir.path());
        let s = session("local", 1, true);
        let archived = set(&s, "bench", false);

        store.log_set(&archived).unwrap();
        crate::archive::rollup_sets(&store.sets_path(), &store.archive_path()).unwrap();

        // Same set logged again after the rollup
        store.log_set(&archived).unwrap();
        store.log_set(&set(&s, "bench", false)).unwrap();

        let sets = store.load_sets().unwrap();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets.iter().filter(|x| x.id == archived.id).count(), 1);
    }

    #[test]
    fn test_list_sets_joins_exercises() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::new(temp_dir.path());
        store.add_exercise(&exercise("squat", MuscleGroup::Quads)).unwrap();

        let s = session("local", 1, true);
        let other = session("local", 30, true);
        store.log_set(&set(&s, "squat", false)).unwrap();
        store.log_set(&set(&s, "ghost", false)).unwrap();
        store.log_set(&set(&other, "squat", false)).unwrap();

        let by_session = store
            .list_sets(&SetQuery::Sessions(vec![s.id]), None)
            .unwrap();
        assert_eq!(by_session.len(), 2);
        assert!(by_session.iter().any(|j| j.exercise.is_none()));

        let by_exercise = store
            .list_sets(&SetQuery::Exercise("squat".into()), None)
            .unwrap();
        assert_eq!(by_exercise.len(), 2);
        assert!(by_exercise.iter().all(|j| j.exercise.is_some()));
        // Oldest first
        assert_eq!(by_exercise[0].set.session_id, other.id);
    }

    #[test]
    fn test_list_pr_sets_scoped_to_user_and_completed() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::new(temp_dir.path());

        let mine = session("local", 2, true);
        let open = session("local", 1, false);
        let theirs = session("other", 2, true);
        for s in [&mine, &open, &theirs] {
            store.put_session(s).unwrap();
            store.log_set(&set(s, "bench", true)).unwrap();
        }
        store.log_set(&set(&mine, "bench", false)).unwrap();

        let prs = store
            .list_pr_sets("local", Utc::now() - Duration::days(7))
            .unwrap();
        assert_eq!(prs.len(), 1);
        assert_eq!(prs[0].set.session_id, mine.id);
        assert!(prs[0].set.is_pr);
    }

    #[test]
    fn test_get_exercise() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::new(temp_dir.path());
        store.add_exercise(&exercise("deadlift", MuscleGroup::Hamstrings)).unwrap();

        // Re-adding replaces the earlier definition
        let renamed = Exercise {
            name: "Conventional Deadlift".into(),
            ..exercise("deadlift", MuscleGroup::Hamstrings)
        };
        store.add_exercise(&renamed).unwrap();

        assert_eq!(store.get_exercise("deadlift").unwrap(), Some(renamed));
        assert_eq!(store.get_exercise("missing").unwrap(), None);
    }
}
