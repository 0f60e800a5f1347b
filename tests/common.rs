#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::{DateTime, Utc};
use puzzlesync::db::store::PuzzleStore;
use puzzlesync::errors::{AppError, AppResult};
use puzzlesync::models::puzzle::PuzzleState;
use puzzlesync::models::raw::RawRecord;
use puzzlesync::models::session::SolvingSession;
use serde_json::{Value, json};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn pzs() -> Command {
    cargo_bin_cmd!("puzzlesync")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_puzzlesync.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Empty HOME for CLI runs, so no real config file is picked up
pub fn temp_home(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_puzzlesync_home", name));
    fs::remove_dir_all(&path).ok();
    fs::create_dir_all(&path).expect("create temp home");
    path.to_string_lossy().to_string()
}

/// Write `content` to a temp file and return its path
pub fn temp_input(name: &str, ext: &str, content: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_input.{}", name, ext));
    fs::write(&path, content).expect("write temp input");
    path.to_string_lossy().to_string()
}

/// Like `temp_input`, for content that is not valid UTF-8
pub fn temp_input_bytes(name: &str, ext: &str, content: &[u8]) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_input.{}", name, ext));
    fs::write(&path, content).expect("write temp input");
    path.to_string_lossy().to_string()
}

pub fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

pub fn raw(value: Value) -> RawRecord {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

/// A complete, valid record as a CSV export would deliver it (all strings).
pub fn puzzle_raw(puzzle_id: i64, solving_seconds: Option<i64>) -> RawRecord {
    raw(json!({
        "puzzle_id": puzzle_id.to_string(),
        "title": format!("Puzzle {puzzle_id}"),
        "author": "Joel Fagliano",
        "editor": "Will Shortz",
        "format_type": "Normal",
        "publish_type": "Mini",
        "day_of_week_name": "Monday",
        "day_of_week_integer": "1",
        "print_date": "2024-03-04",
        "version": "0",
        "percent_filled": "100",
        "solved": "True",
        "star": "Gold",
        "solving_seconds": solving_seconds.map(|s| s.to_string()).unwrap_or_default(),
    }))
}

pub const CSV_HEADER: &str = "puzzle_id,title,author,editor,format_type,publish_type,day_of_week_name,day_of_week_integer,print_date,version,percent_filled,solved,star,solving_seconds";

pub fn csv_row(puzzle_id: &str, solving_seconds: &str) -> String {
    format!(
        "{puzzle_id},Daily {puzzle_id},Jane Doe,Will Shortz,Normal,Daily,Tuesday,2,2024-03-05,1,100.0,True,,{solving_seconds}"
    )
}

#[derive(Default, Clone)]
struct Tables {
    states: HashMap<i64, PuzzleState>,
    sessions: Vec<SolvingSession>,
}

/// In-memory `PuzzleStore` with failure injection.
#[derive(Default)]
pub struct MemoryStore {
    tables: RefCell<Tables>,
    savepoint: RefCell<Option<Tables>>,
    /// Puzzles whose session insert fails with a persistence error.
    pub failing_sessions: RefCell<HashSet<i64>>,
    /// Number of upcoming `update_state` calls that report a race.
    pub races_left: Cell<usize>,
    pub snapshot_reads: Cell<usize>,
}

impl MemoryStore {
    pub fn state(&self, puzzle_id: i64) -> Option<PuzzleState> {
        self.tables.borrow().states.get(&puzzle_id).cloned()
    }

    pub fn sessions(&self, puzzle_id: i64) -> Vec<SolvingSession> {
        self.tables
            .borrow()
            .sessions
            .iter()
            .filter(|s| s.puzzle_id == puzzle_id)
            .cloned()
            .collect()
    }

    pub fn all_sessions(&self) -> Vec<SolvingSession> {
        self.tables.borrow().sessions.clone()
    }

    pub fn recorded_total(&self, puzzle_id: i64) -> i64 {
        self.sessions(puzzle_id)
            .iter()
            .map(|s| s.solving_seconds)
            .sum()
    }
}

impl PuzzleStore for MemoryStore {
    fn get_state(&self, puzzle_id: i64) -> AppResult<Option<PuzzleState>> {
        self.snapshot_reads.set(self.snapshot_reads.get() + 1);
        Ok(self.state(puzzle_id))
    }

    fn get_total_recorded_seconds(&self, puzzle_id: i64) -> AppResult<i64> {
        Ok(self.recorded_total(puzzle_id))
    }

    fn insert_state(&self, state: &PuzzleState) -> AppResult<()> {
        let mut t = self.tables.borrow_mut();
        if t.states.contains_key(&state.puzzle_id()) {
            return Err(AppError::RaceCondition {
                puzzle_id: state.puzzle_id(),
                detail: "already present".to_string(),
            });
        }
        t.states.insert(state.puzzle_id(), state.clone());
        Ok(())
    }

    fn update_state(
        &self,
        state: &PuzzleState,
        expected_last_updated_at: DateTime<Utc>,
    ) -> AppResult<()> {
        if self.races_left.get() > 0 {
            self.races_left.set(self.races_left.get() - 1);
            return Err(AppError::RaceCondition {
                puzzle_id: state.puzzle_id(),
                detail: "injected".to_string(),
            });
        }

        let mut t = self.tables.borrow_mut();
        match t.states.get_mut(&state.puzzle_id()) {
            Some(stored) if stored.last_updated_at == expected_last_updated_at => {
                *stored = state.clone();
                Ok(())
            }
            _ => Err(AppError::RaceCondition {
                puzzle_id: state.puzzle_id(),
                detail: "stale".to_string(),
            }),
        }
    }

    fn insert_session(
        &self,
        puzzle_id: i64,
        session_date: DateTime<Utc>,
        solving_seconds: i64,
    ) -> AppResult<()> {
        if self.failing_sessions.borrow().contains(&puzzle_id) {
            return Err(AppError::Persistence("connection lost".to_string()));
        }
        if solving_seconds <= 0 {
            return Err(AppError::Persistence("CHECK solving_seconds > 0".to_string()));
        }

        let mut t = self.tables.borrow_mut();
        if !t.states.contains_key(&puzzle_id) {
            return Err(AppError::Persistence("FOREIGN KEY constraint failed".to_string()));
        }
        let id = t.sessions.len() as i64 + 1;
        t.sessions.push(SolvingSession {
            id,
            puzzle_id,
            session_date,
            solving_seconds,
        });
        Ok(())
    }

    fn begin_record(&self) -> AppResult<()> {
        *self.savepoint.borrow_mut() = Some(self.tables.borrow().clone());
        Ok(())
    }

    fn commit_record(&self) -> AppResult<()> {
        self.savepoint.borrow_mut().take();
        Ok(())
    }

    fn rollback_record(&self) -> AppResult<()> {
        if let Some(saved) = self.savepoint.borrow_mut().take() {
            *self.tables.borrow_mut() = saved;
        }
        Ok(())
    }
}
