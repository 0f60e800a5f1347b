//! Storage seam used by the reconciliation engine.
//!
//! The engine only talks to [`PuzzleStore`]; [`SqliteStore`] is the
//! rusqlite-backed implementation used by the CLI. Every record is processed
//! inside its own unit of work (`begin_record` / `commit_record` /
//! `rollback_record`), so a failure never leaks partial writes into the
//! next record.

use crate::config::CommitMode;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::puzzle::PuzzleState;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, ErrorCode};

/// Everything the engine needs to know about a puzzle before deciding, read once.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub state: Option<PuzzleState>,
    /// Sum of every recorded session; 0 when there is none.
    pub recorded_total: i64,
}

pub trait PuzzleStore {
    fn get_state(&self, puzzle_id: i64) -> AppResult<Option<PuzzleState>>;

    fn get_total_recorded_seconds(&self, puzzle_id: i64) -> AppResult<i64>;

    fn load_snapshot(&self, puzzle_id: i64) -> AppResult<Snapshot> {
        Ok(Snapshot {
            state: self.get_state(puzzle_id)?,
            recorded_total: self.get_total_recorded_seconds(puzzle_id)?,
        })
    }

    /// Fails with `RaceCondition` if the puzzle appeared since it was read.
    fn insert_state(&self, state: &PuzzleState) -> AppResult<()>;

    /// Fails with `RaceCondition` if the stored `last_updated_at` no longer
    /// matches `expected_last_updated_at`.
    fn update_state(
        &self,
        state: &PuzzleState,
        expected_last_updated_at: DateTime<Utc>,
    ) -> AppResult<()>;

    fn insert_session(
        &self,
        puzzle_id: i64,
        session_date: DateTime<Utc>,
        solving_seconds: i64,
    ) -> AppResult<()>;

    fn begin_record(&self) -> AppResult<()>;

    fn commit_record(&self) -> AppResult<()>;

    fn rollback_record(&self) -> AppResult<()>;
}

const RECORD_SAVEPOINT: &str = "puzzle_record";

/// SQLite store bound to one connection for the duration of a batch run.
pub struct SqliteStore<'c> {
    conn: &'c Connection,
    mode: CommitMode,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection, mode: CommitMode) -> Self {
        Self { conn, mode }
    }

    pub fn mode(&self) -> CommitMode {
        self.mode
    }

    /// Open the run-wide transaction (batch mode only).
    pub fn begin_batch(&self) -> AppResult<()> {
        if self.mode == CommitMode::Batch {
            self.conn.execute_batch("BEGIN IMMEDIATE;")?;
        }
        Ok(())
    }

    pub fn commit_batch(&self) -> AppResult<()> {
        if self.mode == CommitMode::Batch {
            self.conn.execute_batch("COMMIT;")?;
        }
        Ok(())
    }

    pub fn rollback_batch(&self) -> AppResult<()> {
        if self.mode == CommitMode::Batch && !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK;")?;
        }
        Ok(())
    }
}

fn is_primary_key_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(f, _)
            if f.code == ErrorCode::ConstraintViolation
                && f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

impl PuzzleStore for SqliteStore<'_> {
    fn get_state(&self, puzzle_id: i64) -> AppResult<Option<PuzzleState>> {
        queries::load_state(self.conn, puzzle_id)
    }

    fn get_total_recorded_seconds(&self, puzzle_id: i64) -> AppResult<i64> {
        queries::total_recorded_seconds(self.conn, puzzle_id)
    }

    fn insert_state(&self, state: &PuzzleState) -> AppResult<()> {
        match queries::insert_state(self.conn, state) {
            Err(AppError::Db(e)) if is_primary_key_violation(&e) => Err(AppError::RaceCondition {
                puzzle_id: state.puzzle_id(),
                detail: "row inserted by another writer".to_string(),
            }),
            other => other,
        }
    }

    fn update_state(
        &self,
        state: &PuzzleState,
        expected_last_updated_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let touched = queries::update_state_if_unchanged(self.conn, state, &expected_last_updated_at)?;
        if touched == 0 {
            return Err(AppError::RaceCondition {
                puzzle_id: state.puzzle_id(),
                detail: "row changed since it was read".to_string(),
            });
        }
        Ok(())
    }

    fn insert_session(
        &self,
        puzzle_id: i64,
        session_date: DateTime<Utc>,
        solving_seconds: i64,
    ) -> AppResult<()> {
        queries::insert_session(self.conn, puzzle_id, &session_date, solving_seconds)
    }

    fn begin_record(&self) -> AppResult<()> {
        match self.mode {
            // IMMEDIATE takes the write lock before the snapshot read
            CommitMode::PerRecord => self.conn.execute_batch("BEGIN IMMEDIATE;")?,
            CommitMode::Batch => self
                .conn
                .execute_batch(&format!("SAVEPOINT {RECORD_SAVEPOINT};"))?,
        }
        Ok(())
    }

    fn commit_record(&self) -> AppResult<()> {
        match self.mode {
            CommitMode::PerRecord => self.conn.execute_batch("COMMIT;")?,
            CommitMode::Batch => self
                .conn
                .execute_batch(&format!("RELEASE SAVEPOINT {RECORD_SAVEPOINT};"))?,
        }
        Ok(())
    }

    fn rollback_record(&self) -> AppResult<()> {
        if self.conn.is_autocommit() {
            return Ok(());
        }
        match self.mode {
            CommitMode::PerRecord => self.conn.execute_batch("ROLLBACK;")?,
            CommitMode::Batch => self.conn.execute_batch(&format!(
                "ROLLBACK TO SAVEPOINT {RECORD_SAVEPOINT}; RELEASE SAVEPOINT {RECORD_SAVEPOINT};"
            ))?,
        }
        Ok(())
    }
}
