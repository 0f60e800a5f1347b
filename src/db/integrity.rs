//! Consistency checks over `crossword_stats` and `puzzle_sessions`.

use crate::errors::AppResult;
use rusqlite::Connection;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Recorded sessions add up to more than the stored cumulative time.
    /// Expected after an out-of-order observation, suspicious otherwise.
    SessionsExceedCumulative {
        puzzle_id: i64,
        recorded: i64,
        cumulative: Option<i64>,
    },
    NonPositiveSession {
        session_id: i64,
        puzzle_id: i64,
        solving_seconds: i64,
    },
    /// Session whose puzzle has no `crossword_stats` row.
    OrphanSession { session_id: i64, puzzle_id: i64 },
}

impl Violation {
    pub fn puzzle_id(&self) -> i64 {
        match self {
            Violation::SessionsExceedCumulative { puzzle_id, .. }
            | Violation::NonPositiveSession { puzzle_id, .. }
            | Violation::OrphanSession { puzzle_id, .. } => *puzzle_id,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::SessionsExceedCumulative {
                puzzle_id,
                recorded,
                cumulative: Some(c),
            } => write!(
                f,
                "puzzle {puzzle_id}: sessions record {recorded}s, stored cumulative is {c}s"
            ),
            Violation::SessionsExceedCumulative {
                puzzle_id,
                recorded,
                cumulative: None,
            } => write!(
                f,
                "puzzle {puzzle_id}: sessions record {recorded}s, stored cumulative is unknown"
            ),
            Violation::NonPositiveSession {
                session_id,
                puzzle_id,
                solving_seconds,
            } => write!(
                f,
                "puzzle {puzzle_id}: session #{session_id} has {solving_seconds}s"
            ),
            Violation::OrphanSession {
                session_id,
                puzzle_id,
            } => write!(
                f,
                "puzzle {puzzle_id}: session #{session_id} has no stats row"
            ),
        }
    }
}

/// Every accounting violation, ordered by puzzle id.
pub fn check_session_accounting(conn: &Connection) -> AppResult<Vec<Violation>> {
    let mut out = Vec::new();

    // 1️⃣ sum of sessions vs stored cumulative
    let mut stmt = conn.prepare(
        "SELECT c.puzzle_id, SUM(s.solving_seconds), c.solving_seconds
         FROM crossword_stats c
         JOIN puzzle_sessions s ON s.puzzle_id = c.puzzle_id
         GROUP BY c.puzzle_id
         HAVING c.solving_seconds IS NULL OR SUM(s.solving_seconds) > c.solving_seconds",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Violation::SessionsExceedCumulative {
            puzzle_id: row.get(0)?,
            recorded: row.get(1)?,
            cumulative: row.get(2)?,
        })
    })?;
    for r in rows {
        out.push(r?);
    }

    // 2️⃣ sessions that are not a positive amount of time
    let mut stmt = conn.prepare(
        "SELECT id, puzzle_id, solving_seconds FROM puzzle_sessions WHERE solving_seconds <= 0",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Violation::NonPositiveSession {
            session_id: row.get(0)?,
            puzzle_id: row.get(1)?,
            solving_seconds: row.get(2)?,
        })
    })?;
    for r in rows {
        out.push(r?);
    }

    // 3️⃣ sessions without a puzzle
    let mut stmt = conn.prepare(
        "SELECT s.id, s.puzzle_id
         FROM puzzle_sessions s
         LEFT JOIN crossword_stats c ON c.puzzle_id = s.puzzle_id
         WHERE c.puzzle_id IS NULL",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Violation::OrphanSession {
            session_id: row.get(0)?,
            puzzle_id: row.get(1)?,
        })
    })?;
    for r in rows {
        out.push(r?);
    }

    out.sort_by_key(Violation::puzzle_id);
    Ok(out)
}
