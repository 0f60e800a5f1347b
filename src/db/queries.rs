use crate::errors::{AppError, AppResult};
use crate::models::puzzle::{PuzzleRecord, PuzzleState};
use crate::models::session::SolvingSession;
use crate::utils::time::{parse_db_timestamp, to_db_timestamp};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

const STATE_COLUMNS: &str = "puzzle_id, title, author, editor, format_type, publish_type,
     day_of_week_name, day_of_week_integer, print_date, version, percent_filled,
     solved, star, solving_seconds, created_at, last_updated_at";

fn conversion_error(col: &str, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(AppError::Persistence(format!(
            "invalid value for {col}: '{value}'"
        ))),
    )
}

fn timestamp_col(row: &Row, col: &str) -> Result<DateTime<Utc>> {
    let raw: String = row.get(col)?;
    parse_db_timestamp(&raw).ok_or_else(|| conversion_error(col, &raw))
}

pub fn map_state_row(row: &Row) -> Result<PuzzleState> {
    let date_str: String = row.get("print_date")?;
    let print_date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .map_err(|_| conversion_error("print_date", &date_str))?;

    Ok(PuzzleState {
        record: PuzzleRecord {
            puzzle_id: row.get("puzzle_id")?,
            title: row.get("title")?,
            author: row.get("author")?,
            editor: row.get("editor")?,
            format_type: row.get("format_type")?,
            publish_type: row.get("publish_type")?,
            day_of_week_name: row.get("day_of_week_name")?,
            day_of_week_integer: row.get("day_of_week_integer")?,
            print_date,
            version: row.get("version")?,
            percent_filled: row.get("percent_filled")?,
            solved: row.get::<_, i64>("solved")? != 0,
            star: row.get("star")?,
            solving_seconds: row.get("solving_seconds")?,
        },
        created_at: timestamp_col(row, "created_at")?,
        last_updated_at: timestamp_col(row, "last_updated_at")?,
    })
}

pub fn map_session_row(row: &Row) -> Result<SolvingSession> {
    Ok(SolvingSession {
        id: row.get("id")?,
        puzzle_id: row.get("puzzle_id")?,
        session_date: timestamp_col(row, "session_date")?,
        solving_seconds: row.get("solving_seconds")?,
    })
}

pub fn load_state(conn: &Connection, puzzle_id: i64) -> AppResult<Option<PuzzleState>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {STATE_COLUMNS} FROM crossword_stats WHERE puzzle_id = ?1"
    ))?;
    let state = stmt.query_row([puzzle_id], map_state_row).optional()?;
    Ok(state)
}

pub fn total_recorded_seconds(conn: &Connection, puzzle_id: i64) -> AppResult<i64> {
    let total: i64 = conn.query_row(
        "SELECT COALESCE(SUM(solving_seconds), 0) FROM puzzle_sessions WHERE puzzle_id = ?1",
        [puzzle_id],
        |row| row.get(0),
    )?;
    Ok(total)
}

pub fn insert_state(conn: &Connection, state: &PuzzleState) -> AppResult<()> {
    let r = &state.record;
    conn.execute(
        &format!(
            "INSERT INTO crossword_stats ({STATE_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
        ),
        params![
            r.puzzle_id,
            r.title,
            r.author,
            r.editor,
            r.format_type,
            r.publish_type,
            r.day_of_week_name,
            r.day_of_week_integer,
            r.print_date_str(),
            r.version,
            r.percent_filled,
            if r.solved { 1 } else { 0 },
            r.star,
            r.solving_seconds,
            to_db_timestamp(&state.created_at),
            to_db_timestamp(&state.last_updated_at),
        ],
    )?;
    Ok(())
}

/// Overwrite every mutable column, but only if the row still carries the
/// `last_updated_at` we read. Returns the number of rows touched (0 or 1).
pub fn update_state_if_unchanged(
    conn: &Connection,
    state: &PuzzleState,
    expected_last_updated_at: &DateTime<Utc>,
) -> AppResult<usize> {
    let r = &state.record;
    let n = conn.execute(
        "UPDATE crossword_stats
         SET title = ?2, author = ?3, editor = ?4,
             format_type = ?5, publish_type = ?6,
             day_of_week_name = ?7, day_of_week_integer = ?8,
             print_date = ?9, version = ?10, percent_filled = ?11,
             solved = ?12, star = ?13, solving_seconds = ?14,
             last_updated_at = ?15
         WHERE puzzle_id = ?1 AND last_updated_at = ?16",
        params![
            r.puzzle_id,
            r.title,
            r.author,
            r.editor,
            r.format_type,
            r.publish_type,
            r.day_of_week_name,
            r.day_of_week_integer,
            r.print_date_str(),
            r.version,
            r.percent_filled,
            if r.solved { 1 } else { 0 },
            r.star,
            r.solving_seconds,
            to_db_timestamp(&state.last_updated_at),
            to_db_timestamp(expected_last_updated_at),
        ],
    )?;
    Ok(n)
}

pub fn insert_session(
    conn: &Connection,
    puzzle_id: i64,
    session_date: &DateTime<Utc>,
    solving_seconds: i64,
) -> AppResult<()> {
    conn.execute(
        "INSERT INTO puzzle_sessions (puzzle_id, session_date, solving_seconds)
         VALUES (?1, ?2, ?3)",
        params![puzzle_id, to_db_timestamp(session_date), solving_seconds],
    )?;
    Ok(())
}

pub fn load_sessions(conn: &Connection, puzzle_id: i64) -> AppResult<Vec<SolvingSession>> {
    let mut stmt = conn.prepare(
        "SELECT id, puzzle_id, session_date, solving_seconds
         FROM puzzle_sessions
         WHERE puzzle_id = ?1
         ORDER BY id ASC",
    )?;

    let rows = stmt.query_map([puzzle_id], map_session_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Every stored puzzle with its session count and recorded seconds, by print date.
pub fn load_states_with_totals(conn: &Connection) -> AppResult<Vec<(PuzzleState, usize, i64)>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {STATE_COLUMNS},
                (SELECT COUNT(*) FROM puzzle_sessions s WHERE s.puzzle_id = c.puzzle_id) AS session_count,
                (SELECT COALESCE(SUM(s.solving_seconds), 0) FROM puzzle_sessions s
                  WHERE s.puzzle_id = c.puzzle_id) AS recorded_total
         FROM crossword_stats c
         ORDER BY print_date ASC, puzzle_id ASC"
    ))?;

    let rows = stmt.query_map([], |row| {
        let state = map_state_row(row)?;
        let count: i64 = row.get("session_count")?;
        let total: i64 = row.get("recorded_total")?;
        Ok((state, count as usize, total))
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
