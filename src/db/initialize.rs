//! Schema bootstrap for a puzzlesync database.

use crate::db::migrate::run_pending_migrations;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use rusqlite::{Connection, OptionalExtension};

/// Tables every command expects once `init_db` has run.
pub const REQUIRED_TABLES: [&str; 3] = ["log", "crossword_stats", "puzzle_sessions"];

/// Bring `conn` to the current schema.
///
/// Migrations already marked in `log` are skipped, so this is called before
/// every command that reads or writes puzzles.
pub fn init_db(conn: &Connection) -> AppResult<()> {
    run_pending_migrations(conn)?;
    Ok(())
}

/// Open the database at `path` (foreign keys on) with the schema in place.
pub fn open_ready(path: &str) -> AppResult<DbPool> {
    let pool = DbPool::new(path)?;
    init_db(&pool.conn)?;
    Ok(pool)
}

/// Required tables that do not exist (yet) in `conn`.
pub fn missing_tables(conn: &Connection) -> AppResult<Vec<&'static str>> {
    let mut stmt =
        conn.prepare_cached("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")?;

    let mut missing = Vec::new();
    for table in REQUIRED_TABLES {
        let found: Option<i64> = stmt.query_row([table], |row| row.get(0)).optional()?;
        if found.is_none() {
            missing.push(table);
        }
    }
    Ok(missing)
}
