use crate::ui::messages::{success, warning};
use crate::utils::time::{now_utc, to_db_timestamp};
use rusqlite::{Connection, OptionalExtension, Result};

/// Ensure that the `log` table exists.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
    let exists: Option<String> = stmt.query_row([name], |row| row.get(0)).optional()?;
    Ok(exists.is_some())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{table}')"))?;
    let cols = stmt.query_map([], |row| row.get::<_, String>(1))?;

    for c in cols {
        if c? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn migration_applied(conn: &Connection, version: &str) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM log WHERE operation = 'migration_applied' AND target = ?1 LIMIT 1",
            [version],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (?1, 'migration_applied', ?2, ?3)",
        [to_db_timestamp(&now_utc()).as_str(), version, message],
    )?;
    Ok(())
}

/// Create the `crossword_stats` table (current state, one row per puzzle).
fn create_stats_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS crossword_stats (
            puzzle_id            INTEGER PRIMARY KEY,
            title                TEXT,
            author               TEXT,
            editor               TEXT,
            format_type          TEXT NOT NULL,
            publish_type         TEXT NOT NULL,
            day_of_week_name     TEXT NOT NULL,
            day_of_week_integer  INTEGER NOT NULL,
            print_date           TEXT NOT NULL,
            version              INTEGER NOT NULL,
            percent_filled       REAL NOT NULL,
            solved               INTEGER NOT NULL CHECK(solved IN (0, 1)),
            star                 TEXT,
            solving_seconds      INTEGER CHECK(solving_seconds IS NULL OR solving_seconds >= 0),
            created_at           TEXT NOT NULL,
            last_updated_at      TEXT NOT NULL,
            CHECK(last_updated_at >= created_at)
        );

        CREATE INDEX IF NOT EXISTS idx_stats_print_date ON crossword_stats(print_date);
        "#,
    )?;
    Ok(())
}

/// Create the append-only `puzzle_sessions` table.
fn create_sessions_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS puzzle_sessions (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            puzzle_id        INTEGER NOT NULL REFERENCES crossword_stats(puzzle_id),
            session_date     TEXT NOT NULL,
            solving_seconds  INTEGER NOT NULL CHECK(solving_seconds > 0)
        );

        CREATE INDEX IF NOT EXISTS idx_sessions_puzzle ON puzzle_sessions(puzzle_id);
        "#,
    )?;
    Ok(())
}

/// Stats tables copied straight from a CSV export have no timestamps.
/// Add them and stamp existing rows with the migration time.
fn migrate_add_timestamp_columns(conn: &Connection) -> Result<()> {
    let version = "0.2.0_stats_timestamps";

    if migration_applied(conn, version)? {
        return Ok(());
    }

    let has_created = table_has_column(conn, "crossword_stats", "created_at")?;
    let has_updated = table_has_column(conn, "crossword_stats", "last_updated_at")?;

    if has_created && has_updated {
        return Ok(());
    }

    warning("Adding timestamp columns to crossword_stats...");

    let now = to_db_timestamp(&now_utc());

    if !has_created {
        conn.execute_batch(
            "ALTER TABLE crossword_stats ADD COLUMN created_at TEXT NOT NULL DEFAULT '';",
        )?;
    }
    if !has_updated {
        conn.execute_batch(
            "ALTER TABLE crossword_stats ADD COLUMN last_updated_at TEXT NOT NULL DEFAULT '';",
        )?;
    }

    conn.execute(
        "UPDATE crossword_stats SET created_at = ?1 WHERE created_at = ''",
        [&now],
    )?;
    conn.execute(
        "UPDATE crossword_stats SET last_updated_at = created_at WHERE last_updated_at = ''",
        [],
    )?;

    mark_applied(conn, version, "Added created_at/last_updated_at to crossword_stats")?;

    success(format!(
        "Migration applied: {} → timestamps added to crossword_stats",
        version
    ));

    Ok(())
}

/// Legacy tables loaded from a CSV export carry whatever types the export
/// produced: REAL integers (a blank cell turns the whole column into floats),
/// "True"/"False" text, full timestamps as print dates. Coerce them to the
/// types `crossword_stats` is read back with.
fn migrate_coerce_legacy_values(conn: &Connection) -> Result<()> {
    let version = "0.3.0_stats_value_types";

    if migration_applied(conn, version)? {
        return Ok(());
    }

    let mut fixed = 0;

    for col in ["day_of_week_integer", "version", "solved", "solving_seconds"] {
        fixed += conn.execute(
            &format!(
                "UPDATE crossword_stats SET {col} = CAST({col} AS INTEGER)
                 WHERE typeof({col}) = 'real'"
            ),
            [],
        )?;
    }

    fixed += conn.execute(
        "UPDATE crossword_stats
         SET solved = CASE lower(trim(solved)) WHEN 'true' THEN 1 WHEN '1' THEN 1 ELSE 0 END
         WHERE typeof(solved) = 'text'",
        [],
    )?;

    // negative cumulative times mean "unknown"
    fixed += conn.execute(
        "UPDATE crossword_stats SET solving_seconds = NULL WHERE solving_seconds < 0",
        [],
    )?;

    fixed += conn.execute(
        "UPDATE crossword_stats SET print_date = substr(print_date, 1, 10)
         WHERE length(print_date) > 10",
        [],
    )?;

    mark_applied(
        conn,
        version,
        &format!("Coerced {fixed} legacy values in crossword_stats"),
    )?;

    if fixed > 0 {
        success(format!(
            "Migration applied: {} → {} legacy values coerced in crossword_stats",
            version, fixed
        ));
    }

    Ok(())
}

/// Public entry point: run all pending migrations.
///
/// Invocata da db::initialize::init_db() e da `db --migrate`.
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    // 1) Ensure log table
    ensure_log_table(conn)?;

    // 2) Current-state table, fresh or legacy
    if !table_exists(conn, "crossword_stats")? {
        create_stats_table(conn)?;
        mark_applied(conn, "0.1.0_stats", "Created crossword_stats table")?;
        success("Created crossword_stats table.");
    } else {
        migrate_add_timestamp_columns(conn)?;
        migrate_coerce_legacy_values(conn)?;
        conn.execute_batch(
            "CREATE INDEX IF NOT EXISTS idx_stats_print_date ON crossword_stats(print_date);",
        )?;
    }

    // 3) Session log
    if !table_exists(conn, "puzzle_sessions")? {
        create_sessions_table(conn)?;
        mark_applied(conn, "0.1.0_sessions", "Created puzzle_sessions table")?;
        success("Created puzzle_sessions table.");
    }

    Ok(())
}
