use chrono::NaiveDate;
use puzzlesync::config::CommitMode;
use puzzlesync::core::normalize::Normalizer;
use puzzlesync::core::sync::BatchSync;
use puzzlesync::db::initialize::init_db;
use puzzlesync::db::pool::DbPool;
use puzzlesync::db::queries;
use puzzlesync::db::store::SqliteStore;
use serde_json::json;

mod common;
use common::{puzzle_raw, ts};

/// `crossword_stats` as a straight CSV export leaves it: no timestamps,
/// numbers stored as REAL, booleans as text.
fn legacy_db() -> DbPool {
    let pool = DbPool::in_memory().expect("in-memory db");
    pool.conn
        .execute_batch(
            r#"
            CREATE TABLE crossword_stats (
                puzzle_id            INTEGER PRIMARY KEY,
                title                TEXT,
                author               TEXT,
                editor               TEXT,
                format_type          TEXT,
                publish_type         TEXT,
                day_of_week_name     TEXT,
                day_of_week_integer  REAL,
                print_date           TEXT,
                version              REAL,
                percent_filled       REAL,
                solved               TEXT,
                star                 TEXT,
                solving_seconds      REAL
            );

            INSERT INTO crossword_stats VALUES
                (100, 'Puzzle 100', 'Joel Fagliano', 'Will Shortz', 'Normal', 'Mini', 'Monday',
                 1.0, '2024-03-04 00:00:00', 0.0, 100.0, 'True', 'Gold', 300.0),
                (101, 'Puzzle 101', NULL, NULL, 'Normal', 'Mini', 'Monday',
                 1.0, '2024-03-04', 0.0, 20.0, 'False', NULL, NULL);
            "#,
        )
        .expect("legacy schema");
    pool
}

#[test]
fn test_legacy_table_is_migrated_and_readable() {
    let pool = legacy_db();
    init_db(&pool.conn).expect("migrations");

    let state = queries::load_state(&pool.conn, 100)
        .expect("row readable")
        .expect("row present");
    assert_eq!(state.record.solving_seconds, Some(300));
    assert_eq!(state.record.version, 0);
    assert_eq!(state.record.day_of_week_integer, 1);
    assert!(state.record.solved);
    assert_eq!(
        state.record.print_date,
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    );
    assert_eq!(state.created_at, state.last_updated_at);

    let other = queries::load_state(&pool.conn, 101).unwrap().unwrap();
    assert!(!other.record.solved);
    assert_eq!(other.record.solving_seconds, None);

    let applied: i64 = pool
        .conn
        .query_row(
            "SELECT COUNT(*) FROM log WHERE operation = 'migration_applied'
             AND target IN ('0.2.0_stats_timestamps', '0.3.0_stats_value_types')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(applied, 2);
}

#[test]
fn test_sync_over_migrated_legacy_table() {
    let pool = legacy_db();
    init_db(&pool.conn).expect("migrations");

    let store = SqliteStore::new(&pool.conn, CommitMode::PerRecord);
    let normalizer = Normalizer::default();
    let mut same_as_stored = puzzle_raw(100, Some(450));
    same_as_stored.insert("percent_filled".into(), json!("100.0"));

    let report = BatchSync::new(&store, &normalizer, ts("2024-03-05T10:00:00Z"))
        .run(&[same_as_stored, puzzle_raw(101, None)]);

    assert_eq!(report.summary.errors, 0);
    assert_eq!(report.summary.updates_checked, 2);
    assert_eq!(report.summary.sessions_added, 1);

    let state = queries::load_state(&pool.conn, 100).unwrap().unwrap();
    assert_eq!(state.record.solving_seconds, Some(450));
    assert_eq!(queries::total_recorded_seconds(&pool.conn, 100).unwrap(), 450);
}

#[test]
fn test_migrations_are_idempotent() {
    let pool = legacy_db();
    init_db(&pool.conn).expect("first run");
    init_db(&pool.conn).expect("second run");

    let markers: i64 = pool
        .conn
        .query_row(
            "SELECT COUNT(*) FROM log WHERE operation = 'migration_applied'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    // timestamps, value types, sessions table
    assert_eq!(markers, 3);
}
