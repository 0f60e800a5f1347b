//! Batch orchestration: one unit of work per record, failures isolated.

use crate::config::CommitMode;
use crate::core::delta::{SessionDelta, compute_delta};
use crate::core::normalize::Normalizer;
use crate::core::reconcile::reconcile;
use crate::db::initialize::init_db;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::store::{PuzzleStore, SqliteStore};
use crate::errors::{AppError, AppResult};
use crate::models::puzzle::PuzzleRecord;
use crate::models::raw::{InputRow, RawRecord, payload, puzzle_id_hint};
use crate::models::summary::{BatchReport, RecordFailure, RecordLog, RecordOutcome, StateAction};
use crate::ui::messages::{error, info, success, warning};
use crate::utils::time::now_utc;
use chrono::{DateTime, Utc};
use rusqlite::Connection;

/// Reconcile one normalized record against the store.
///
/// Reads the snapshot once, then writes the state row before the session row
/// so the session's foreign key always resolves. Nothing is written for a
/// NOOP without new solving time.
pub fn process_record<S: PuzzleStore + ?Sized>(
    store: &S,
    record: &PuzzleRecord,
    now: DateTime<Utc>,
) -> AppResult<RecordOutcome> {
    let snapshot = store.load_snapshot(record.puzzle_id)?;

    let delta = compute_delta(
        record.puzzle_id,
        record.solving_seconds,
        snapshot.recorded_total,
    );
    let decision = reconcile(snapshot.state.as_ref(), record, now);

    match decision.action {
        StateAction::Insert => store.insert_state(&decision.state)?,
        StateAction::Update => {
            let expected = decision.expected_last_updated_at.ok_or_else(|| {
                AppError::Persistence(format!(
                    "update of puzzle {} without a stored row",
                    record.puzzle_id
                ))
            })?;
            store.update_state(&decision.state, expected)?;
        }
        StateAction::Noop => {}
    }

    let session_seconds = match delta {
        SessionDelta::Session(session) => {
            store.insert_session(session.puzzle_id, now, session.solving_seconds)?;
            Some(session.solving_seconds)
        }
        SessionDelta::NoSessionNeeded => None,
    };

    Ok(RecordOutcome {
        puzzle_id: record.puzzle_id,
        action: decision.action,
        changed_fields: decision.changed_fields,
        session_seconds,
    })
}

/// One batch run over a store. `now` is read once by the caller and shared
/// by every record, so all sessions and updates of a run carry the same stamp.
pub struct BatchSync<'a, S: PuzzleStore + ?Sized> {
    store: &'a S,
    normalizer: &'a Normalizer,
    now: DateTime<Utc>,
}

impl<'a, S: PuzzleStore + ?Sized> BatchSync<'a, S> {
    pub fn new(store: &'a S, normalizer: &'a Normalizer, now: DateTime<Utc>) -> Self {
        Self {
            store,
            normalizer,
            now,
        }
    }

    /// Process every record in order. Never fails: record errors are counted
    /// and reported in the returned entries.
    pub fn run(&self, records: &[RawRecord]) -> BatchReport {
        let mut report = BatchReport::default();
        for raw in records {
            self.push_record(&mut report, raw);
        }
        report
    }

    /// Like [`BatchSync::run`], over rows as read from a file. Unreadable
    /// rows become failed entries in place.
    pub fn run_rows(&self, rows: &[InputRow]) -> BatchReport {
        let mut report = BatchReport::default();

        for row in rows {
            match row {
                InputRow::Record(raw) => self.push_record(&mut report, raw),
                InputRow::Unreadable {
                    line,
                    reason,
                    content,
                } => {
                    let e = AppError::Input(format!("unreadable row at line {line}: {reason}"));
                    report.summary.errors += 1;
                    report.entries.push(RecordLog::Failed(RecordFailure {
                        puzzle_id: None,
                        error: e.to_string(),
                        payload: content.clone(),
                    }));
                }
            }
        }

        report
    }

    fn push_record(&self, report: &mut BatchReport, raw: &RawRecord) {
        match self.run_one(raw) {
            Ok(outcome) => {
                report.summary.record(&outcome);
                report.entries.push(RecordLog::Done(outcome));
            }
            Err(e) => {
                report.summary.errors += 1;
                report.entries.push(RecordLog::Failed(RecordFailure {
                    puzzle_id: puzzle_id_hint(raw),
                    error: e.to_string(),
                    payload: payload(raw),
                }));
            }
        }
    }

    fn run_one(&self, raw: &RawRecord) -> AppResult<RecordOutcome> {
        let record = self.normalizer.normalize(raw)?;

        match self.attempt(&record) {
            // one retry: the second attempt re-reads the row it lost against
            Err(AppError::RaceCondition { .. }) => self.attempt(&record),
            other => other,
        }
    }

    fn attempt(&self, record: &PuzzleRecord) -> AppResult<RecordOutcome> {
        self.store.begin_record()?;

        let result = process_record(self.store, record, self.now).and_then(|outcome| {
            self.store.commit_record()?;
            Ok(outcome)
        });

        if result.is_err()
            && let Err(e) = self.store.rollback_record()
        {
            warning(format!(
                "Rollback for puzzle_id {} failed: {}",
                record.puzzle_id, e
            ));
        }

        result
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    pub commit_mode: CommitMode,
    /// Run everything in one transaction and roll it back at the end.
    pub dry_run: bool,
    /// Print one line per successfully processed record.
    pub verbose: bool,
}

/// High-level business logic for the `sync` command.
pub struct SyncLogic;

impl SyncLogic {
    pub fn apply(
        pool: &mut DbPool,
        rows: &[InputRow],
        normalizer: &Normalizer,
        opts: &SyncOptions,
    ) -> AppResult<BatchReport> {
        // 1️⃣ schema must be in place before the first record
        init_db(&pool.conn)?;

        let mode = if opts.dry_run {
            CommitMode::Batch
        } else {
            opts.commit_mode
        };
        let store = SqliteStore::new(&pool.conn, mode);
        let now = now_utc();

        info(format!(
            "Reconciling {} records ({:?}{})",
            rows.len(),
            store.mode(),
            if opts.dry_run { ", dry run" } else { "" }
        ));

        // 2️⃣ run the batch
        store.begin_batch()?;
        let report = BatchSync::new(&store, normalizer, now).run_rows(rows);

        // 3️⃣ close the run-wide transaction
        if opts.dry_run {
            store.rollback_batch()?;
        } else {
            store.commit_batch()?;
        }

        // 4️⃣ console + audit log
        for entry in &report.entries {
            print_entry(entry, opts.verbose);
        }

        if !opts.dry_run {
            write_audit_log(&pool.conn, &report);
        }

        let summary = report.summary;
        if opts.dry_run {
            info(format!("Dry run, nothing written. Would have: {summary}"));
        } else if summary.errors > 0 {
            warning(format!("Summary: {summary}"));
        } else {
            success(format!("Summary: {summary}"));
        }

        Ok(report)
    }
}

fn print_entry(entry: &RecordLog, verbose: bool) {
    match entry {
        RecordLog::Done(outcome) if verbose => info(format!(
            "{} puzzle_id {}: {}",
            outcome.action,
            outcome.puzzle_id,
            outcome.describe()
        )),
        RecordLog::Done(_) => {}
        RecordLog::Failed(failure) => {
            let id = failure
                .puzzle_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            error(format!("Error processing puzzle_id {}: {}", id, failure.error));
            error(format!("Record data: {}", failure.payload));
        }
    }
}

/// Audit rows are best effort: a failure here never undoes a committed batch.
fn write_audit_log(conn: &Connection, report: &BatchReport) {
    for entry in &report.entries {
        let res = match entry {
            RecordLog::Done(outcome) => ttlog(
                conn,
                outcome.action.as_str(),
                &outcome.puzzle_id.to_string(),
                &outcome.describe(),
            ),
            RecordLog::Failed(failure) => ttlog(
                conn,
                "error",
                &failure
                    .puzzle_id
                    .map(|id| id.to_string())
                    .unwrap_or_default(),
                &format!("{} | record: {}", failure.error, failure.payload),
            ),
        };

        if let Err(e) = res {
            warning(format!("Failed to write internal log: {}", e));
            return;
        }
    }

    if let Err(e) = ttlog(conn, "sync", "batch", &report.summary.to_string()) {
        warning(format!("Failed to write internal log: {}", e));
    }
}
