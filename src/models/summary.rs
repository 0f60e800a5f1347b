use serde::Serialize;
use std::fmt;

/// What the reconciler decided for the `crossword_stats` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StateAction {
    Insert,
    Update,
    Noop,
}

impl StateAction {
    /// Operation name used in the internal log table.
    pub fn as_str(&self) -> &'static str {
        match self {
            StateAction::Insert => "insert",
            StateAction::Update => "update",
            StateAction::Noop => "check",
        }
    }
}

impl fmt::Display for StateAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one successfully processed record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordOutcome {
    pub puzzle_id: i64,
    pub action: StateAction,
    pub changed_fields: Vec<&'static str>,
    pub session_seconds: Option<i64>,
}

impl RecordOutcome {
    pub fn describe(&self) -> String {
        let state = match self.action {
            StateAction::Insert => "new puzzle".to_string(),
            StateAction::Update => format!("changed: {}", self.changed_fields.join(", ")),
            StateAction::Noop => "no changes".to_string(),
        };
        match self.session_seconds {
            Some(secs) => format!("{state}; session of {secs}s"),
            None => state,
        }
    }
}

/// Result of a record that could not be processed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordFailure {
    pub puzzle_id: Option<i64>,
    pub error: String,
    pub payload: String,
}

/// Per-record log entry: success or failure, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RecordLog {
    Done(RecordOutcome),
    Failed(RecordFailure),
}

/// Counters callers rely on for observability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// New `crossword_stats` rows.
    pub inserts: usize,
    /// Existing rows examined.
    pub updates_checked: usize,
    /// Existing rows whose stored fields actually changed.
    pub updates_effective: usize,
    /// New `puzzle_sessions` rows.
    pub sessions_added: usize,
    /// Total seconds across the new sessions, saturating at `i64::MAX`.
    pub seconds_added: i64,
    /// Records that failed processing.
    pub errors: usize,
}

impl Summary {
    pub fn record(&mut self, outcome: &RecordOutcome) {
        match outcome.action {
            StateAction::Insert => self.inserts += 1,
            StateAction::Update => {
                self.updates_checked += 1;
                self.updates_effective += 1;
            }
            StateAction::Noop => self.updates_checked += 1,
        }
        if let Some(secs) = outcome.session_seconds {
            self.sessions_added += 1;
            self.seconds_added = self.seconds_added.saturating_add(secs);
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} inserts, {} checks, {} actual updates, {} sessions added ({}s), {} errors",
            self.inserts,
            self.updates_checked,
            self.updates_effective,
            self.sessions_added,
            self.seconds_added,
            self.errors
        )
    }
}

/// Everything a batch run hands back to its caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub summary: Summary,
    pub entries: Vec<RecordLog>,
}
