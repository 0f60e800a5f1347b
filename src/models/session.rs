use chrono::{DateTime, Utc};
use serde::Serialize;

/// One row of `puzzle_sessions`: incremental solving time, never cumulative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolvingSession {
    pub id: i64,
    pub puzzle_id: i64,
    pub session_date: DateTime<Utc>,
    pub solving_seconds: i64,
}

/// A session the delta calculator decided to record, not yet persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewSession {
    pub puzzle_id: i64,
    pub solving_seconds: i64,
}
