//! Untyped incoming records, as read from CSV or JSON.

use serde_json::{Map, Value};

/// Field name → untyped value. CSV cells arrive as strings, JSON keeps its types.
pub type RawRecord = Map<String, Value>;

/// Best-effort puzzle id for log lines about records that failed validation.
pub fn puzzle_id_hint(raw: &RawRecord) -> Option<i64> {
    match raw.get("puzzle_id")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Compact JSON form of the record, kept in the audit log for manual replay.
pub fn payload(raw: &RawRecord) -> String {
    serde_json::to_string(raw).unwrap_or_else(|_| format!("{:?}", raw))
}

/// One entry of an input file: a record, or a row that could not be decoded.
/// Unreadable rows fail on their own, like any other bad record.
#[derive(Debug, Clone, PartialEq)]
pub enum InputRow {
    Record(RawRecord),
    Unreadable {
        line: u64,
        reason: String,
        /// Lossy text of the row, for the error report.
        content: String,
    },
}
