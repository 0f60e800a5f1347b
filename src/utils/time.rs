//! Time utilities: UTC timestamps for the DB, readable durations.

use chrono::{DateTime, SecondsFormat, Utc};

/// Timestamp as stored in SQLite: RFC 3339, UTC, fixed microsecond precision,
/// so that text comparison equals time comparison.
pub fn to_db_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_db_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Run clock, truncated to what the DB can represent.
pub fn now_utc() -> DateTime<Utc> {
    let now = Utc::now();
    parse_db_timestamp(&to_db_timestamp(&now)).unwrap_or(now)
}

/// 4521 → "1h 15m 21s"
pub fn secs2readable(secs: i64) -> String {
    let sign = if secs < 0 { "-" } else { "" };
    let s = secs.abs();
    let (h, m, sec) = (s / 3600, (s % 3600) / 60, s % 60);

    if h > 0 {
        format!("{sign}{h}h {m:02}m {sec:02}s")
    } else if m > 0 {
        format!("{sign}{m}m {sec:02}s")
    } else {
        format!("{sign}{sec}s")
    }
}
