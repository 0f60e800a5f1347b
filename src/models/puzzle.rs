use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Canonical puzzle observation, produced by the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PuzzleRecord {
    pub puzzle_id: i64,
    pub title: Option<String>,
    pub author: Option<String>,
    pub editor: Option<String>,
    pub format_type: String,
    pub publish_type: String,
    pub day_of_week_name: String,
    pub day_of_week_integer: i64,
    pub print_date: NaiveDate,        // ⇔ crossword_stats.print_date (TEXT "YYYY-MM-DD")
    pub version: i64,
    pub percent_filled: f64,
    pub solved: bool,
    pub star: Option<String>,
    pub solving_seconds: Option<i64>, // cumulative; None = unknown
}

impl PuzzleRecord {
    pub fn print_date_str(&self) -> String {
        self.print_date.format("%Y-%m-%d").to_string()
    }

    /// Names of the fields whose values differ between `self` and `other`.
    ///
    /// Optional fields compare NULL-aware: a field differs when exactly one
    /// side is absent, or when both are present and unequal.
    pub fn changed_fields(&self, other: &PuzzleRecord) -> Vec<&'static str> {
        let mut out = Vec::new();

        if self.puzzle_id != other.puzzle_id {
            out.push("puzzle_id");
        }
        if self.title != other.title {
            out.push("title");
        }
        if self.author != other.author {
            out.push("author");
        }
        if self.editor != other.editor {
            out.push("editor");
        }
        if self.format_type != other.format_type {
            out.push("format_type");
        }
        if self.publish_type != other.publish_type {
            out.push("publish_type");
        }
        if self.day_of_week_name != other.day_of_week_name {
            out.push("day_of_week_name");
        }
        if self.day_of_week_integer != other.day_of_week_integer {
            out.push("day_of_week_integer");
        }
        if self.print_date != other.print_date {
            out.push("print_date");
        }
        if self.version != other.version {
            out.push("version");
        }
        // the normalizer never produces NaN, so plain float equality is enough
        if self.percent_filled != other.percent_filled {
            out.push("percent_filled");
        }
        if self.solved != other.solved {
            out.push("solved");
        }
        if self.star != other.star {
            out.push("star");
        }
        if self.solving_seconds != other.solving_seconds {
            out.push("solving_seconds");
        }

        out
    }
}

/// Persisted current state of a puzzle (`crossword_stats` row).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PuzzleState {
    pub record: PuzzleRecord,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

impl PuzzleState {
    pub fn new(record: PuzzleRecord, now: DateTime<Utc>) -> Self {
        Self {
            record,
            created_at: now,
            last_updated_at: now,
        }
    }

    pub fn puzzle_id(&self) -> i64 {
        self.record.puzzle_id
    }
}
