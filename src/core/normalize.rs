//! Raw record → `PuzzleRecord`.
//!
//! Integer fields must be whole numbers, `solving_seconds` degrades to
//! "unknown" instead of failing, and every sentinel "missing" marker becomes
//! an explicit `None` so that SQL binding produces real NULLs.

use crate::errors::{AppError, AppResult};
use crate::models::puzzle::PuzzleRecord;
use crate::models::raw::RawRecord;
use chrono::NaiveDate;
use serde_json::Value;

/// Markers that upstream exports use for "no value".
pub const DEFAULT_MISSING_MARKERS: &[&str] =
    &["", "None", "none", "null", "NULL", "NaN", "nan", "<NA>", "NaT", "N/A"];

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    extra_markers: Vec<String>,
}

impl Normalizer {
    pub fn new(extra_markers: Vec<String>) -> Self {
        Self { extra_markers }
    }

    pub fn normalize(&self, raw: &RawRecord) -> AppResult<PuzzleRecord> {
        Ok(PuzzleRecord {
            puzzle_id: self.required_int(raw, "puzzle_id")?,
            title: self.optional_str(raw, "title"),
            author: self.optional_str(raw, "author"),
            editor: self.optional_str(raw, "editor"),
            format_type: self.required_str(raw, "format_type")?,
            publish_type: self.required_str(raw, "publish_type")?,
            day_of_week_name: self.required_str(raw, "day_of_week_name")?,
            day_of_week_integer: self.required_int(raw, "day_of_week_integer")?,
            print_date: self.required_date(raw, "print_date")?,
            version: self.required_int(raw, "version")?,
            percent_filled: self.required_float(raw, "percent_filled")?,
            solved: self.required_bool(raw, "solved")?,
            star: self.optional_str(raw, "star"),
            solving_seconds: self.solving_seconds(raw),
        })
    }

    fn is_missing_marker(&self, s: &str) -> bool {
        let t = s.trim();
        DEFAULT_MISSING_MARKERS.contains(&t) || self.extra_markers.iter().any(|m| m == t)
    }

    /// The value for `field`, or None when absent, null or a missing marker.
    fn present<'a>(&self, raw: &'a RawRecord, field: &str) -> Option<&'a Value> {
        match raw.get(field)? {
            Value::Null => None,
            Value::String(s) if self.is_missing_marker(s) => None,
            v => Some(v),
        }
    }

    fn optional_str(&self, raw: &RawRecord, field: &str) -> Option<String> {
        match self.present(raw, field)? {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            other => Some(other.to_string()),
        }
    }

    fn required_str(&self, raw: &RawRecord, field: &str) -> AppResult<String> {
        self.optional_str(raw, field)
            .ok_or_else(|| AppError::validation(field, "missing value"))
    }

    fn required_int(&self, raw: &RawRecord, field: &str) -> AppResult<i64> {
        let v = self
            .present(raw, field)
            .ok_or_else(|| AppError::validation(field, "missing value"))?;
        whole_number(v).ok_or_else(|| AppError::validation(field, format!("not a whole number: {v}")))
    }

    fn required_float(&self, raw: &RawRecord, field: &str) -> AppResult<f64> {
        let v = self
            .present(raw, field)
            .ok_or_else(|| AppError::validation(field, "missing value"))?;
        let f = match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        f.filter(|x| !x.is_nan())
            .ok_or_else(|| AppError::validation(field, format!("not a number: {v}")))
    }

    fn required_bool(&self, raw: &RawRecord, field: &str) -> AppResult<bool> {
        let v = self
            .present(raw, field)
            .ok_or_else(|| AppError::validation(field, "missing value"))?;
        let b = match v {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => match n.as_f64() {
                Some(x) if x == 1.0 => Some(true),
                Some(x) if x == 0.0 => Some(false),
                _ => None,
            },
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "t" | "yes" | "1" | "1.0" => Some(true),
                "false" | "f" | "no" | "0" | "0.0" => Some(false),
                _ => None,
            },
            _ => None,
        };
        b.ok_or_else(|| AppError::validation(field, format!("not a boolean: {v}")))
    }

    fn required_date(&self, raw: &RawRecord, field: &str) -> AppResult<NaiveDate> {
        let s = self
            .optional_str(raw, field)
            .ok_or_else(|| AppError::validation(field, "missing value"))?;
        // accept "YYYY-MM-DD" and full timestamps starting with it
        s.get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .ok_or_else(|| AppError::validation(field, format!("not a date: '{s}'")))
    }

    /// Cumulative seconds; anything that is not a non-negative whole number is unknown.
    fn solving_seconds(&self, raw: &RawRecord) -> Option<i64> {
        self.present(raw, "solving_seconds")
            .and_then(whole_number)
            .filter(|secs| *secs >= 0)
    }
}

/// Parse a whole number from a JSON number or string ("42", 42, "42.0").
fn whole_number(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(float_to_whole)),
        Value::String(s) => {
            let t = s.trim();
            t.parse::<i64>()
                .ok()
                .or_else(|| t.parse::<f64>().ok().and_then(float_to_whole))
        }
        _ => None,
    }
}

fn float_to_whole(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}
