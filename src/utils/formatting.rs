//! Formatting utilities used for CLI outputs.

pub fn bold(s: &str) -> String {
    format!("\x1b[1m{}\x1b[0m", s)
}

/// "--" for absent values
pub fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("--").to_string()
}

/// "solved", or the filled percentage for puzzles still in progress.
pub fn describe_progress(solved: bool, percent_filled: f64) -> String {
    if solved {
        "solved".to_string()
    } else {
        format!("{:.0}%", percent_filled)
    }
}
