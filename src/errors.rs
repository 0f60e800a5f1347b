//! Unified application error type.
//! All modules (db, core, cli, input) return AppError so that the batch
//! orchestrator can classify a failure as record-fatal or run-fatal.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Persistence
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A conditional write found the row in a different state than the one
    /// read at the start of the record. Retrying the record is safe.
    #[error("Concurrent modification of puzzle {puzzle_id}: {detail}")]
    RaceCondition { puzzle_id: i64, detail: String },

    // ---------------------------
    // Record validation
    // ---------------------------
    #[error("Invalid field '{field}': {reason}")]
    Validation { field: String, reason: String },

    // ---------------------------
    // Input loading
    // ---------------------------
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Input format not supported: {0}")]
    InvalidInputFormat(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("Failed to load configuration")]
    ConfigLoad,

    // ---------------------------
    // Lookup
    // ---------------------------
    #[error("Puzzle {0} not found")]
    PuzzleNotFound(i64),
}

impl AppError {
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
