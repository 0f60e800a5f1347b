// src/input/mod.rs

mod csv;
mod json;

use crate::errors::{AppError, AppResult};
use crate::models::raw::InputRow;
use crate::utils::path::extension_of;
use clap::ValueEnum;
use std::path::Path;

pub use self::csv::read_csv;
pub use self::json::read_json;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    Csv,
    Json,
}

impl InputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputFormat::Csv => "csv",
            InputFormat::Json => "json",
        }
    }

    /// Guess the format from the file extension.
    pub fn from_path(path: &Path) -> AppResult<Self> {
        match extension_of(path).as_deref() {
            Some("csv") => Ok(InputFormat::Csv),
            Some("json") => Ok(InputFormat::Json),
            Some(other) => Err(AppError::InvalidInputFormat(other.to_string())),
            None => Err(AppError::InvalidInputFormat(format!(
                "cannot infer format of '{}', use --format",
                path.display()
            ))),
        }
    }
}

/// Read every row from `path`, in file order.
pub fn load_records(path: &Path, format: Option<InputFormat>) -> AppResult<Vec<InputRow>> {
    let format = match format {
        Some(f) => f,
        None => InputFormat::from_path(path)?,
    };

    match format {
        InputFormat::Csv => read_csv(path),
        InputFormat::Json => read_json(path),
    }
}
