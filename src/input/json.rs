use crate::errors::{AppError, AppResult};
use crate::models::raw::InputRow;
use serde_json::Value;
use std::path::Path;

/// Legge un array JSON di oggetti; i valori mantengono il loro tipo JSON.
pub fn read_json(path: &Path) -> AppResult<Vec<InputRow>> {
    let content = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;

    let Value::Array(items) = value else {
        return Err(AppError::Input(
            "expected a JSON array of records".to_string(),
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(map) => Ok(InputRow::Record(map)),
            other => Err(AppError::Input(format!(
                "record #{} is not an object: {}",
                i + 1,
                other
            ))),
        })
        .collect()
}
