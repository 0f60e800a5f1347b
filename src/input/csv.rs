use crate::errors::AppResult;
use crate::models::raw::{InputRow, RawRecord};
use csv::{ByteRecord, ReaderBuilder, StringRecord};
use serde_json::Value;
use std::path::Path;

/// Legge un CSV con intestazione: ogni cella diventa una stringa non tipizzata.
/// Le righe non decodificabili (UTF-8 non valido) restano nel batch come `Unreadable`.
pub fn read_csv(path: &Path) -> AppResult<Vec<InputRow>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)?;

    let headers = rdr.headers()?.clone();

    let mut out = Vec::new();
    for row in rdr.byte_records() {
        let row = row?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();

        match StringRecord::from_byte_record(row) {
            Ok(row) => {
                let mut raw = RawRecord::new();
                for (name, cell) in headers.iter().zip(row.iter()) {
                    raw.insert(name.to_string(), Value::String(cell.to_string()));
                }
                out.push(InputRow::Record(raw));
            }
            Err(e) => {
                let reason = e.utf8_error().to_string();
                out.push(InputRow::Unreadable {
                    line,
                    reason,
                    content: lossy_row(&e.into_byte_record()),
                })
            }
        }
    }

    Ok(out)
}

fn lossy_row(row: &ByteRecord) -> String {
    row.iter()
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join(",")
}
