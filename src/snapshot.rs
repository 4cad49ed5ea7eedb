//! External roster snapshots.
//!
//! A snapshot is an ordered list of records, each mapping the roster's
//! human-authored column headers to raw cell text. The on-disk form is a
//! JSON array of objects; cell values may arrive as strings, numbers, or
//! booleans and are kept as text, since the field mapper works on text.

use std::{fs, io, path::Path};

use serde_json::Value;

/// Snapshot column carrying the company tax-id.
pub const TAX_ID_COLUMN: &str = "STIR";

/// Snapshot column carrying the company display name.
pub const NAME_COLUMN: &str = "Korxona nomi";

/// Errors from loading a snapshot file.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot must be a JSON array of objects")]
    NotAnArray,
}

/// One roster row: column label → raw cell text, in column order.
#[derive(Debug, Clone, Default)]
pub struct SnapshotRecord {
    columns: Vec<(String, String)>,
}

impl SnapshotRecord {
    pub fn new(columns: Vec<(String, String)>) -> Self {
        Self { columns }
    }

    /// The raw cell under the given column label, if the column is present.
    pub fn value(&self, label: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    pub fn tax_id(&self) -> Option<&str> {
        self.value(TAX_ID_COLUMN)
    }

    pub fn name(&self) -> &str {
        self.value(NAME_COLUMN).unwrap_or("")
    }
}

/// Load a snapshot from a JSON file.
pub fn load_snapshot(path: &Path) -> Result<Vec<SnapshotRecord>, SnapshotError> {
    let contents = fs::read_to_string(path)?;
    parse_snapshot(&contents)
}

/// Parse snapshot JSON: an array of flat objects.
pub fn parse_snapshot(json: &str) -> Result<Vec<SnapshotRecord>, SnapshotError> {
    let value: Value = serde_json::from_str(json)?;
    let Value::Array(rows) = value else {
        return Err(SnapshotError::NotAnArray);
    };

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let Value::Object(fields) = row else {
            return Err(SnapshotError::NotAnArray);
        };
        let columns = fields
            .into_iter()
            .map(|(label, cell)| (label, cell_text(&cell)))
            .collect();
        records.push(SnapshotRecord::new(columns));
    }
    Ok(records)
}

/// Render a JSON cell as the text the field mapper sees.
fn cell_text(cell: &Value) -> String {
    match cell {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
