//! Store table rows as read from the primary CSV file.

use serde::{Deserialize, Serialize};

use crate::ParseError;

/// One row of the store table.
///
/// Columns are matched by header name, so their order in the file does not
/// matter. A column that is absent (or a cell that is empty) reads as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreRecord {
    /// Store identifier; renamed branches may reuse it.
    #[serde(default)]
    pub code: Option<String>,
    /// Display name, possibly with parenthetical annotations.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    /// Decimal degrees, kept as text until the builder parses them.
    #[serde(default)]
    pub latitude: Option<String>,
    #[serde(default)]
    pub longitude: Option<String>,
}

/// Parse the store table. A header row is required.
///
/// Empty lines are skipped and ragged rows are tolerated; extra columns are
/// ignored.
///
/// # Errors
///
/// Returns [`ParseError::Csv`] if the text is not readable CSV (for example
/// invalid UTF-8 inside a record).
pub fn parse_store_records(text: &str) -> Result<Vec<StoreRecord>, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for row in reader.deserialize::<StoreRecord>() {
        records.push(row?);
    }

    tracing::debug!(rows = records.len(), "parsed store table");
    Ok(records)
}
