//! Curated store-code lists used by the code filter.

use std::collections::HashSet;

use crate::ParseError;

/// A named set of store codes.
///
/// The `id` is the file name the list was loaded from; it is what the code
/// filter selector stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    id: String,
    codes: HashSet<String>,
}

impl AllowList {
    pub fn new<I, S>(id: impl Into<String>, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            codes: codes.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse an allow-list file: no header, one code per row, first column
    /// only. Cells are trimmed and blank cells are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Csv`] if the text is not readable CSV.
    pub fn parse(id: impl Into<String>, text: &str) -> Result<Self, ParseError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut codes = HashSet::new();
        for record in reader.records() {
            let record = record?;
            if let Some(code) = record.get(0).map(str::trim).filter(|c| !c.is_empty()) {
                codes.insert(code.to_string());
            }
        }

        let list = Self {
            id: id.into(),
            codes,
        };
        tracing::debug!(list = %list.id, codes = list.codes.len(), "parsed allow-list");
        Ok(list)
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_column_only() {
        let list = AllowList::parse("limited.csv", "101,梅田店\n102,難波店\n").unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.contains("101"));
        assert!(list.contains("102"));
        assert!(!list.contains("梅田店"));
    }

    #[test]
    fn first_row_is_data_not_header() {
        let list = AllowList::parse("a.csv", "code\n1\n").unwrap();
        assert!(list.contains("code"));
        assert!(list.contains("1"));
    }

    #[test]
    fn blank_rows_and_cells_are_skipped() {
        let list = AllowList::parse("a.csv", "1\n\n , x\n2 \n").unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.contains("2"));
    }

    #[test]
    fn keeps_its_id() {
        let list = AllowList::new("curry.csv", ["9"]);
        assert_eq!(list.id(), "curry.csv");
        assert!(!list.is_empty());
    }
}
