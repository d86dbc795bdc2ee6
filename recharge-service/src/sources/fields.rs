use std::path::Path;

use recharge_client::table::{RowRef, Table};

use crate::pipeline::PipelineError;

/// Fail fast when a source table lacks a column the loader depends on.
pub fn require_columns(table: &Table, path: &Path, columns: &[&str]) -> Result<(), PipelineError> {
    let missing: Vec<&str> = columns
        .iter()
        .copied()
        .filter(|c| table.column_index(c).is_none())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::Source {
            path: path.to_path_buf(),
            message: format!("missing column(s): {}", missing.join(", ")),
        })
    }
}

/// Typed access to one source row, with errors naming the file and row.
pub struct Fields<'a> {
    path: &'a Path,
    row: RowRef<'a>,
}

impl<'a> Fields<'a> {
    pub fn new(path: &'a Path, row: RowRef<'a>) -> Self {
        Self { path, row }
    }

    /// One-based data row number in the source file.
    pub fn row_number(&self) -> usize {
        self.row.source_row()
    }

    pub fn error(&self, message: impl Into<String>) -> PipelineError {
        PipelineError::Row {
            path: self.path.to_path_buf(),
            row: self.row_number(),
            message: message.into(),
        }
    }

    pub fn text(&self, column: &str) -> Result<&'a str, PipelineError> {
        self.row
            .get(column)
            .ok_or_else(|| self.error(format!("missing column '{column}'")))
    }

    /// `None` when the column is absent or the cell is blank.
    pub fn optional_text(&self, column: &str) -> Option<&'a str> {
        self.row.get(column).map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn number(&self, column: &str) -> Result<f64, PipelineError> {
        let raw = self.text(column)?;
        parse_number(raw).ok_or_else(|| self.error(format!("invalid number '{raw}' in '{column}'")))
    }

    /// Blank cells count as zero, matching a summing spreadsheet.
    pub fn number_or_zero(&self, column: &str) -> Result<f64, PipelineError> {
        match self.optional_text(column) {
            None => Ok(0.0),
            Some(raw) => parse_number(raw)
                .ok_or_else(|| self.error(format!("invalid number '{raw}' in '{column}'"))),
        }
    }
}

/// Accepts thousands separators and a leading currency sign.
fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('£')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_tolerate_separators_and_currency() {
        assert_eq!(parse_number("1,234.5"), Some(1234.5));
        assert_eq!(parse_number(" £12.00 "), Some(12.0));
        assert_eq!(parse_number("-3"), Some(-3.0));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn errors_name_file_and_row() {
        let mut table = Table::new(["kwh"]);
        table.push_row(vec!["12".into()]);
        table.push_row(vec!["twelve".into()]);

        let path = Path::new("readings.csv");
        let ok = Fields::new(path, table.row(0).unwrap());
        assert_eq!(ok.number("kwh").unwrap(), 12.0);

        let bad = Fields::new(path, table.row(1).unwrap());
        let err = bad.number("kwh").unwrap_err().to_string();
        assert!(err.contains("readings.csv"));
        assert!(err.contains("row 2"));
        assert!(err.contains("twelve"));
    }

    #[test]
    fn errors_use_the_source_row_number() {
        let mut table = Table::new(["kwh"]);
        table.push_row_at(vec!["x".into()], 7);

        let err = Fields::new(Path::new("readings.csv"), table.row(0).unwrap())
            .number("kwh")
            .unwrap_err();
        assert!(matches!(err, PipelineError::Row { row: 7, .. }));
    }

    #[test]
    fn require_columns_lists_all_missing() {
        let table = Table::new(["a"]);
        let err = require_columns(&table, Path::new("x.csv"), &["a", "b", "c"]).unwrap_err();
        assert!(err.to_string().contains("b, c"));
    }
}
