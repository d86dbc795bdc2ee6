use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use recharge_client::{dates, Table};
use time::{Date, Duration};

use crate::pipeline::PipelineError;

/// Result of [`load_table`]: one table for delimited files, one per sheet
/// (in workbook order) for spreadsheets.
#[derive(Debug, Clone)]
pub enum LoadedTable {
    Single(Table),
    Sheets(Vec<(String, Table)>),
}

impl LoadedTable {
    /// Collapse to one table: the named sheet if given, else the first one.
    pub fn into_table(self, path: &Path, sheet: Option<&str>) -> Result<Table, PipelineError> {
        match self {
            Self::Single(table) => Ok(table),
            Self::Sheets(sheets) => {
                let found = match sheet {
                    Some(name) => sheets.into_iter().find(|(n, _)| n == name),
                    None => sheets.into_iter().next(),
                };
                found.map(|(_, t)| t).ok_or_else(|| PipelineError::Source {
                    path: path.to_path_buf(),
                    message: match sheet {
                        Some(name) => format!("workbook has no sheet named '{name}'"),
                        None => "workbook contains no sheets".to_string(),
                    },
                })
            }
        }
    }
}

/// Workbook extensions; anything else is read as comma-delimited text.
pub fn is_delimited_path(path: &Path) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    !matches!(ext.as_deref(), Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods"))
}

pub fn load_table(path: &Path, is_delimited: bool) -> Result<LoadedTable, PipelineError> {
    if is_delimited {
        read_delimited(path).map(LoadedTable::Single)
    } else {
        read_workbook(path).map(LoadedTable::Sheets)
    }
}

/// Read a CSV file with a header row. A UTF-8 BOM and surrounding
/// whitespace are stripped from headers; fully blank rows are skipped.
pub fn read_delimited(path: &Path) -> Result<Table, PipelineError> {
    let source_err = |message: String| PipelineError::Source {
        path: path.to_path_buf(),
        message,
    };

    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| source_err(format!("failed to open CSV file: {e}")))?;

    let headers = rdr
        .headers()
        .map_err(|e| source_err(format!("failed to read CSV headers: {e}")))?
        .iter()
        .map(normalize_header)
        .collect::<Vec<_>>();

    let mut table = Table::new(headers);
    for (idx, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| PipelineError::Row {
            path: path.to_path_buf(),
            row: idx + 1,
            message: format!("failed to read CSV record: {e}"),
        })?;
        // Line 1 is the header, so data row n starts on line n + 1.
        let source_row = record
            .position()
            .map(|p| (p.line() as usize).saturating_sub(1).max(1))
            .unwrap_or(idx + 1);
        let row: Vec<String> = record.iter().map(|v| v.trim().to_string()).collect();
        if row.iter().all(String::is_empty) {
            continue;
        }
        table.push_row_at(row, source_row);
    }

    Ok(table)
}

fn normalize_header(h: &str) -> String {
    h.trim_start_matches('\u{feff}').trim().to_string()
}

/// Read every worksheet; the first row of each sheet is its header.
pub fn read_workbook(path: &Path) -> Result<Vec<(String, Table)>, PipelineError> {
    let mut workbook: Sheets<_> = open_workbook_auto(path).map_err(|e| PipelineError::Source {
        path: path.to_path_buf(),
        message: format!("failed to open workbook: {e}"),
    })?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(sheet_names.len());

    for sheet_name in sheet_names {
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| PipelineError::Source {
                path: path.to_path_buf(),
                message: format!("failed to read sheet '{sheet_name}': {e}"),
            })?;

        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(first) => first.iter().map(|c| normalize_header(&cell_text(c))).collect(),
            None => Vec::new(),
        };

        let mut table = Table::new(headers);
        for (idx, row) in rows.enumerate() {
            let values: Vec<String> = row.iter().map(cell_text).collect();
            if values.iter().all(String::is_empty) {
                continue;
            }
            table.push_row_at(values, idx + 1);
        }

        sheets.push((sheet_name, table));
    }

    Ok(sheets)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{n}")
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => (if *b { "True" } else { "False" }).to_string(),
        Data::Error(e) => format!("#{e:?}"),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
            .map(dates::format_iso)
            .unwrap_or_else(|| dt.as_f64().to_string()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Convert a 1900-system serial day number to a calendar date.
fn excel_serial_to_date(serial: f64) -> Option<Date> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let epoch = Date::from_calendar_date(1899, time::Month::December, 30).ok()?;
    epoch.checked_add(Duration::days(serial.floor() as i64))
}
