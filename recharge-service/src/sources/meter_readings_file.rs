use std::path::{Path, PathBuf};

use recharge_client::{
    dates,
    domain::{MeterReading, UtilityType},
    DomainError, Table,
};

use crate::{
    pipeline::{PipelineError, Source},
    sources::{
        fields::{require_columns, Fields},
        table_file::{is_delimited_path, load_table},
    },
};

pub const DATETIME: &str = "Datetime";
pub const SITE: &str = "Site";
pub const UTILITY: &str = "Utility/Meter";
pub const SUB_UTILITY: &str = "Sub Utility";
pub const FLOW: &str = "Flow";
pub const PREVIOUS_READING: &str = "Previous meter reading";
pub const PREVIOUS_DATE: &str = "Previous meter reading date";
pub const PRESENT_READING: &str = "Present meter reading";
pub const PRESENT_DATE: &str = "Present meter reading date";

const REQUIRED: [&str; 5] = [DATETIME, SITE, UTILITY, PREVIOUS_READING, PRESENT_READING];

/// Monthly meter readings form (CSV or workbook).
///
/// Expected header columns (by name):
/// - Datetime (MM/DD/YY; MM/DD/YYYY and YYYY-MM-DD also accepted)
/// - Site
/// - Utility/Meter (G, E or W)
/// - Sub Utility (optional)
/// - Flow (optional; blank means inflow)
/// - Previous meter reading / Present meter reading
/// - Previous meter reading date / Present meter reading date (optional, carried as text)
pub struct MeterReadingFileSource {
    path: PathBuf,
    sheet: Option<String>,
}

impl MeterReadingFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            sheet: None,
        }
    }

    pub fn with_sheet(mut self, sheet: Option<String>) -> Self {
        self.sheet = sheet;
        self
    }
}

impl Source<MeterReading> for MeterReadingFileSource {
    fn load(&self) -> Result<Vec<MeterReading>, PipelineError> {
        let table = load_table(&self.path, is_delimited_path(&self.path))?
            .into_table(&self.path, self.sheet.as_deref())?;
        let readings = readings_from_table(&table, &self.path).map_err(|e| {
            metrics::counter!("recharge_meter_readings_parse_errors_total").increment(1);
            e
        })?;
        tracing::info!(path = %self.path.display(), rows = readings.len(), "meter readings loaded");
        Ok(readings)
    }
}

pub fn readings_from_table(table: &Table, path: &Path) -> Result<Vec<MeterReading>, PipelineError> {
    require_columns(table, path, &REQUIRED)?;
    table
        .iter()
        .map(|row| record_to_reading(&Fields::new(path, row)))
        .collect()
}

fn record_to_reading(f: &Fields<'_>) -> Result<MeterReading, PipelineError> {
    let date_str = f.text(DATETIME)?;
    let date = dates::parse_period_date(date_str).map_err(|e| f.error(e.to_string()))?;

    let site = f.text(SITE)?.trim().to_string();
    if site.is_empty() {
        return Err(f.error("blank site"));
    }

    let utility = f
        .text(UTILITY)?
        .parse::<UtilityType>()
        .map_err(|e| f.error(e.to_string()))?;
    let flow = parse_flow(f.optional_text(FLOW)).map_err(|e| f.error(e.to_string()))?;

    Ok(MeterReading {
        date,
        site,
        utility,
        sub_utility: f.optional_text(SUB_UTILITY).map(str::to_string),
        flow,
        previous_reading: f.number_or_zero(PREVIOUS_READING)?,
        previous_date: f.optional_text(PREVIOUS_DATE).map(str::to_string),
        present_reading: f.number_or_zero(PRESENT_READING)?,
        present_date: f.optional_text(PRESENT_DATE).map(str::to_string),
    })
}

fn parse_flow(raw: Option<&str>) -> Result<bool, DomainError> {
    match raw.map(|s| s.to_ascii_lowercase()).as_deref() {
        None | Some("false" | "0" | "no" | "n") => Ok(false),
        Some("true" | "1" | "yes" | "y") => Ok(true),
        Some(_) => Err(DomainError::FlowFlag(raw.unwrap_or_default().to_string())),
    }
}
