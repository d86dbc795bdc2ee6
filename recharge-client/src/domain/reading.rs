use time::Date;

use crate::{dates::format_iso, domain::UtilityType, schema};

/// One row of the monthly meter readings form, normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct MeterReading {
    pub date: Date,
    pub site: String,
    pub utility: UtilityType,
    pub sub_utility: Option<String>,
    /// True for outflow (export) meters.
    pub flow: bool,
    pub previous_reading: f64,
    pub previous_date: Option<String>,
    pub present_reading: f64,
    pub present_date: Option<String>,
}

impl MeterReading {
    /// Values in [`schema::READING_COLUMNS`] order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            format_iso(self.date),
            self.site.clone(),
            self.utility.code().to_string(),
            self.sub_utility.clone().unwrap_or_default(),
            flow_label(self.flow).to_string(),
            self.previous_reading.to_string(),
            self.previous_date.clone().unwrap_or_default(),
            self.present_reading.to_string(),
            self.present_date.clone().unwrap_or_default(),
        ]
    }

    pub fn column_names() -> &'static [&'static str] {
        &schema::READING_COLUMNS
    }
}

pub fn flow_label(flow: bool) -> &'static str {
    if flow {
        "True"
    } else {
        "False"
    }
}

/// Net consumption of one site utility for one period.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumptionRow {
    pub date: Date,
    pub site: String,
    pub utility: UtilityType,
    pub consumption: f64,
}
