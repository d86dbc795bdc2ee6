use time::Date;

use crate::{dates::format_iso, domain::{ConsumptionRow, UtilityType}, schema};

/// A consumption row after identifier resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentifiedReading {
    pub date: Date,
    pub site: String,
    pub utility: UtilityType,
    pub consumption: f64,
    pub identifier: Option<String>,
}

impl IdentifiedReading {
    pub fn new(row: ConsumptionRow, identifier: Option<String>) -> Self {
        Self {
            date: row.date,
            site: row.site,
            utility: row.utility,
            consumption: row.consumption,
            identifier,
        }
    }
}

/// An identified reading after rate resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct RatedReading {
    pub date: Date,
    pub site: String,
    pub utility: UtilityType,
    pub consumption: f64,
    pub identifier: Option<String>,
    pub recharge_rate: Option<f64>,
}

impl RatedReading {
    pub fn new(reading: IdentifiedReading, recharge_rate: Option<f64>) -> Self {
        Self {
            date: reading.date,
            site: reading.site,
            utility: reading.utility,
            consumption: reading.consumption,
            identifier: reading.identifier,
            recharge_rate,
        }
    }
}

impl From<ChargedReading> for RatedReading {
    /// Feed a calculated row back through charge calculation.
    fn from(charged: ChargedReading) -> Self {
        Self {
            date: charged.date,
            site: charged.site,
            utility: charged.utility,
            consumption: charged.consumption,
            identifier: charged.identifier,
            recharge_rate: Some(charged.recharge_rate),
        }
    }
}

/// Terminal row of a recharge run.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargedReading {
    pub date: Date,
    pub site: String,
    pub utility: UtilityType,
    pub consumption: f64,
    pub identifier: Option<String>,
    pub recharge_rate: f64,
    pub fixed_charge: f64,
    /// Configured reading multiplier, recorded for reporting only.
    pub reading_multiplier: f64,
    pub net_charge: f64,
    pub gross_charge: f64,
}

impl ChargedReading {
    /// Values in [`schema::CHARGE_COLUMNS`] order. An unresolved identifier
    /// is written as `0`.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            format_iso(self.date),
            self.site.clone(),
            self.utility.code().to_string(),
            self.consumption.to_string(),
            self.identifier.clone().unwrap_or_else(|| "0".to_string()),
            self.recharge_rate.to_string(),
            self.fixed_charge.to_string(),
            self.reading_multiplier.to_string(),
            self.net_charge.to_string(),
            self.gross_charge.to_string(),
        ]
    }

    pub fn column_names() -> &'static [&'static str] {
        &schema::CHARGE_COLUMNS
    }
}
