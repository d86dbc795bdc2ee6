//! Canonical column names shared by every persisted artifact.

pub const PERIOD_FROM: &str = "Period from";
pub const SITE: &str = "Residential/Commercial site";
pub const UTILITY: &str = "Utility/Meter";
pub const SUB_METER: &str = "Sub meter";
pub const FLOW: &str = "Flow";
pub const PREVIOUS_READING: &str = "Previous meter reading";
pub const PREVIOUS_DATE: &str = "Previous meter reading date";
pub const PRESENT_READING: &str = "Present meter reading";
pub const PRESENT_DATE: &str = "Present meter reading date";
pub const CONSUMPTION: &str = "Corrected consumption (kWh)";
pub const IDENTIFIER: &str = "MPAN/MPR";
pub const RECHARGE_RATE: &str = "Recharge rate (GBP/kWh)";
pub const FIXED_CHARGE: &str = "Fixed charge (GBP)";
pub const READING_MULTIPLIER: &str = "Reading multiplier";
pub const NET_CHARGE: &str = "Net charge (GBP)";
pub const GROSS_CHARGE: &str = "Gross charge (GBP)";

/// Column layout of a raw reading once normalized.
pub const READING_COLUMNS: [&str; 9] = [
    PERIOD_FROM,
    SITE,
    UTILITY,
    SUB_METER,
    FLOW,
    PREVIOUS_READING,
    PREVIOUS_DATE,
    PRESENT_READING,
    PRESENT_DATE,
];

/// Column layout of a calculated charge row.
pub const CHARGE_COLUMNS: [&str; 10] = [
    PERIOD_FROM,
    SITE,
    UTILITY,
    CONSUMPTION,
    IDENTIFIER,
    RECHARGE_RATE,
    FIXED_CHARGE,
    READING_MULTIPLIER,
    NET_CHARGE,
    GROSS_CHARGE,
];

/// Pandas-style index columns left behind by earlier exports.
pub fn is_index_column(name: &str) -> bool {
    let name = name.trim();
    name.is_empty() || name.starts_with("Unnamed:")
}
