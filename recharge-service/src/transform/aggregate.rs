use std::collections::BTreeMap;

use recharge_client::domain::{ConsumptionRow, MeterReading, UtilityType};
use time::Date;

use crate::{config::TenantConfig, pipeline::Transform};

/// Readings summed per physical metering point.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedMeter {
    pub date: Date,
    pub site: String,
    pub utility: UtilityType,
    pub flow: bool,
    pub previous_reading: f64,
    pub present_reading: f64,
}

/// Sum previous/present readings of rows sharing (date, site, utility, flow).
/// Output is ordered by that key.
pub fn merge_utility_rows(readings: &[MeterReading]) -> Vec<MergedMeter> {
    let mut groups: BTreeMap<(Date, &str, UtilityType, bool), (f64, f64)> = BTreeMap::new();
    for r in readings {
        let entry = groups
            .entry((r.date, r.site.as_str(), r.utility, r.flow))
            .or_insert((0.0, 0.0));
        entry.0 += r.previous_reading;
        entry.1 += r.present_reading;
    }

    groups
        .into_iter()
        .map(|((date, site, utility, flow), (previous, present))| MergedMeter {
            date,
            site: site.to_string(),
            utility,
            flow,
            previous_reading: previous,
            present_reading: present,
        })
        .collect()
}

/// `(present - previous) * multiplier`, negated once for outflow meters.
/// No multiplier leaves the delta unscaled.
pub fn meter_consumption(meter: &MergedMeter, multiplier: Option<f64>) -> f64 {
    let delta = meter.present_reading - meter.previous_reading;
    let scaled = multiplier.map_or(delta, |k| delta * k);
    if meter.flow {
        -scaled
    } else {
        scaled
    }
}

/// Turns raw readings into one consumption row per (date, site, utility).
pub struct ConsumptionAggregator<'a> {
    tenants: &'a TenantConfig,
}

impl<'a> ConsumptionAggregator<'a> {
    pub fn new(tenants: &'a TenantConfig) -> Self {
        Self { tenants }
    }
}

impl Transform<MeterReading, ConsumptionRow> for ConsumptionAggregator<'_> {
    fn apply(&self, input: Vec<MeterReading>) -> Vec<ConsumptionRow> {
        let merged = merge_utility_rows(&input);

        let mut totals: BTreeMap<(Date, String, UtilityType), f64> = BTreeMap::new();
        for meter in &merged {
            let multiplier = self.tenants.multiplier_for(&meter.site, meter.utility);
            let consumption = meter_consumption(meter, multiplier);
            *totals
                .entry((meter.date, meter.site.clone(), meter.utility))
                .or_insert(0.0) += consumption;
        }

        tracing::debug!(
            readings = input.len(),
            meters = merged.len(),
            rows = totals.len(),
            "consumption aggregated"
        );

        totals
            .into_iter()
            .map(|((date, site, utility), consumption)| ConsumptionRow {
                date,
                site,
                utility,
                consumption,
            })
            .collect()
    }
}
