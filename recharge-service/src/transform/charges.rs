use recharge_client::domain::{ChargedReading, RatedReading};

use crate::{config::TenantConfig, pipeline::Transform};

/// Decimal places kept on every monetary and consumption output.
pub const OUTPUT_DECIMALS: i32 = 6;

/// Round half to even at [`OUTPUT_DECIMALS`] places; negative zero is
/// normalized to zero.
pub fn round_output(value: f64) -> f64 {
    let scale = 10f64.powi(OUTPUT_DECIMALS);
    let rounded = (value * scale).round_ties_even() / scale;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Fixed charges, reporting multipliers and net/gross charge per reading.
///
/// Inputs are rounded before they are combined, so feeding the output back
/// in reproduces it exactly.
pub struct ChargeCalculator<'a> {
    tenants: &'a TenantConfig,
}

impl<'a> ChargeCalculator<'a> {
    pub fn new(tenants: &'a TenantConfig) -> Self {
        Self { tenants }
    }

    pub fn charge(&self, reading: RatedReading) -> ChargedReading {
        let recharge_rate = round_output(reading.recharge_rate.unwrap_or(0.0));
        let consumption = round_output(reading.consumption);
        let fixed_charge = round_output(
            self.tenants
                .fixed_charge_for(&reading.site, reading.utility)
                .unwrap_or(0.0),
        );
        let reading_multiplier = round_output(
            self.tenants
                .multiplier_for(&reading.site, reading.utility)
                .unwrap_or(0.0),
        );

        let net_charge = round_output(recharge_rate * consumption);
        let gross_charge = round_output(net_charge + fixed_charge);

        ChargedReading {
            date: reading.date,
            site: reading.site,
            utility: reading.utility,
            consumption,
            identifier: reading.identifier,
            recharge_rate,
            fixed_charge,
            reading_multiplier,
            net_charge,
            gross_charge,
        }
    }
}

impl Transform<RatedReading, ChargedReading> for ChargeCalculator<'_> {
    fn apply(&self, input: Vec<RatedReading>) -> Vec<ChargedReading> {
        input.into_iter().map(|r| self.charge(r)).collect()
    }
}
