use std::collections::HashMap;

use recharge_client::domain::{IdentifiedReading, InvoiceRecord, InvoiceSource, RatedReading};
use time::{Date, Duration};

use crate::pipeline::Transform;

/// The three invoice histories of a site.
#[derive(Debug, Clone, Default)]
pub struct InvoiceHistories {
    pub electric: Vec<InvoiceRecord>,
    pub gas: Vec<InvoiceRecord>,
    pub water: Vec<InvoiceRecord>,
}

impl InvoiceHistories {
    pub fn history(&self, source: InvoiceSource) -> &[InvoiceRecord] {
        match source {
            InvoiceSource::Electric => &self.electric,
            InvoiceSource::Gas => &self.gas,
            InvoiceSource::Water => &self.water,
        }
    }

    /// All records, electric first, then gas, then water, each in file order.
    pub fn by_precedence(&self) -> impl Iterator<Item = &InvoiceRecord> {
        InvoiceSource::PRECEDENCE
            .into_iter()
            .flat_map(move |source| self.history(source).iter())
    }

    pub fn len(&self) -> usize {
        self.electric.len() + self.gas.len() + self.water.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Recharge rates keyed by meter reference and billing date.
///
/// When a key occurs more than once the first record in precedence order
/// (electric, gas, water; file order within a history) wins. Readings are
/// rated by the windowed scan alone; the keyed index only answers
/// point queries.
#[derive(Debug, Clone, Default)]
pub struct RateIndex {
    exact: HashMap<(String, Date), f64>,
    candidates: HashMap<String, Vec<(Date, f64)>>,
}

impl RateIndex {
    pub fn build(histories: &InvoiceHistories) -> Self {
        let mut index = RateIndex::default();
        let mut conflicts = 0usize;

        for rec in histories.by_precedence() {
            let key = (rec.identifier.clone(), rec.billing_date);
            match index.exact.get(&key) {
                Some(existing) => {
                    if *existing != rec.rate {
                        conflicts += 1;
                        tracing::debug!(
                            identifier = %rec.identifier,
                            billing_date = %rec.billing_date,
                            source = %rec.source,
                            kept = existing,
                            ignored = rec.rate,
                            "duplicate invoice key with a different rate"
                        );
                    }
                }
                None => {
                    index.exact.insert(key, rec.rate);
                }
            }

            index
                .candidates
                .entry(rec.identifier.clone())
                .or_default()
                .push((rec.billing_date, rec.rate));
        }

        if conflicts > 0 {
            tracing::warn!(conflicts, "invoice histories disagree on some rates; earlier source kept");
        }

        index
    }

    pub fn exact(&self, identifier: &str, date: Date) -> Option<f64> {
        self.exact.get(&(identifier.to_string(), date)).copied()
    }

    /// First candidate billed within `date ± window_days` (inclusive), in
    /// precedence order. No preference for the closest date.
    pub fn within_window(&self, identifier: &str, date: Date, window_days: u32) -> Option<f64> {
        let span = Duration::days(i64::from(window_days));
        let start = date.checked_sub(span).unwrap_or(Date::MIN);
        let end = date.checked_add(span).unwrap_or(Date::MAX);

        self.candidates
            .get(identifier)?
            .iter()
            .find(|(billed, _)| *billed >= start && *billed <= end)
            .map(|(_, rate)| *rate)
    }

    /// Rate for a reading: the first windowed candidate, even when another
    /// invoice was billed on the reading date itself.
    pub fn resolve(&self, identifier: &str, date: Date, window_days: u32) -> Option<f64> {
        self.within_window(identifier, date, window_days)
    }
}

/// Attaches the rate of the first invoice inside the matching window to
/// each reading.
pub struct RateResolver {
    index: RateIndex,
    window_days: u32,
}

impl RateResolver {
    pub fn new(index: RateIndex, window_days: u32) -> Self {
        Self { index, window_days }
    }

    pub fn from_histories(histories: &InvoiceHistories, window_days: u32) -> Self {
        Self::new(RateIndex::build(histories), window_days)
    }
}

impl Transform<IdentifiedReading, RatedReading> for RateResolver {
    fn apply(&self, input: Vec<IdentifiedReading>) -> Vec<RatedReading> {
        input
            .into_iter()
            .map(|reading| {
                let rate = reading
                    .identifier
                    .as_deref()
                    .and_then(|id| self.index.resolve(id, reading.date, self.window_days));
                if let (Some(id), Some(rate)) = (reading.identifier.as_deref(), rate) {
                    if let Some(same_day) = self.index.exact(id, reading.date).filter(|r| *r != rate) {
                        tracing::debug!(
                            identifier = id,
                            date = %reading.date,
                            rate,
                            same_day,
                            "same-day invoice outranked by an earlier source"
                        );
                    }
                }
                if rate.is_none() {
                    metrics::counter!("recharge_unrated_readings_total").increment(1);
                    tracing::debug!(
                        site = %reading.site,
                        utility = %reading.utility,
                        identifier = reading.identifier.as_deref().unwrap_or("-"),
                        date = %reading.date,
                        "no invoice rate within window"
                    );
                }
                RatedReading::new(reading, rate)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recharge_client::domain::UtilityType;
    use time::macros::date;

    fn invoice(source: InvoiceSource, id: &str, billed: Date, rate: f64) -> InvoiceRecord {
        InvoiceRecord {
            source,
            identifier: id.to_string(),
            billing_date: billed,
            consumption: 1.0,
            gross_charge: rate,
            rate,
        }
    }

    fn reading(id: Option<&str>, date: Date) -> IdentifiedReading {
        IdentifiedReading {
            date,
            site: "Unit 1".into(),
            utility: UtilityType::Electric,
            consumption: 100.0,
            identifier: id.map(str::to_string),
        }
    }

    #[test]
    fn electric_wins_over_gas_inside_window() {
        let histories = InvoiceHistories {
            electric: vec![invoice(InvoiceSource::Electric, "M-1", date!(2024 - 03 - 14), 0.30)],
            gas: vec![invoice(InvoiceSource::Gas, "M-1", date!(2024 - 03 - 16), 0.10)],
            water: vec![],
        };
        let out = RateResolver::from_histories(&histories, 1)
            .apply(vec![reading(Some("M-1"), date!(2024 - 03 - 15))]);
        assert_eq!(out[0].recharge_rate, Some(0.30));
    }

    #[test]
    fn gas_wins_over_water_when_no_electric() {
        let histories = InvoiceHistories {
            electric: vec![],
            gas: vec![invoice(InvoiceSource::Gas, "M-1", date!(2024 - 03 - 16), 0.10)],
            water: vec![invoice(InvoiceSource::Water, "M-1", date!(2024 - 03 - 14), 2.0)],
        };
        let index = RateIndex::build(&histories);
        assert_eq!(index.within_window("M-1", date!(2024 - 03 - 15), 1), Some(0.10));
    }

    #[test]
    fn window_is_inclusive_and_bounded() {
        let histories = InvoiceHistories {
            electric: vec![invoice(InvoiceSource::Electric, "M-1", date!(2024 - 03 - 17), 0.30)],
            ..Default::default()
        };
        let index = RateIndex::build(&histories);
        assert_eq!(index.within_window("M-1", date!(2024 - 03 - 15), 1), None);
        assert_eq!(index.within_window("M-1", date!(2024 - 03 - 15), 2), Some(0.30));
        assert_eq!(index.within_window("M-1", date!(2024 - 03 - 18), 1), Some(0.30));
    }

    #[test]
    fn first_found_wins_without_closeness_tie_break() {
        let histories = InvoiceHistories {
            electric: vec![
                invoice(InvoiceSource::Electric, "M-1", date!(2024 - 03 - 16), 0.40),
                invoice(InvoiceSource::Electric, "M-1", date!(2024 - 03 - 14), 0.20),
            ],
            ..Default::default()
        };
        let index = RateIndex::build(&histories);
        assert_eq!(index.within_window("M-1", date!(2024 - 03 - 15), 1), Some(0.40));
    }

    #[test]
    fn same_day_gas_does_not_beat_electric_in_window() {
        let histories = InvoiceHistories {
            electric: vec![invoice(InvoiceSource::Electric, "M-1", date!(2024 - 03 - 14), 0.30)],
            gas: vec![invoice(InvoiceSource::Gas, "M-1", date!(2024 - 03 - 15), 0.10)],
            water: vec![],
        };
        let index = RateIndex::build(&histories);
        assert_eq!(index.exact("M-1", date!(2024 - 03 - 15)), Some(0.10));
        assert_eq!(index.resolve("M-1", date!(2024 - 03 - 15), 1), Some(0.30));

        let out = RateResolver::new(index, 1).apply(vec![reading(Some("M-1"), date!(2024 - 03 - 15))]);
        assert_eq!(out[0].recharge_rate, Some(0.30));
    }

    #[test]
    fn same_day_invoice_does_not_beat_earlier_row_of_same_history() {
        let histories = InvoiceHistories {
            electric: vec![
                invoice(InvoiceSource::Electric, "M-1", date!(2024 - 03 - 14), 0.20),
                invoice(InvoiceSource::Electric, "M-1", date!(2024 - 03 - 15), 0.25),
            ],
            ..Default::default()
        };
        let index = RateIndex::build(&histories);
        assert_eq!(index.resolve("M-1", date!(2024 - 03 - 15), 1), Some(0.20));
    }

    #[test]
    fn duplicate_keys_keep_precedence_order() {
        let billed = date!(2024 - 03 - 01);
        let histories = InvoiceHistories {
            electric: vec![invoice(InvoiceSource::Electric, "M-1", billed, 0.30)],
            gas: vec![invoice(InvoiceSource::Gas, "M-1", billed, 0.10)],
            water: vec![invoice(InvoiceSource::Water, "M-1", billed, 2.0)],
        };
        assert_eq!(RateIndex::build(&histories).exact("M-1", billed), Some(0.30));
    }

    #[test]
    fn unidentified_or_unmatched_readings_stay_unrated() {
        let histories = InvoiceHistories {
            gas: vec![invoice(InvoiceSource::Gas, "M-1", date!(2024 - 03 - 15), 0.10)],
            ..Default::default()
        };
        let out = RateResolver::from_histories(&histories, 1).apply(vec![
            reading(None, date!(2024 - 03 - 15)),
            reading(Some("M-2"), date!(2024 - 03 - 15)),
            reading(Some("M-1"), date!(2024 - 05 - 15)),
        ]);
        assert!(out.iter().all(|r| r.recharge_rate.is_none()));
        assert_eq!(out[0].consumption, 100.0);
    }

    #[test]
    fn by_precedence_orders_histories() {
        let d = date!(2024 - 01 - 01);
        let histories = InvoiceHistories {
            electric: vec![invoice(InvoiceSource::Electric, "e", d, 1.0)],
            gas: vec![invoice(InvoiceSource::Gas, "g", d, 1.0)],
            water: vec![invoice(InvoiceSource::Water, "w", d, 1.0)],
        };
        let ids: Vec<&str> = histories.by_precedence().map(|r| r.identifier.as_str()).collect();
        assert_eq!(ids, vec!["e", "g", "w"]);
        assert_eq!(histories.len(), 3);
        assert!(!histories.is_empty());
        assert!(InvoiceHistories::default().is_empty());
    }
}
