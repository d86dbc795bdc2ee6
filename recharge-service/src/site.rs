use std::{fs, path::PathBuf};

use recharge_client::domain::{ChargedReading, MeterReading};
use time::Date;

use crate::{
    config::AppConfig,
    pipeline::{PipelineError, Sink, Source, Transform},
    sinks::{LedgerWriter, RechargeArtifacts},
    sources::{InvoiceFileSource, MeterReadingFileSource},
    summary::RunSummary,
    transform::{ChargeCalculator, ConsumptionAggregator, IdentityResolver, InvoiceHistories, RateResolver},
};

/// Charges for one period plus how many readings found no invoice rate.
#[derive(Debug, Clone, Default)]
pub struct CalculatedCharges {
    pub charges: Vec<ChargedReading>,
    pub unrated_readings: usize,
}

/// Entry point for one managed site.
pub struct Site {
    config: AppConfig,
}

impl Site {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// `<output_root>/<site>_<Month>_<Year>`, e.g. `out/Oakfield_March_2024`.
    pub fn saving_path(&self, month: Date) -> PathBuf {
        self.config.site.output_root.join(format!(
            "{}_{}_{}",
            self.config.site.name,
            month.month(),
            month.year()
        ))
    }

    pub fn create_saving_path(&self, month: Date) -> Result<PathBuf, PipelineError> {
        let dir = self.saving_path(month);
        fs::create_dir_all(&dir).map_err(|e| PipelineError::Sink {
            artifact: "output directory",
            path: dir.clone(),
            message: e.to_string(),
        })?;
        Ok(dir)
    }

    pub fn get_data(&self) -> Result<Vec<MeterReading>, PipelineError> {
        MeterReadingFileSource::new(&self.config.inputs.readings)
            .with_sheet(self.config.inputs.readings_sheet.clone())
            .load()
    }

    pub fn invoice_history(&self) -> Result<InvoiceHistories, PipelineError> {
        let inputs = &self.config.inputs;
        Ok(InvoiceHistories {
            electric: InvoiceFileSource::electric(&inputs.electric_invoices).load()?,
            gas: InvoiceFileSource::gas(&inputs.gas_invoices).load()?,
            water: InvoiceFileSource::water(&inputs.water_invoices).load()?,
        })
    }

    /// Aggregate, identify, rate and charge. Touches no files.
    pub fn calculate_charges(
        &self,
        readings: &[MeterReading],
        histories: &InvoiceHistories,
    ) -> CalculatedCharges {
        let tenants = &self.config.tenants;

        let consumption = ConsumptionAggregator::new(tenants).apply(readings.to_vec());
        let identified = IdentityResolver::new(tenants).apply(consumption);
        let rated = RateResolver::from_histories(histories, self.config.rates.window_days).apply(identified);
        let unrated_readings = rated.iter().filter(|r| r.recharge_rate.is_none()).count();
        let charges = ChargeCalculator::new(tenants).apply(rated);

        CalculatedCharges {
            charges,
            unrated_readings,
        }
    }

    /// Month precedence: `month`, then `[site] recharge_month`, then the
    /// latest reading date.
    pub fn resolve_month(
        &self,
        month: Option<Date>,
        readings: &[MeterReading],
    ) -> Result<Date, PipelineError> {
        if let Some(month) = month {
            return Ok(month);
        }
        if let Some(month) = self.config.recharge_month()? {
            return Ok(month);
        }
        readings.iter().map(|r| r.date).max().ok_or_else(|| {
            PipelineError::Config("no recharge month configured and no readings to infer it from".into())
        })
    }

    /// Run the whole recharge for one period and persist every artifact.
    pub fn recharge_tenants(&self, month: Option<Date>) -> Result<RunSummary, PipelineError> {
        let readings = self.get_data()?;
        let histories = self.invoice_history()?;
        if histories.is_empty() {
            tracing::warn!(site = %self.config.site.name, "no invoices loaded, every reading will be unrated");
        }
        tracing::info!(
            site = %self.config.site.name,
            readings = readings.len(),
            invoices = histories.len(),
            "inputs loaded"
        );

        let month = self.resolve_month(month, &readings)?;
        let output_dir = self.create_saving_path(month)?;

        let CalculatedCharges {
            charges,
            unrated_readings,
        } = self.calculate_charges(&readings, &histories);

        let inputs = &self.config.inputs;
        let writer = LedgerWriter::new(output_dir, &self.config.tenants)
            .with_history(inputs.historical_charges.clone(), inputs.historical_readings.clone());

        let summary = RunSummary::from_charges(
            writer.output_dir().to_path_buf(),
            readings.len(),
            unrated_readings,
            &charges,
        );
        writer.write(&RechargeArtifacts { readings, charges })?;

        tracing::info!(
            site = %self.config.site.name,
            output_dir = %summary.output_dir.display(),
            charged_rows = summary.charged_rows,
            unresolved_identifiers = summary.unresolved_identifiers,
            unrated_readings = summary.unrated_readings,
            total_gross = summary.total_gross,
            digest = %summary.digest,
            "recharging forms complete"
        );
        Ok(summary)
    }
}
