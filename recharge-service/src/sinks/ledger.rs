use std::path::{Path, PathBuf};

use recharge_client::{
    dates,
    domain::{reading::flow_label, ChargedReading, MeterReading},
    schema, Table,
};

use crate::{
    config::TenantConfig,
    pipeline::{PipelineError, Sink},
    sinks::csv_file::write_table,
    sources::table_file::read_delimited,
};

pub const COMMERCIAL_CHARGES: &str = "commercial_charges.csv";
pub const RESIDENT_CHARGES: &str = "resident_charges.csv";
pub const NEW_FORM: &str = "new_form.csv";
pub const HISTORICAL_CHARGES: &str = "historical_charges.csv";
pub const HISTORICAL_READINGS: &str = "historical_readings.csv";

/// Everything a run persists: the raw readings it consumed and the
/// charges it produced.
#[derive(Debug, Clone, Default)]
pub struct RechargeArtifacts {
    pub readings: Vec<MeterReading>,
    pub charges: Vec<ChargedReading>,
}

pub fn charges_table(charges: &[ChargedReading]) -> Table {
    let mut table = Table::new(ChargedReading::column_names().iter().copied());
    for c in charges {
        table.push_row(c.to_row());
    }
    table
}

pub fn readings_table(readings: &[MeterReading]) -> Table {
    let mut table = Table::new(MeterReading::column_names().iter().copied());
    for r in readings {
        table.push_row(r.to_row());
    }
    table
}

/// Blank form for the next period: the period date moves forward one month
/// and this period's present reading becomes the next previous reading.
pub fn new_form_table(readings: &[MeterReading]) -> Table {
    let mut table = Table::new(schema::READING_COLUMNS);
    for r in readings {
        table.push_row(vec![
            dates::format_iso(dates::add_one_month(r.date)),
            r.site.clone(),
            r.utility.code().to_string(),
            r.sub_utility.clone().unwrap_or_default(),
            flow_label(r.flow).to_string(),
            r.present_reading.to_string(),
            r.present_date.clone().unwrap_or_default(),
            String::new(),
            String::new(),
        ]);
    }
    table
}

/// Writes the per-run output directory.
pub struct LedgerWriter<'a> {
    output_dir: PathBuf,
    tenants: &'a TenantConfig,
    historical_charges: Option<PathBuf>,
    historical_readings: Option<PathBuf>,
}

impl<'a> LedgerWriter<'a> {
    pub fn new(output_dir: impl Into<PathBuf>, tenants: &'a TenantConfig) -> Self {
        Self {
            output_dir: output_dir.into(),
            tenants,
            historical_charges: None,
            historical_readings: None,
        }
    }

    pub fn with_history(mut self, charges: Option<PathBuf>, readings: Option<PathBuf>) -> Self {
        self.historical_charges = charges;
        self.historical_readings = readings;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn split_by_commercial(&self, charges: &[ChargedReading]) -> Result<(), PipelineError> {
        let all = charges_table(charges);
        let site_col = all.column_index(schema::SITE);
        let is_commercial = |row: &recharge_client::table::RowRef<'_>| {
            site_col
                .map(|i| self.tenants.is_commercial(&row.values()[i]))
                .unwrap_or(false)
        };

        let commercial = all.filter_rows(|r| is_commercial(r));
        let residents = all.filter_rows(|r| !is_commercial(r));
        tracing::info!(
            commercial = commercial.len(),
            residents = residents.len(),
            "charges split by tenant category"
        );

        write_table(&self.output_dir.join(COMMERCIAL_CHARGES), &commercial, "commercial charges")?;
        write_table(&self.output_dir.join(RESIDENT_CHARGES), &residents, "resident charges")
    }

    pub fn write_new_form(&self, readings: &[MeterReading]) -> Result<(), PipelineError> {
        write_table(&self.output_dir.join(NEW_FORM), &new_form_table(readings), "new form")
    }

    pub fn append_charges_history(&self, charges: &[ChargedReading]) -> Result<(), PipelineError> {
        self.append_history(
            charges_table(charges),
            self.historical_charges.as_deref(),
            HISTORICAL_CHARGES,
            "historical charges",
        )
    }

    pub fn append_readings_history(&self, readings: &[MeterReading]) -> Result<(), PipelineError> {
        self.append_history(
            readings_table(readings),
            self.historical_readings.as_deref(),
            HISTORICAL_READINGS,
            "historical readings",
        )
    }

    /// Prepend `current` to the prior ledger (newest first) and write the
    /// result. Stray index columns from earlier exports are dropped.
    fn append_history(
        &self,
        current: Table,
        prior: Option<&Path>,
        file_name: &str,
        artifact: &'static str,
    ) -> Result<(), PipelineError> {
        let prior = match prior {
            Some(path) => read_delimited(path)?.without_columns(schema::is_index_column),
            None => {
                tracing::info!(artifact, "no prior ledger configured, starting a new one");
                Table::default()
            }
        };

        let prior_rows = prior.len();
        let merged = current.prepend_to(prior);
        tracing::info!(artifact, prior_rows, total_rows = merged.len(), "ledger appended");
        write_table(&self.output_dir.join(file_name), &merged, artifact)
    }

    /// Attempt every write in order; failures are collected, not short-circuited.
    pub fn write_all(&self, artifacts: &RechargeArtifacts) -> Result<(), PipelineError> {
        let results = [
            self.split_by_commercial(&artifacts.charges),
            self.write_new_form(&artifacts.readings),
            self.append_charges_history(&artifacts.charges),
            self.append_readings_history(&artifacts.readings),
        ];

        let failures: Vec<PipelineError> = results.into_iter().filter_map(Result::err).collect();
        if failures.is_empty() {
            return Ok(());
        }

        for e in &failures {
            metrics::counter!("recharge_ledger_write_errors_total").increment(1);
            tracing::error!(error = %e, "ledger write failed");
        }
        Err(PipelineError::Ledger(failures))
    }
}

impl Sink<RechargeArtifacts> for LedgerWriter<'_> {
    fn write(&self, input: &RechargeArtifacts) -> Result<(), PipelineError> {
        self.write_all(input)
    }
}
