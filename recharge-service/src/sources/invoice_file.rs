use std::path::{Path, PathBuf};

use recharge_client::{
    dates,
    domain::{InvoiceRecord, InvoiceSource},
    schema, Table,
};

use crate::{
    pipeline::{PipelineError, Source},
    sources::{
        fields::{require_columns, Fields},
        table_file::read_delimited,
    },
};

/// Source column names of one supplier's invoice export.
#[derive(Debug, Clone, Copy)]
pub struct InvoiceLayout {
    pub identifier: &'static str,
    pub date: &'static str,
    pub consumption: &'static str,
    pub gross: &'static str,
    /// Column holding a precomputed rate, used as-is when present.
    pub rate: Option<&'static str>,
}

pub const GAS_LAYOUT: InvoiceLayout = InvoiceLayout {
    identifier: "mpr",
    date: "period_from",
    consumption: "consumption_kWh",
    gross: "net_charge",
    rate: None,
};

pub const ELECTRIC_LAYOUT: InvoiceLayout = InvoiceLayout {
    identifier: "MPAN/MPR",
    date: "Date",
    consumption: "Total Adjusted Energy Consumption (kWh)",
    gross: "Total Net (GBP)",
    rate: None,
};

pub const WATER_LAYOUT: InvoiceLayout = InvoiceLayout {
    identifier: "MPAN/MPR",
    date: "Date",
    consumption: "Consumption (m3)",
    gross: "Cost (£)",
    rate: Some(schema::RECHARGE_RATE),
};

impl InvoiceLayout {
    pub fn for_source(source: InvoiceSource) -> Self {
        match source {
            InvoiceSource::Electric => ELECTRIC_LAYOUT,
            InvoiceSource::Gas => GAS_LAYOUT,
            InvoiceSource::Water => WATER_LAYOUT,
        }
    }
}

/// CSV invoice history for one utility.
pub struct InvoiceFileSource {
    path: PathBuf,
    source: InvoiceSource,
}

impl InvoiceFileSource {
    pub fn new<P: Into<PathBuf>>(path: P, source: InvoiceSource) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }

    pub fn gas<P: Into<PathBuf>>(path: P) -> Self {
        Self::new(path, InvoiceSource::Gas)
    }

    pub fn electric<P: Into<PathBuf>>(path: P) -> Self {
        Self::new(path, InvoiceSource::Electric)
    }

    pub fn water<P: Into<PathBuf>>(path: P) -> Self {
        Self::new(path, InvoiceSource::Water)
    }
}

impl Source<InvoiceRecord> for InvoiceFileSource {
    fn load(&self) -> Result<Vec<InvoiceRecord>, PipelineError> {
        let table = read_delimited(&self.path)?;
        let records = invoices_from_table(&table, &self.path, self.source).map_err(|e| {
            metrics::counter!("recharge_invoice_parse_errors_total", "source" => self.source.as_str()).increment(1);
            e
        })?;
        tracing::info!(
            path = %self.path.display(),
            source = %self.source,
            rows = records.len(),
            "invoice history loaded"
        );
        Ok(records)
    }
}

pub fn invoices_from_table(
    table: &Table,
    path: &Path,
    source: InvoiceSource,
) -> Result<Vec<InvoiceRecord>, PipelineError> {
    let layout = InvoiceLayout::for_source(source);
    let explicit_rate = layout.rate.filter(|c| table.column_index(c).is_some());

    let mut required = vec![layout.identifier, layout.date];
    if explicit_rate.is_none() {
        required.extend([layout.consumption, layout.gross]);
    }
    require_columns(table, path, &required)?;

    let mut records = Vec::with_capacity(table.len());
    for row in table.iter() {
        let f = Fields::new(path, row);

        // Rows without a meter reference can never match a reading.
        let Some(identifier) = f.optional_text(layout.identifier) else {
            tracing::debug!(path = %path.display(), row = f.row_number(), "invoice row without identifier skipped");
            continue;
        };

        let date_str = f.text(layout.date)?;
        let billing_date = dates::parse_iso_date(date_str).map_err(|e| f.error(e.to_string()))?;

        let record = match explicit_rate {
            Some(rate_col) => InvoiceRecord {
                source,
                identifier: identifier.to_string(),
                billing_date,
                consumption: f.number_or_zero(layout.consumption)?,
                gross_charge: f.number_or_zero(layout.gross)?,
                rate: f.number_or_zero(rate_col)?,
            },
            None => InvoiceRecord::derived(
                source,
                identifier,
                billing_date,
                f.number(layout.consumption)?,
                f.number(layout.gross)?,
            ),
        };
        records.push(record);
    }

    Ok(records)
}
