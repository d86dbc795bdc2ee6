use time::Date;

/// Invoice history an [`InvoiceRecord`] came from.
///
/// Declaration order is rate precedence: electric, then gas, then water.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InvoiceSource {
    Electric,
    Gas,
    Water,
}

impl InvoiceSource {
    pub const PRECEDENCE: [InvoiceSource; 3] =
        [InvoiceSource::Electric, InvoiceSource::Gas, InvoiceSource::Water];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Electric => "electric",
            Self::Gas => "gas",
            Self::Water => "water",
        }
    }
}

impl std::fmt::Display for InvoiceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRecord {
    pub source: InvoiceSource,
    /// MPR / MPAN / water meter reference.
    pub identifier: String,
    pub billing_date: Date,
    pub consumption: f64,
    pub gross_charge: f64,
    pub rate: f64,
}

impl InvoiceRecord {
    /// Build a record whose rate is `gross_charge / consumption`.
    pub fn derived(
        source: InvoiceSource,
        identifier: impl Into<String>,
        billing_date: Date,
        consumption: f64,
        gross_charge: f64,
    ) -> Self {
        Self {
            source,
            identifier: identifier.into(),
            billing_date,
            consumption,
            gross_charge,
            rate: derive_rate(gross_charge, consumption),
        }
    }
}

/// Zero consumption (or any non-finite quotient) yields a zero rate.
pub fn derive_rate(gross_charge: f64, consumption: f64) -> f64 {
    if consumption == 0.0 {
        return 0.0;
    }
    let rate = gross_charge / consumption;
    if rate.is_finite() {
        rate
    } else {
        0.0
    }
}
