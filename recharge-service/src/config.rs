use recharge_client::{dates, domain::UtilityType};
use serde::Deserialize;
use std::{collections::BTreeMap, fs, path::PathBuf};
use time::{Date, Month};

use crate::pipeline::PipelineError;

/// Site name prefix whose units share one set of meter references.
pub const SHARED_HOUSE_PREFIX: &str = "House";

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    /// Parent folder of the per-run output directory.
    pub output_root: PathBuf,
    /// `YYYY-MM` or `YYYY-MM-DD`.
    #[serde(default)]
    pub recharge_month: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputsConfig {
    pub readings: PathBuf,
    /// Worksheet to read when `readings` is a workbook. Defaults to the first.
    #[serde(default)]
    pub readings_sheet: Option<String>,
    pub gas_invoices: PathBuf,
    pub electric_invoices: PathBuf,
    pub water_invoices: PathBuf,
    /// Absent on a site's first run.
    #[serde(default)]
    pub historical_charges: Option<PathBuf>,
    #[serde(default)]
    pub historical_readings: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateConfig {
    #[serde(default = "default_window_days")]
    pub window_days: u32,
}

fn default_window_days() -> u32 {
    1
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub textfile_path: PathBuf,
}

/// Meter references of one site.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeterIdentifiers {
    pub mpr: Option<String>,
    pub mpan: Option<String>,
    pub water: Option<String>,
}

impl MeterIdentifiers {
    /// Gas uses the MPR, electric the MPAN, water the water meter reference.
    pub fn for_utility(&self, utility: UtilityType) -> Option<&str> {
        match utility {
            UtilityType::Gas => self.mpr.as_deref(),
            UtilityType::Electric => self.mpan.as_deref(),
            UtilityType::Water => self.water.as_deref(),
        }
    }
}

/// Tenant configuration for one run.
///
/// Every lookup returns `None` when the site or utility is not configured.
/// Callers decide the default: no identifier, a fixed charge of zero, a
/// multiplier of one when scaling consumption and zero when reporting it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TenantConfig {
    #[serde(default)]
    pub identifiers: BTreeMap<String, MeterIdentifiers>,
    /// Site -> utility (`G`/`E`/`W` or `Gas`/`Electric`/`Water`) -> amount.
    #[serde(default)]
    pub fixed_charges: BTreeMap<String, BTreeMap<String, f64>>,
    #[serde(default)]
    pub multipliers: BTreeMap<String, BTreeMap<String, f64>>,
    #[serde(default)]
    pub commercial: Vec<String>,
}

impl TenantConfig {
    pub fn identifier_for(&self, site: &str, utility: UtilityType) -> Option<&str> {
        let key = if site.starts_with(SHARED_HOUSE_PREFIX) {
            SHARED_HOUSE_PREFIX
        } else {
            site
        };
        self.identifiers.get(key)?.for_utility(utility)
    }

    pub fn fixed_charge_for(&self, site: &str, utility: UtilityType) -> Option<f64> {
        lookup_by_utility(&self.fixed_charges, site, utility)
    }

    pub fn multiplier_for(&self, site: &str, utility: UtilityType) -> Option<f64> {
        lookup_by_utility(&self.multipliers, site, utility)
    }

    pub fn is_commercial(&self, site: &str) -> bool {
        self.commercial.iter().any(|s| s == site)
    }
}

fn lookup_by_utility(
    map: &BTreeMap<String, BTreeMap<String, f64>>,
    site: &str,
    utility: UtilityType,
) -> Option<f64> {
    let per_site = map.get(site)?;
    per_site
        .iter()
        .find(|(key, _)| key.parse::<UtilityType>().ok() == Some(utility))
        .map(|(_, v)| *v)
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub inputs: InputsConfig,
    #[serde(default)]
    pub rates: RateConfig,
    #[serde(default)]
    pub tenants: TenantConfig,
    pub metrics: Option<MetricsConfig>,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let path = env::var("RECHARGE_CONFIG").unwrap_or_else(|_| "recharge-config.toml".to_string());
        let contents = fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("failed to read config '{path}': {e}"))?;
        Ok(Self::from_toml(&contents)?)
    }

    pub fn from_toml(input: &str) -> Result<Self, PipelineError> {
        let cfg: AppConfig = toml::from_str(input).map_err(|e| PipelineError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.site.name.trim().is_empty() {
            return Err(PipelineError::Config("site.name must not be empty".into()));
        }

        for (label, map) in [
            ("fixed_charges", &self.tenants.fixed_charges),
            ("multipliers", &self.tenants.multipliers),
        ] {
            for (site, per_site) in map {
                for (key, value) in per_site {
                    if key.parse::<UtilityType>().is_err() {
                        return Err(PipelineError::Config(format!(
                            "tenants.{label}.\"{site}\": unknown utility '{key}'"
                        )));
                    }
                    if !value.is_finite() {
                        return Err(PipelineError::Config(format!(
                            "tenants.{label}.\"{site}\".{key} must be a finite number"
                        )));
                    }
                }
            }
        }

        if let Some(month) = &self.site.recharge_month {
            parse_recharge_month(month)?;
        }

        Ok(())
    }

    pub fn recharge_month(&self) -> Result<Option<Date>, PipelineError> {
        self.site
            .recharge_month
            .as_deref()
            .map(parse_recharge_month)
            .transpose()
    }
}

/// Parse `YYYY-MM` (first of the month) or a full `YYYY-MM-DD` date.
pub fn parse_recharge_month(s: &str) -> Result<Date, PipelineError> {
    let trimmed = s.trim();
    let bad = || PipelineError::Config(format!("invalid recharge month '{trimmed}'"));

    if let Ok(date) = dates::parse_iso_date(trimmed) {
        return Ok(date);
    }

    let (year, month) = trimmed.split_once('-').ok_or_else(bad)?;
    let year: i32 = year.parse().map_err(|_| bad())?;
    let month: u8 = month.parse().map_err(|_| bad())?;
    let month = Month::try_from(month).map_err(|_| bad())?;
    Date::from_calendar_date(year, month, 1).map_err(|_| bad())
}
