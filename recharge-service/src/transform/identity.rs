use recharge_client::domain::{ConsumptionRow, IdentifiedReading};

use crate::{config::TenantConfig, pipeline::Transform};

/// Attaches the configured meter reference to each consumption row.
///
/// Rows whose site or utility is not configured keep no identifier.
pub struct IdentityResolver<'a> {
    tenants: &'a TenantConfig,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(tenants: &'a TenantConfig) -> Self {
        Self { tenants }
    }
}

impl Transform<ConsumptionRow, IdentifiedReading> for IdentityResolver<'_> {
    fn apply(&self, input: Vec<ConsumptionRow>) -> Vec<IdentifiedReading> {
        input
            .into_iter()
            .map(|row| {
                let identifier = self
                    .tenants
                    .identifier_for(&row.site, row.utility)
                    .map(str::to_string);
                if identifier.is_none() {
                    metrics::counter!("recharge_unresolved_identifiers_total").increment(1);
                    tracing::debug!(site = %row.site, utility = %row.utility, "no identifier configured");
                }
                IdentifiedReading::new(row, identifier)
            })
            .collect()
    }
}
