pub mod aggregate;
pub mod charges;
pub mod identity;
pub mod rates;

pub use aggregate::ConsumptionAggregator;
pub use charges::ChargeCalculator;
pub use identity::IdentityResolver;
pub use rates::{InvoiceHistories, RateIndex, RateResolver};
