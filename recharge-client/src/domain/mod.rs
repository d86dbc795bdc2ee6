pub mod charge;
pub mod invoice;
pub mod reading;
pub mod utility;

pub use charge::{ChargedReading, IdentifiedReading, RatedReading};
pub use invoice::{InvoiceRecord, InvoiceSource};
pub use reading::{ConsumptionRow, MeterReading};
pub use utility::UtilityType;
