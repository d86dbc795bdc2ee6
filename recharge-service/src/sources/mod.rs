pub mod fields;
pub mod invoice_file;
pub mod meter_readings_file;
pub mod table_file;

pub use invoice_file::InvoiceFileSource;
pub use meter_readings_file::MeterReadingFileSource;
pub use table_file::{load_table, LoadedTable};
