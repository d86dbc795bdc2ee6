pub mod csv_file;
pub mod ledger;

pub use csv_file::write_table;
pub use ledger::{LedgerWriter, RechargeArtifacts};
