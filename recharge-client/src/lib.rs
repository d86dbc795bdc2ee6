pub mod dates;
pub mod domain;
pub mod error;
pub mod schema;
pub mod table;

pub use error::DomainError;
pub use table::Table;
