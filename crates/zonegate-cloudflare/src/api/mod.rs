//! API endpoint modules.

mod records;

pub use records::{ListRecordsBuilder, RecordsApi};
