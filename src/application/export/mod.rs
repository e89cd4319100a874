//! Export ingestion - parsing single exports and combining several

pub mod aggregation;
pub mod parser;

pub use aggregation::process_many;
pub use parser::TelegramExportParser;
