//! Output formatting for results delivered as chat messages

pub mod text;

pub use text::format_report;
