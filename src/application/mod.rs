//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Export: Telegram export parsing and aggregation
//! - Session: Per-chat upload state
//! - Services: Processing runs
//! - Messaging: Update parsing and dispatching
//! - Formatters and UI: Everything the user reads

pub mod errors;
pub mod export;
pub mod formatters;
pub mod messaging;
pub mod services;
pub mod session;
pub mod ui;

#[cfg(test)]
pub(crate) mod testing;
