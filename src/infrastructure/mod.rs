//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Storage: Per-run scratch directories
//! - Spreadsheet: Excel report rendering
//! - Adapters: Platform integrations (Telegram, console)

pub mod adapters;
pub mod config;
pub mod spreadsheet;
pub mod storage;
