//! User-facing copy and inline keyboards

pub mod keyboards;
pub mod texts;

/// Callback payloads carried by inline buttons
pub mod callbacks {
    pub const EXPORT_HELP: &str = "EXPORT_HELP";
    pub const FAQ: &str = "FAQ";
    pub const START_PROCESS: &str = "START_PROCESS";
    pub const PROCESS_OTHER: &str = "PROCESS_OTHER";
    pub const RESTART: &str = "RESTART";
}
