//! Domain entities - Core business objects with no external dependencies

pub mod message;
pub mod result_bundle;
pub mod session;
pub mod user_entry;

pub use message::{Content, Message};
pub use result_bundle::{EntrySet, ResultBundle};
pub use session::{FileMeta, Session, SessionState};
pub use user_entry::{UserEntry, TME_BASE};
