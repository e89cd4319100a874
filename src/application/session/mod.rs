//! Session lifecycle - per-chat upload state with TTL expiry

pub mod store;

pub use store::{lock, Admission, ProcessRejection, RunTicket, SessionHandle, SessionStore, Touch};
