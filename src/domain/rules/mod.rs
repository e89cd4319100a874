//! Domain rules - invariants shared by the parser and aggregation

pub mod dedup;

pub use dedup::{dedup, dedup_people, identity_key, is_deleted_account};
