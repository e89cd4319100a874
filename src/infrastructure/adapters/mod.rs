//! Transport adapters implementing [`Bot`](crate::domain::traits::Bot)

pub mod console;
pub mod telegram;
