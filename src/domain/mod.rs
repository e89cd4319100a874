//! Domain layer - Core business logic with no external dependencies
//! 
//! This layer contains:
//! - Entities: Core business objects (UserEntry, ResultBundle, Session, Message)
//! - Traits: Abstractions for infrastructure (Bot)
//! - Rules: Business logic invariants (deduplication)

pub mod entities;
pub mod rules;
pub mod traits;
