//! Application services - business logic orchestration

pub mod processing_service;

pub use processing_service::{Delivery, ProcessingService, ProcessingSettings, Route, RunReport};
