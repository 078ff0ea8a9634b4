//! Fintrack Core - periodic financial event processing.
//!
//! This crate contains the domain models, period arithmetic, aggregation
//! and job logic for fintrack. It is database-agnostic and defines traits
//! that are implemented by the `storage-sqlite` crate.

pub mod aggregation;
pub mod commit;
pub mod constants;
pub mod errors;
pub mod jobs;
pub mod money;
pub mod notifications;
pub mod owners;
pub mod period;
pub mod reports;
pub mod scanner;
pub mod transactions;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
