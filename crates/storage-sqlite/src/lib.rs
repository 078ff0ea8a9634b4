//! SQLite storage implementation for fintrack.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository and committer traits defined in `fintrack-core` and contains:
//! - Database connection pooling and the single-writer actor
//! - Diesel migrations
//! - Repository implementations for owners, transactions and report subscriptions
//! - The compare-and-set due-state committer
//!
//! # Architecture
//!
//! This crate is the only place in the workspace where Diesel dependencies exist.
//! The core crate and the processor binary work with traits.
//!
//! ```text
//! core (domain, jobs)    processor (binary)
//!       │                      │
//!       └──────────┬───────────┘
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```

pub mod commit;
pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod owners;
pub mod reports;
pub mod transactions;

mod scan;

#[cfg(test)]
mod test_support;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

pub use commit::DueStateCommitter;
pub use owners::OwnerRepository;
pub use reports::ReportRepository;
pub use transactions::TransactionRepository;

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from fintrack-core for convenience
pub use fintrack_core::errors::{DatabaseError, Error, Result};
