//! SQLite storage implementation for report subscriptions and logs.

mod model;
mod repository;

pub use model::{ReportLogDB, ReportSubscriptionDB};
pub use repository::ReportRepository;
