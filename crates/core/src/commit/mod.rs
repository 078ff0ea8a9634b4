//! Commit module - the transactional state committer contract.

mod commit_model;
mod commit_traits;

pub use commit_model::{RecurringOccurrenceCommit, ReportCycleCommit, SavingsAlertCommit};
pub use commit_traits::DueStateCommitterTrait;
