//! Jobs module - the three periodic jobs and the orchestrator that runs them.

mod cadence;
mod isolation;
mod jobs_model;
mod jobs_traits;
mod orchestrator;
mod recurring_job;
mod report_job;
mod savings_check_job;

pub use cadence::Cadence;
pub use isolation::panic_message;
pub use jobs_model::{ItemOutcome, ItemState, JobRunSummary};
pub use jobs_traits::ScheduledJob;
pub use orchestrator::{JobOrchestrator, JobRegistration};
pub use recurring_job::RecurringTransactionJob;
pub use report_job::ReportJob;
pub use savings_check_job::{
    salary_period, savings_alert_threshold_minor, savings_threshold_reached, SavingsCheckJob,
};

#[cfg(test)]
mod test_support;
