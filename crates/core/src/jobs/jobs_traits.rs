use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::jobs_model::JobRunSummary;
use crate::errors::Result;

/// A batch job the orchestrator can trigger.
///
/// `run` returns `Err` only for job-level failures (the scan itself could not
/// proceed); item failures are counted in the summary.
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    fn label(&self) -> &str;

    async fn run(&self, now: DateTime<Utc>) -> Result<JobRunSummary>;
}
