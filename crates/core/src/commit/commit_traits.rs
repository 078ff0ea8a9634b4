use async_trait::async_trait;

use super::commit_model::{RecurringOccurrenceCommit, ReportCycleCommit, SavingsAlertCommit};
use crate::errors::Result;
use crate::reports::ReportLog;
use crate::transactions::FinancialEvent;

/// Applies due-item state transitions, each inside one atomic transaction.
///
/// When the observed due marker no longer matches, implementations return
/// [`crate::Error::StaleDueState`] and leave the item untouched.
#[async_trait]
pub trait DueStateCommitterTrait: Send + Sync {
    async fn commit_recurring_occurrence(
        &self,
        commit: RecurringOccurrenceCommit,
    ) -> Result<FinancialEvent>;

    async fn commit_report_cycle(&self, commit: ReportCycleCommit) -> Result<ReportLog>;

    async fn commit_savings_alert(&self, commit: SavingsAlertCommit) -> Result<()>;
}
