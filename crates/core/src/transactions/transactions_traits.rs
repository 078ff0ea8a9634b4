use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::transactions_model::{CategoryTotal, FinancialEvent, NewFinancialEvent};
use crate::errors::Result;
use crate::period::PeriodWindow;
use crate::scanner::{DueItem, ScanCursor};

/// Trait for transaction repository operations
#[async_trait]
pub trait TransactionRepositoryTrait: Send + Sync {
    async fn create(&self, new_event: NewFinancialEvent) -> Result<FinancialEvent>;

    fn get_by_id(&self, event_id: &str) -> Result<Option<FinancialEvent>>;

    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<FinancialEvent>>;

    /// Sums per `(type, category)` for one owner, `window.from <= date < window.to`.
    fn category_totals(&self, owner_id: &str, window: &PeriodWindow) -> Result<Vec<CategoryTotal>>;

    /// Recurring transactions with `next_occurrence_at <= now`, keyed by
    /// `(next_occurrence_at, id)` after `after`.
    fn due_recurring_page(
        &self,
        now: DateTime<Utc>,
        after: Option<&ScanCursor>,
        limit: i64,
    ) -> Result<Vec<DueItem<FinancialEvent>>>;

    /// Salary income with a savings goal and no alert sent yet, keyed by
    /// `(date, id)` after `after`. A category matches when it contains any of
    /// the keywords, ignoring ASCII case.
    fn salary_candidates_page(
        &self,
        salary_categories: &[String],
        after: Option<&ScanCursor>,
        limit: i64,
    ) -> Result<Vec<DueItem<FinancialEvent>>>;
}
