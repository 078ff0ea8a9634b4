use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::reports_model::{ReportLog, ReportSubscription, SubscriptionUpdate};
use crate::errors::Result;
use crate::scanner::{DueItem, ScanCursor};

/// Trait for report subscription repository operations
#[async_trait]
pub trait ReportRepositoryTrait: Send + Sync {
    fn get_subscription_for_owner(&self, owner_id: &str) -> Result<Option<ReportSubscription>>;

    /// Applies an owner's preference change; changing the cadence or
    /// re-enabling reschedules `next_report_at` from `now`.
    async fn update_subscription(
        &self,
        owner_id: &str,
        update: SubscriptionUpdate,
        now: DateTime<Utc>,
    ) -> Result<ReportSubscription>;

    /// Enabled subscriptions with `next_report_at <= now`, keyed by
    /// `(next_report_at, id)` after `after`.
    fn due_subscriptions_page(
        &self,
        now: DateTime<Utc>,
        after: Option<&ScanCursor>,
        limit: i64,
    ) -> Result<Vec<DueItem<ReportSubscription>>>;

    fn list_logs(&self, owner_id: &str) -> Result<Vec<ReportLog>>;
}
