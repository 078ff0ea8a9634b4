//! Materialises due occurrences of recurring transactions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::sync::Arc;

use super::isolation::drain_scan;
use super::jobs_model::{ItemOutcome, JobRunSummary};
use super::jobs_traits::ScheduledJob;
use crate::commit::{DueStateCommitterTrait, RecurringOccurrenceCommit};
use crate::constants::{DEFAULT_SCAN_PAGE_SIZE, RECURRING_JOB_LABEL};
use crate::errors::{Result, ValidationError};
use crate::period::next_due_at;
use crate::scanner::{DueItem, PagedScan};
use crate::transactions::{FinancialEvent, TransactionRepositoryTrait};

pub struct RecurringTransactionJob {
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    committer: Arc<dyn DueStateCommitterTrait>,
    page_size: i64,
}

impl RecurringTransactionJob {
    pub fn new(
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        committer: Arc<dyn DueStateCommitterTrait>,
    ) -> Self {
        Self {
            transaction_repository,
            committer,
            page_size: DEFAULT_SCAN_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.page_size = page_size;
        self
    }

    async fn process_item(
        &self,
        item: DueItem<FinancialEvent>,
        now: DateTime<Utc>,
    ) -> Result<ItemOutcome> {
        let event = item.record;
        event.recurring.validate(&event.id)?;
        let (Some(interval), Some(due_at)) =
            (event.recurring.interval, event.recurring.next_occurrence_at)
        else {
            return Err(ValidationError::MalformedRecord {
                id: event.id.clone(),
                reason: "selected as due but not recurring".to_string(),
            }
            .into());
        };

        let commit = RecurringOccurrenceCommit {
            source_id: event.id.clone(),
            observed_next_occurrence_at: due_at,
            occurrence: event.occurrence_at(due_at),
            processed_at: now,
            next_occurrence_at: next_due_at(interval.into(), now),
        };
        let next_occurrence_at = commit.next_occurrence_at;
        let created = self.committer.commit_recurring_occurrence(commit).await?;
        debug!(
            "Recurring transaction {} produced {} dated {}, next occurrence {}",
            event.id, created.id, due_at, next_occurrence_at
        );
        Ok(ItemOutcome::Committed)
    }
}

#[async_trait]
impl ScheduledJob for RecurringTransactionJob {
    fn label(&self) -> &str {
        RECURRING_JOB_LABEL
    }

    async fn run(&self, now: DateTime<Utc>) -> Result<JobRunSummary> {
        info!("Scanning recurring transactions due at or before {}", now);
        let mut summary = JobRunSummary::new(self.label(), now);
        let repository = self.transaction_repository.clone();
        let scan = PagedScan::new(self.page_size, move |after, limit| {
            repository.due_recurring_page(now, after, limit)
        });
        drain_scan(self.label(), scan, &mut summary, |item, _owner| {
            self.process_item(item, now)
        })
        .await?;
        Ok(summary.finish(Utc::now()))
    }
}
