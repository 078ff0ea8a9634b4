//! Sends periodic financial reports to subscribed owners.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::sync::Arc;

use super::isolation::drain_scan;
use super::jobs_model::{ItemOutcome, ItemState, JobRunSummary};
use super::jobs_traits::ScheduledJob;
use crate::aggregation::AggregationServiceTrait;
use crate::commit::{DueStateCommitterTrait, ReportCycleCommit};
use crate::constants::{DEFAULT_SCAN_PAGE_SIZE, REPORT_JOB_LABEL};
use crate::errors::Result;
use crate::notifications::{templates, EmailDispatcherTrait};
use crate::owners::OwnerContact;
use crate::period::{next_due_at, period_label, window_for, PeriodFrequency};
use crate::reports::{NewReportLog, ReportRepositoryTrait, ReportStatus, ReportSubscription};
use crate::scanner::{DueItem, PagedScan};

pub struct ReportJob {
    report_repository: Arc<dyn ReportRepositoryTrait>,
    aggregation_service: Arc<dyn AggregationServiceTrait>,
    dispatcher: Arc<dyn EmailDispatcherTrait>,
    committer: Arc<dyn DueStateCommitterTrait>,
    page_size: i64,
}

impl ReportJob {
    pub fn new(
        report_repository: Arc<dyn ReportRepositoryTrait>,
        aggregation_service: Arc<dyn AggregationServiceTrait>,
        dispatcher: Arc<dyn EmailDispatcherTrait>,
        committer: Arc<dyn DueStateCommitterTrait>,
    ) -> Self {
        Self {
            report_repository,
            aggregation_service,
            dispatcher,
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
        item: DueItem<ReportSubscription>,
        owner: OwnerContact,
        now: DateTime<Utc>,
    ) -> Result<ItemOutcome> {
        let subscription = item.record;
        let frequency = PeriodFrequency::from(subscription.frequency);
        let window = window_for(frequency, now);
        let label = period_label(frequency, &window);
        let summary = self
            .aggregation_service
            .summarize(&subscription.owner_id, &window)?;

        let status = if !summary.has_activity() {
            debug!(
                "No activity for owner {} in {}, skipping email",
                subscription.owner_id, label
            );
            ReportStatus::NoActivity
        } else {
            let message =
                templates::report_email(&owner, subscription.frequency, &label, &summary)?;
            debug!("Subscription {} {}", subscription.id, ItemState::SideEffectAttempted);
            match self.dispatcher.send(&message).await {
                Ok(()) => ReportStatus::Sent,
                Err(e) => {
                    warn!(
                        "Report for owner {} ({}) was not delivered: {}",
                        subscription.owner_id, label, e
                    );
                    ReportStatus::Failed
                }
            }
        };

        let commit = ReportCycleCommit {
            subscription_id: subscription.id.clone(),
            observed_next_report_at: subscription.next_report_at,
            log: NewReportLog {
                owner_id: subscription.owner_id.clone(),
                subscription_id: subscription.id.clone(),
                sent_date: now,
                period_label: label,
                status,
            },
            next_report_at: next_due_at(frequency, now),
            last_sent_at: (status == ReportStatus::Sent).then_some(now),
        };
        self.committer.commit_report_cycle(commit).await?;

        Ok(match status {
            ReportStatus::Failed => ItemOutcome::CommittedWithDispatchFailure,
            _ => ItemOutcome::Committed,
        })
    }
}

#[async_trait]
impl ScheduledJob for ReportJob {
    fn label(&self) -> &str {
        REPORT_JOB_LABEL
    }

    async fn run(&self, now: DateTime<Utc>) -> Result<JobRunSummary> {
        info!("Scanning report subscriptions due at or before {}", now);
        let mut summary = JobRunSummary::new(self.label(), now);
        let repository = self.report_repository.clone();
        let scan = PagedScan::new(self.page_size, move |after, limit| {
            repository.due_subscriptions_page(now, after, limit)
        });
        drain_scan(self.label(), scan, &mut summary, |item, owner| {
            self.process_item(item, owner, now)
        })
        .await?;
        Ok(summary.finish(Utc::now()))
    }
}
