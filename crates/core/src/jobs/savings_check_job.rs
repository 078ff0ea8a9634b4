//! Warns owners when spending since a salary deposit eats into their savings goal.

use async_trait::async_trait;
use chrono::{DateTime, Months, Utc};
use log::{debug, info};
use std::sync::Arc;

use super::isolation::drain_scan;
use super::jobs_model::{ItemOutcome, ItemState, JobRunSummary};
use super::jobs_traits::ScheduledJob;
use crate::aggregation::AggregationServiceTrait;
use crate::commit::{DueStateCommitterTrait, SavingsAlertCommit};
use crate::constants::{
    DEFAULT_SALARY_CATEGORIES, DEFAULT_SCAN_PAGE_SIZE, MAX_SAVINGS_GOAL_PERCENTAGE,
    MIN_SAVINGS_GOAL_PERCENTAGE, SAVINGS_ALERT_THRESHOLD_PERCENT, SAVINGS_JOB_LABEL,
};
use crate::errors::{Result, ValidationError};
use crate::notifications::{templates, EmailDispatcherTrait};
use crate::owners::OwnerContact;
use crate::period::PeriodWindow;
use crate::scanner::{DueItem, PagedScan};
use crate::transactions::{FinancialEvent, TransactionRepositoryTrait};

/// `0.85 × salary × (1 − goal/100)` in minor units, rounded up.
pub fn savings_alert_threshold_minor(salary_minor: i64, goal_percentage: i32) -> i64 {
    let numerator = salary_minor as i128
        * (100 - goal_percentage as i128)
        * SAVINGS_ALERT_THRESHOLD_PERCENT as i128;
    ((numerator + 9_999) / 10_000) as i64
}

/// Exact integer comparison of `expense >= 0.85 × salary × (1 − goal/100)`.
pub fn savings_threshold_reached(salary_minor: i64, goal_percentage: i32, expense_minor: i64) -> bool {
    expense_minor as i128 * 10_000
        >= salary_minor as i128
            * (100 - goal_percentage as i128)
            * SAVINGS_ALERT_THRESHOLD_PERCENT as i128
}

/// The pay period a salary deposit funds: one calendar month from its date.
pub fn salary_period(salary: &FinancialEvent) -> Result<PeriodWindow> {
    let end = salary
        .date
        .checked_add_months(Months::new(1))
        .ok_or_else(|| ValidationError::MalformedRecord {
            id: salary.id.clone(),
            reason: format!("salary date {} has no following month", salary.date),
        })?;
    Ok(PeriodWindow::new(salary.date, end))
}

pub struct SavingsCheckJob {
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    aggregation_service: Arc<dyn AggregationServiceTrait>,
    dispatcher: Arc<dyn EmailDispatcherTrait>,
    committer: Arc<dyn DueStateCommitterTrait>,
    salary_categories: Vec<String>,
    page_size: i64,
}

impl SavingsCheckJob {
    pub fn new(
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        aggregation_service: Arc<dyn AggregationServiceTrait>,
        dispatcher: Arc<dyn EmailDispatcherTrait>,
        committer: Arc<dyn DueStateCommitterTrait>,
    ) -> Self {
        Self {
            transaction_repository,
            aggregation_service,
            dispatcher,
            committer,
            salary_categories: DEFAULT_SALARY_CATEGORIES
                .iter()
                .map(|c| c.to_string())
                .collect(),
            page_size: DEFAULT_SCAN_PAGE_SIZE,
        }
    }

    /// Keywords marking a category as salary when it contains one, ignoring case.
    pub fn with_salary_categories(mut self, categories: Vec<String>) -> Self {
        self.salary_categories = categories
            .into_iter()
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .collect();
        self
    }

    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.page_size = page_size;
        self
    }

    async fn process_item(
        &self,
        item: DueItem<FinancialEvent>,
        owner: OwnerContact,
        now: DateTime<Utc>,
    ) -> Result<ItemOutcome> {
        let salary = item.record;
        let goal = match salary.savings_goal_percentage {
            Some(goal) if (MIN_SAVINGS_GOAL_PERCENTAGE..=MAX_SAVINGS_GOAL_PERCENTAGE).contains(&goal) => goal,
            other => {
                return Err(ValidationError::MalformedRecord {
                    id: salary.id.clone(),
                    reason: format!("savings goal {:?} outside 5..=100", other),
                }
                .into())
            }
        };

        let window = salary_period(&salary)?;
        let expense_minor = self
            .aggregation_service
            .expense_total_minor(&salary.owner_id, &window)?;
        let threshold_minor = savings_alert_threshold_minor(salary.amount_minor, goal);

        if !savings_threshold_reached(salary.amount_minor, goal, expense_minor) {
            debug!(
                "Salary {}: spent {} of {} threshold, not alerting yet",
                salary.id, expense_minor, threshold_minor
            );
            return Ok(ItemOutcome::Deferred);
        }

        let message = templates::savings_alert_email(
            &owner,
            &salary,
            goal,
            expense_minor,
            threshold_minor,
        )?;
        debug!("Salary {} {}", salary.id, ItemState::SideEffectAttempted);
        // An undelivered alert is not latched, so the next run tries again.
        self.dispatcher.send(&message).await?;

        self.committer
            .commit_savings_alert(SavingsAlertCommit {
                transaction_id: salary.id.clone(),
                owner_id: salary.owner_id.clone(),
                sent_at: now,
                expense_total_minor: expense_minor,
                threshold_minor,
            })
            .await?;
        Ok(ItemOutcome::Committed)
    }
}

#[async_trait]
impl ScheduledJob for SavingsCheckJob {
    fn label(&self) -> &str {
        SAVINGS_JOB_LABEL
    }

    async fn run(&self, now: DateTime<Utc>) -> Result<JobRunSummary> {
        info!(
            "Scanning salary deposits pending a savings check (categories: {:?})",
            self.salary_categories
        );
        let mut summary = JobRunSummary::new(self.label(), now);
        let repository = self.transaction_repository.clone();
        let categories = self.salary_categories.clone();
        let scan = PagedScan::new(self.page_size, move |after, limit| {
            repository.salary_candidates_page(&categories, after, limit)
        });
        drain_scan(self.label(), scan, &mut summary, |item, owner| {
            self.process_item(item, owner, now)
        })
        .await?;
        Ok(summary.finish(Utc::now()))
    }
}
