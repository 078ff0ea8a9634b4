//! In-memory store and recording dispatcher shared by the job tests.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::commit::{
    DueStateCommitterTrait, RecurringOccurrenceCommit, ReportCycleCommit, SavingsAlertCommit,
};
use crate::errors::{DatabaseError, Error, Result};
use crate::notifications::{DispatchError, EmailDispatcherTrait, EmailMessage};
use crate::owners::OwnerContact;
use crate::period::PeriodWindow;
use crate::reports::{
    ReportFrequency, ReportLog, ReportRepositoryTrait, ReportSubscription, SubscriptionUpdate,
};
use crate::scanner::{DueItem, ScanCursor};
use crate::transactions::{
    CategoryTotal, FinancialEvent, NewFinancialEvent, RecurringInterval, RecurringSchedule,
    TransactionRepositoryTrait, TransactionType,
};

pub fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

#[derive(Default)]
struct StoreState {
    owners: HashMap<String, OwnerContact>,
    transactions: Vec<FinancialEvent>,
    subscriptions: Vec<ReportSubscription>,
    report_logs: Vec<ReportLog>,
    savings_alerts: Vec<SavingsAlertCommit>,
    panicking_owners: HashSet<String>,
    failing_owners: HashSet<String>,
}

/// Behaves like the SQLite repositories, including the compare-and-set
/// guards, so job tests can run without a database.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_owner(&self, owner_id: &str) {
        self.state.lock().unwrap().owners.insert(
            owner_id.to_string(),
            OwnerContact {
                email: format!("{}@example.com", owner_id),
                display_name: owner_id.to_uppercase(),
            },
        );
    }

    /// Commits touching this owner panic.
    pub fn panic_for(&self, owner_id: &str) {
        self.state
            .lock()
            .unwrap()
            .panicking_owners
            .insert(owner_id.to_string());
    }

    /// Commits touching this owner fail like an aborted transaction.
    pub fn fail_for(&self, owner_id: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_owners
            .insert(owner_id.to_string());
    }

    pub fn add_transaction(&self, event: FinancialEvent) {
        self.state.lock().unwrap().transactions.push(event);
    }

    pub fn add_subscription(&self, subscription: ReportSubscription) {
        self.state.lock().unwrap().subscriptions.push(subscription);
    }

    pub fn transactions(&self) -> Vec<FinancialEvent> {
        self.state.lock().unwrap().transactions.clone()
    }

    pub fn transaction(&self, id: &str) -> FinancialEvent {
        self.transactions()
            .into_iter()
            .find(|t| t.id == id)
            .unwrap()
    }

    pub fn subscription(&self, id: &str) -> ReportSubscription {
        self.state
            .lock()
            .unwrap()
            .subscriptions
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .unwrap()
    }

    pub fn report_logs(&self) -> Vec<ReportLog> {
        self.state.lock().unwrap().report_logs.clone()
    }

    pub fn savings_alerts(&self) -> Vec<SavingsAlertCommit> {
        self.state.lock().unwrap().savings_alerts.clone()
    }

    fn check_owner(&self, owner_id: &str) -> Result<()> {
        let (panics, fails) = {
            let state = self.state.lock().unwrap();
            (
                state.panicking_owners.contains(owner_id),
                state.failing_owners.contains(owner_id),
            )
        };
        if panics {
            panic!("corrupt row for owner {}", owner_id);
        }
        if fails {
            return Err(DatabaseError::TransactionFailed("database is locked".to_string()).into());
        }
        Ok(())
    }
}

fn page<T: Clone>(
    mut rows: Vec<(ScanCursor, T)>,
    owners: &HashMap<String, OwnerContact>,
    owner_of: impl Fn(&T) -> &str,
    after: Option<&ScanCursor>,
    limit: i64,
) -> Vec<DueItem<T>> {
    rows.sort_by(|a, b| (a.0.key, &a.0.id).cmp(&(b.0.key, &b.0.id)));
    rows.into_iter()
        .filter(|(cursor, _)| after.map_or(true, |a| (cursor.key, &cursor.id) > (a.key, &a.id)))
        .take(limit as usize)
        .map(|(cursor, record)| DueItem {
            owner: owners.get(owner_of(&record)).cloned(),
            record,
            cursor,
        })
        .collect()
}

fn materialize(new_event: NewFinancialEvent, now: DateTime<Utc>) -> Result<FinancialEvent> {
    new_event.validate()?;
    Ok(FinancialEvent {
        id: new_event
            .id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        owner_id: new_event.owner_id.clone(),
        amount_minor: new_event.amount_minor()?,
        category: new_event.category.clone(),
        transaction_type: new_event.transaction_type,
        description: new_event.description.clone(),
        date: new_event.date,
        recurring: new_event.initial_schedule(),
        savings_goal_percentage: new_event.savings_goal_percentage,
        savings_alert_sent: false,
        created_at: now,
    })
}

#[async_trait]
impl TransactionRepositoryTrait for InMemoryStore {
    async fn create(&self, new_event: NewFinancialEvent) -> Result<FinancialEvent> {
        let event = materialize(new_event, Utc::now())?;
        self.state.lock().unwrap().transactions.push(event.clone());
        Ok(event)
    }

    fn get_by_id(&self, event_id: &str) -> Result<Option<FinancialEvent>> {
        Ok(self.transactions().into_iter().find(|t| t.id == event_id))
    }

    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<FinancialEvent>> {
        Ok(self
            .transactions()
            .into_iter()
            .filter(|t| t.owner_id == owner_id)
            .collect())
    }

    fn category_totals(&self, owner_id: &str, window: &PeriodWindow) -> Result<Vec<CategoryTotal>> {
        let mut totals: HashMap<(TransactionType, String), (i64, i64)> = HashMap::new();
        for t in self.list_by_owner(owner_id)? {
            if window.contains(t.date) {
                let entry = totals.entry((t.transaction_type, t.category)).or_default();
                entry.0 += t.amount_minor;
                entry.1 += 1;
            }
        }
        Ok(totals
            .into_iter()
            .map(|((transaction_type, category), (total_minor, count))| CategoryTotal {
                transaction_type,
                category,
                total_minor,
                count,
            })
            .collect())
    }

    fn due_recurring_page(
        &self,
        now: DateTime<Utc>,
        after: Option<&ScanCursor>,
        limit: i64,
    ) -> Result<Vec<DueItem<FinancialEvent>>> {
        let state = self.state.lock().unwrap();
        let rows: Vec<(ScanCursor, FinancialEvent)> = state
            .transactions
            .iter()
            .filter(|t| t.recurring.is_recurring)
            .filter_map(|t| {
                let key = t.recurring.next_occurrence_at.filter(|at| *at <= now)?;
                Some((ScanCursor { key, id: t.id.clone() }, t.clone()))
            })
            .collect();
        Ok(page(rows, &state.owners, |t| t.owner_id.as_str(), after, limit))
    }

    fn salary_candidates_page(
        &self,
        salary_categories: &[String],
        after: Option<&ScanCursor>,
        limit: i64,
    ) -> Result<Vec<DueItem<FinancialEvent>>> {
        let state = self.state.lock().unwrap();
        let rows: Vec<(ScanCursor, FinancialEvent)> = state
            .transactions
            .iter()
            .filter(|t| {
                t.transaction_type == TransactionType::Income
                    && t.savings_goal_percentage.is_some()
                    && !t.savings_alert_sent
                    && salary_categories
                        .iter()
                        .any(|keyword| t.category.to_lowercase().contains(keyword.as_str()))
            })
            .map(|t| {
                (
                    ScanCursor {
                        key: t.date,
                        id: t.id.clone(),
                    },
                    t.clone(),
                )
            })
            .collect();
        Ok(page(rows, &state.owners, |t| t.owner_id.as_str(), after, limit))
    }
}

#[async_trait]
impl ReportRepositoryTrait for InMemoryStore {
    fn get_subscription_for_owner(&self, owner_id: &str) -> Result<Option<ReportSubscription>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .subscriptions
            .iter()
            .find(|s| s.owner_id == owner_id)
            .cloned())
    }

    async fn update_subscription(
        &self,
        _owner_id: &str,
        _update: SubscriptionUpdate,
        _now: DateTime<Utc>,
    ) -> Result<ReportSubscription> {
        unimplemented!()
    }

    fn due_subscriptions_page(
        &self,
        now: DateTime<Utc>,
        after: Option<&ScanCursor>,
        limit: i64,
    ) -> Result<Vec<DueItem<ReportSubscription>>> {
        let state = self.state.lock().unwrap();
        let rows: Vec<(ScanCursor, ReportSubscription)> = state
            .subscriptions
            .iter()
            .filter(|s| s.is_enabled && s.next_report_at <= now)
            .map(|s| {
                (
                    ScanCursor {
                        key: s.next_report_at,
                        id: s.id.clone(),
                    },
                    s.clone(),
                )
            })
            .collect();
        Ok(page(rows, &state.owners, |s| s.owner_id.as_str(), after, limit))
    }

    fn list_logs(&self, owner_id: &str) -> Result<Vec<ReportLog>> {
        Ok(self
            .report_logs()
            .into_iter()
            .filter(|l| l.owner_id == owner_id)
            .collect())
    }
}

#[async_trait]
impl DueStateCommitterTrait for InMemoryStore {
    async fn commit_recurring_occurrence(
        &self,
        commit: RecurringOccurrenceCommit,
    ) -> Result<FinancialEvent> {
        self.check_owner(&commit.occurrence.owner_id)?;
        let created = materialize(commit.occurrence, commit.processed_at)?;
        let mut state = self.state.lock().unwrap();
        let source = state
            .transactions
            .iter_mut()
            .find(|t| {
                t.id == commit.source_id
                    && t.recurring.next_occurrence_at == Some(commit.observed_next_occurrence_at)
            })
            .ok_or_else(|| Error::StaleDueState(commit.source_id.clone()))?;
        source.recurring.next_occurrence_at = Some(commit.next_occurrence_at);
        source.recurring.last_processed_at = Some(commit.processed_at);
        state.transactions.push(created.clone());
        Ok(created)
    }

    async fn commit_report_cycle(&self, commit: ReportCycleCommit) -> Result<ReportLog> {
        self.check_owner(&commit.log.owner_id)?;
        let mut state = self.state.lock().unwrap();
        let subscription = state
            .subscriptions
            .iter_mut()
            .find(|s| {
                s.id == commit.subscription_id && s.next_report_at == commit.observed_next_report_at
            })
            .ok_or_else(|| Error::StaleDueState(commit.subscription_id.clone()))?;
        subscription.next_report_at = commit.next_report_at;
        if commit.last_sent_at.is_some() {
            subscription.last_sent_at = commit.last_sent_at;
        }
        let log = ReportLog {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: commit.log.owner_id,
            subscription_id: commit.log.subscription_id,
            sent_date: commit.log.sent_date,
            period_label: commit.log.period_label,
            status: commit.log.status,
        };
        state.report_logs.push(log.clone());
        Ok(log)
    }

    async fn commit_savings_alert(&self, commit: SavingsAlertCommit) -> Result<()> {
        self.check_owner(&commit.owner_id)?;
        let mut state = self.state.lock().unwrap();
        let salary = state
            .transactions
            .iter_mut()
            .find(|t| t.id == commit.transaction_id && !t.savings_alert_sent)
            .ok_or_else(|| Error::StaleDueState(commit.transaction_id.clone()))?;
        salary.savings_alert_sent = true;
        state.savings_alerts.push(commit);
        Ok(())
    }
}

/// Records every message; refuses delivery to configured addresses.
#[derive(Default)]
pub struct RecordingDispatcher {
    sent: Mutex<Vec<EmailMessage>>,
    rejecting: Mutex<HashSet<String>>,
}

impl RecordingDispatcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reject(&self, email: &str) {
        self.rejecting.lock().unwrap().insert(email.to_string());
    }

    pub fn accept_all(&self) {
        self.rejecting.lock().unwrap().clear();
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailDispatcherTrait for RecordingDispatcher {
    async fn send(&self, message: &EmailMessage) -> std::result::Result<(), DispatchError> {
        if self.rejecting.lock().unwrap().contains(&message.to) {
            return Err(DispatchError::Rejected {
                status: 503,
                body: "provider unavailable".to_string(),
            });
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub fn expense(id: &str, owner_id: &str, category: &str, minor: i64, date: DateTime<Utc>) -> FinancialEvent {
    FinancialEvent {
        id: id.to_string(),
        owner_id: owner_id.to_string(),
        amount_minor: minor,
        category: category.to_string(),
        transaction_type: TransactionType::Expense,
        description: None,
        date,
        recurring: RecurringSchedule::one_off(),
        savings_goal_percentage: None,
        savings_alert_sent: false,
        created_at: date,
    }
}

pub fn income(id: &str, owner_id: &str, category: &str, minor: i64, date: DateTime<Utc>) -> FinancialEvent {
    FinancialEvent {
        transaction_type: TransactionType::Income,
        ..expense(id, owner_id, category, minor, date)
    }
}

pub fn salary(id: &str, owner_id: &str, minor: i64, goal: i32, date: DateTime<Utc>) -> FinancialEvent {
    FinancialEvent {
        savings_goal_percentage: Some(goal),
        ..income(id, owner_id, "Salary", minor, date)
    }
}

pub fn recurring(
    event: FinancialEvent,
    interval: RecurringInterval,
    next_occurrence_at: DateTime<Utc>,
) -> FinancialEvent {
    FinancialEvent {
        recurring: RecurringSchedule {
            is_recurring: true,
            interval: Some(interval),
            next_occurrence_at: Some(next_occurrence_at),
            last_processed_at: None,
        },
        ..event
    }
}

pub fn subscription(
    id: &str,
    owner_id: &str,
    frequency: ReportFrequency,
    next_report_at: DateTime<Utc>,
) -> ReportSubscription {
    ReportSubscription {
        id: id.to_string(),
        owner_id: owner_id.to_string(),
        frequency,
        is_enabled: true,
        next_report_at,
        last_sent_at: None,
    }
}
