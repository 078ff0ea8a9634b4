//! Applies due-item state transitions through the single writer.
//!
//! Every transition is one `IMMEDIATE` transaction guarded by a
//! compare-and-set on the due marker read at scan time. When the guard
//! matches no row the job returns `Error::StaleDueState`, which rolls back
//! anything already written in that transaction.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;
use uuid::Uuid;

use fintrack_core::commit::{
    DueStateCommitterTrait, RecurringOccurrenceCommit, ReportCycleCommit, SavingsAlertCommit,
};
use fintrack_core::errors::{Error, Result};
use fintrack_core::reports::ReportLog;
use fintrack_core::transactions::FinancialEvent;

use crate::db::WriteHandle;
use crate::errors::StorageError;
use crate::reports::ReportLogDB;
use crate::schema::{report_logs, report_subscriptions, savings_alert_logs, transactions};
use crate::transactions::TransactionDB;

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::savings_alert_logs)]
struct NewSavingsAlertLogDB {
    id: String,
    owner_id: String,
    transaction_id: String,
    sent_at: chrono::NaiveDateTime,
    expense_total_minor: i64,
    threshold_minor: i64,
}

pub struct DueStateCommitter {
    writer: WriteHandle,
}

impl DueStateCommitter {
    pub fn new(writer: WriteHandle) -> Self {
        DueStateCommitter { writer }
    }
}

#[async_trait]
impl DueStateCommitterTrait for DueStateCommitter {
    async fn commit_recurring_occurrence(
        &self,
        commit: RecurringOccurrenceCommit,
    ) -> Result<FinancialEvent> {
        let row = TransactionDB::from_new(commit.occurrence, commit.processed_at)?;
        let source_id = commit.source_id;
        let observed = commit.observed_next_occurrence_at.naive_utc();
        let next = commit.next_occurrence_at.naive_utc();
        let processed_at = commit.processed_at.naive_utc();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<FinancialEvent> {
                let advanced = diesel::update(
                    transactions::table
                        .filter(transactions::id.eq(&source_id))
                        .filter(transactions::is_recurring.eq(true))
                        .filter(transactions::next_occurrence_at.eq(observed)),
                )
                .set((
                    transactions::next_occurrence_at.eq(Some(next)),
                    transactions::last_processed_at.eq(Some(processed_at)),
                ))
                .execute(conn)
                .map_err(StorageError::from)?;
                if advanced != 1 {
                    return Err(Error::StaleDueState(format!(
                        "recurring transaction {} is no longer due at {}",
                        source_id, observed
                    )));
                }

                let inserted = diesel::insert_into(transactions::table)
                    .values(&row)
                    .returning(TransactionDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                debug!("Committed occurrence {} of {}", inserted.id, source_id);
                FinancialEvent::try_from(inserted)
            })
            .await
    }

    async fn commit_report_cycle(&self, commit: ReportCycleCommit) -> Result<ReportLog> {
        let subscription_id = commit.subscription_id;
        let observed = commit.observed_next_report_at.naive_utc();
        let next = commit.next_report_at.naive_utc();
        let last_sent_at = commit.last_sent_at.map(|t| t.naive_utc());
        let log_row = ReportLogDB {
            id: Uuid::new_v4().to_string(),
            owner_id: commit.log.owner_id,
            subscription_id: commit.log.subscription_id,
            sent_date: commit.log.sent_date.naive_utc(),
            period_label: commit.log.period_label,
            status: commit.log.status.as_str().to_string(),
        };

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<ReportLog> {
                let target = report_subscriptions::table
                    .filter(report_subscriptions::id.eq(&subscription_id))
                    .filter(report_subscriptions::next_report_at.eq(observed));
                let advanced = match last_sent_at {
                    Some(sent_at) => diesel::update(target)
                        .set((
                            report_subscriptions::next_report_at.eq(next),
                            report_subscriptions::last_sent_at.eq(Some(sent_at)),
                            report_subscriptions::updated_at.eq(sent_at),
                        ))
                        .execute(conn),
                    None => diesel::update(target)
                        .set((
                            report_subscriptions::next_report_at.eq(next),
                            report_subscriptions::updated_at.eq(log_row.sent_date),
                        ))
                        .execute(conn),
                }
                .map_err(StorageError::from)?;
                if advanced != 1 {
                    return Err(Error::StaleDueState(format!(
                        "subscription {} is no longer due at {}",
                        subscription_id, observed
                    )));
                }

                diesel::insert_into(report_logs::table)
                    .values(&log_row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                ReportLog::try_from(log_row)
            })
            .await
    }

    async fn commit_savings_alert(&self, commit: SavingsAlertCommit) -> Result<()> {
        let log_row = NewSavingsAlertLogDB {
            id: Uuid::new_v4().to_string(),
            owner_id: commit.owner_id,
            transaction_id: commit.transaction_id,
            sent_at: commit.sent_at.naive_utc(),
            expense_total_minor: commit.expense_total_minor,
            threshold_minor: commit.threshold_minor,
        };

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let latched = diesel::update(
                    transactions::table
                        .filter(transactions::id.eq(&log_row.transaction_id))
                        .filter(transactions::savings_alert_sent.eq(false)),
                )
                .set(transactions::savings_alert_sent.eq(true))
                .execute(conn)
                .map_err(StorageError::from)?;
                if latched != 1 {
                    return Err(Error::StaleDueState(format!(
                        "savings alert for {} was already sent",
                        log_row.transaction_id
                    )));
                }

                diesel::insert_into(savings_alert_logs::table)
                    .values(&log_row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}
