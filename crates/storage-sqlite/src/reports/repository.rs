use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Text, Timestamp};
use diesel::sqlite::Sqlite;
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;

use fintrack_core::errors::{DatabaseError, Result};
use fintrack_core::period::next_due_at;
use fintrack_core::reports::{
    ReportLog, ReportRepositoryTrait, ReportSubscription, SubscriptionUpdate,
};
use fintrack_core::scanner::{DueItem, ScanCursor};

use super::model::{ReportLogDB, ReportSubscriptionDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::scan::{after_cursor_clause, owner_contact, DueSubscriptionRow};
use crate::schema::{report_logs, report_subscriptions};

pub struct ReportRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl ReportRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        ReportRepository { pool, writer }
    }
}

#[async_trait]
impl ReportRepositoryTrait for ReportRepository {
    fn get_subscription_for_owner(&self, owner_id: &str) -> Result<Option<ReportSubscription>> {
        let mut conn = get_connection(&self.pool)?;
        let subscription = report_subscriptions::table
            .filter(report_subscriptions::owner_id.eq(owner_id))
            .select(ReportSubscriptionDB::as_select())
            .first(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(subscription.map(ReportSubscription::from))
    }

    async fn update_subscription(
        &self,
        owner_id: &str,
        update: SubscriptionUpdate,
        now: DateTime<Utc>,
    ) -> Result<ReportSubscription> {
        let owner_id = owner_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<ReportSubscription> {
                let mut row = report_subscriptions::table
                    .filter(report_subscriptions::owner_id.eq(&owner_id))
                    .select(ReportSubscriptionDB::as_select())
                    .first(conn)
                    .optional()
                    .map_err(StorageError::from)?
                    .ok_or_else(|| {
                        DatabaseError::NotFound(format!("No report subscription for {}", owner_id))
                    })?;
                let current = ReportSubscription::from(row.clone());

                let frequency = update.frequency.unwrap_or(current.frequency);
                let is_enabled = update.is_enabled.unwrap_or(current.is_enabled);
                let reschedule = frequency != current.frequency || (is_enabled && !current.is_enabled);

                row.frequency = frequency.as_str().to_string();
                row.is_enabled = is_enabled;
                row.updated_at = now.naive_utc();
                if reschedule {
                    row.next_report_at = next_due_at(frequency.into(), now).naive_utc();
                    debug!(
                        "Rescheduled reports for {} to {} ({})",
                        owner_id, row.next_report_at, frequency
                    );
                }

                diesel::update(report_subscriptions::table.find(&row.id))
                    .set(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(ReportSubscription::from(row))
            })
            .await
    }

    fn due_subscriptions_page(
        &self,
        now: DateTime<Utc>,
        after: Option<&ScanCursor>,
        limit: i64,
    ) -> Result<Vec<DueItem<ReportSubscription>>> {
        let mut conn = get_connection(&self.pool)?;
        let sql = format!(
            "SELECT s.*, o.email AS owner_email, o.display_name AS owner_display_name
             FROM report_subscriptions s
             LEFT JOIN owners o ON o.id = s.owner_id
             WHERE s.is_enabled = 1
               AND s.next_report_at <= ?
               {}
             ORDER BY s.next_report_at, s.id
             LIMIT ?",
            if after.is_some() {
                after_cursor_clause("s", "next_report_at")
            } else {
                String::new()
            }
        );

        let mut query = sql_query(sql)
            .into_boxed::<Sqlite>()
            .bind::<Timestamp, _>(now.naive_utc());
        if let Some(cursor) = after {
            query = query
                .bind::<Timestamp, _>(cursor.key.naive_utc())
                .bind::<Timestamp, _>(cursor.key.naive_utc())
                .bind::<Text, _>(cursor.id.clone());
        }
        let rows: Vec<DueSubscriptionRow> = query
            .bind::<BigInt, _>(limit)
            .load(&mut conn)
            .map_err(StorageError::from)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let record = ReportSubscription::from(row.subscription);
                DueItem {
                    cursor: ScanCursor {
                        key: record.next_report_at,
                        id: record.id.clone(),
                    },
                    owner: owner_contact(row.owner_email, row.owner_display_name),
                    record,
                }
            })
            .collect())
    }

    fn list_logs(&self, owner_id: &str) -> Result<Vec<ReportLog>> {
        let mut conn = get_connection(&self.pool)?;
        report_logs::table
            .filter(report_logs::owner_id.eq(owner_id))
            .order((report_logs::sent_date.asc(), report_logs::id.asc()))
            .select(ReportLogDB::as_select())
            .load(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(ReportLog::try_from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_owner, setup};
    use chrono::TimeZone;
    use fintrack_core::reports::ReportFrequency;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_new_owner_gets_default_monthly_subscription() {
        let ctx = setup().await;
        seed_owner(&ctx, "alice").await;
        let repo = ReportRepository::new(ctx.pool.clone(), ctx.writer.clone());

        let sub = repo.get_subscription_for_owner("alice").unwrap().unwrap();
        assert_eq!(sub.frequency, ReportFrequency::Monthly);
        assert!(sub.is_enabled);
        assert_eq!(sub.next_report_at, utc(2025, 2, 1, 0));
        assert!(sub.last_sent_at.is_none());
    }

    #[tokio::test]
    async fn test_update_subscription_reschedules_on_frequency_change() {
        let ctx = setup().await;
        seed_owner(&ctx, "alice").await;
        let repo = ReportRepository::new(ctx.pool.clone(), ctx.writer.clone());
        // Wednesday
        let now = utc(2025, 1, 15, 9);

        let sub = repo
            .update_subscription(
                "alice",
                SubscriptionUpdate {
                    frequency: Some(ReportFrequency::Weekly),
                    is_enabled: None,
                },
                now,
            )
            .await
            .unwrap();
        assert_eq!(sub.frequency, ReportFrequency::Weekly);
        assert_eq!(sub.next_report_at, utc(2025, 1, 20, 0));

        // Disabling keeps the schedule untouched.
        let sub = repo
            .update_subscription(
                "alice",
                SubscriptionUpdate {
                    frequency: None,
                    is_enabled: Some(false),
                },
                utc(2025, 1, 16, 9),
            )
            .await
            .unwrap();
        assert!(!sub.is_enabled);
        assert_eq!(sub.next_report_at, utc(2025, 1, 20, 0));
    }

    #[tokio::test]
    async fn test_due_scan_skips_disabled_and_joins_owner() {
        let ctx = setup().await;
        seed_owner(&ctx, "alice").await;
        seed_owner(&ctx, "bob").await;
        let repo = ReportRepository::new(ctx.pool.clone(), ctx.writer.clone());
        repo.update_subscription(
            "bob",
            SubscriptionUpdate {
                frequency: None,
                is_enabled: Some(false),
            },
            utc(2025, 1, 2, 0),
        )
        .await
        .unwrap();

        let due = repo.due_subscriptions_page(utc(2025, 2, 1, 0), None, 10).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].record.owner_id, "alice");
        assert_eq!(due[0].owner.as_ref().unwrap().email, "alice@example.com");

        let not_yet = repo.due_subscriptions_page(utc(2025, 1, 31, 23), None, 10).unwrap();
        assert!(not_yet.is_empty());
    }

    #[tokio::test]
    async fn test_missing_subscription_is_not_found() {
        let ctx = setup().await;
        let repo = ReportRepository::new(ctx.pool.clone(), ctx.writer.clone());
        assert!(repo.get_subscription_for_owner("nobody").unwrap().is_none());
        let err = repo
            .update_subscription("nobody", SubscriptionUpdate::default(), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            fintrack_core::Error::Database(DatabaseError::NotFound(_))
        ));
    }
}
