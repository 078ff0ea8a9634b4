use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Text, Timestamp};
use diesel::sqlite::Sqlite;
use diesel::SqliteConnection;
use std::str::FromStr;
use std::sync::Arc;

use fintrack_core::errors::{Error, Result, ValidationError};
use fintrack_core::period::PeriodWindow;
use fintrack_core::scanner::{DueItem, ScanCursor};
use fintrack_core::transactions::{
    CategoryTotal, FinancialEvent, NewFinancialEvent, TransactionRepositoryTrait, TransactionType,
};

use super::model::TransactionDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::scan::{after_cursor_clause, owner_contact, DueTransactionRow};
use crate::schema::transactions;

#[derive(QueryableByName, Debug)]
struct CategoryTotalRow {
    #[diesel(sql_type = Text)]
    transaction_type: String,
    #[diesel(sql_type = Text)]
    category: String,
    #[diesel(sql_type = BigInt)]
    total_minor: i64,
    #[diesel(sql_type = BigInt)]
    tx_count: i64,
}

pub struct TransactionRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl TransactionRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        TransactionRepository { pool, writer }
    }

    fn into_due_items(
        rows: Vec<DueTransactionRow>,
        key_of: impl Fn(&FinancialEvent) -> Option<DateTime<Utc>>,
    ) -> Result<Vec<DueItem<FinancialEvent>>> {
        rows.into_iter()
            .map(|row| {
                let record = FinancialEvent::try_from(row.transaction)?;
                let key = key_of(&record).ok_or_else(|| {
                    Error::from(ValidationError::MalformedRecord {
                        id: record.id.clone(),
                        reason: "scan key is missing".to_string(),
                    })
                })?;
                Ok(DueItem {
                    cursor: ScanCursor {
                        key,
                        id: record.id.clone(),
                    },
                    owner: owner_contact(row.owner_email, row.owner_display_name),
                    record,
                })
            })
            .collect()
    }
}

#[async_trait]
impl TransactionRepositoryTrait for TransactionRepository {
    async fn create(&self, new_event: NewFinancialEvent) -> Result<FinancialEvent> {
        let row = TransactionDB::from_new(new_event, Utc::now())?;
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<FinancialEvent> {
                let inserted = diesel::insert_into(transactions::table)
                    .values(&row)
                    .returning(TransactionDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                FinancialEvent::try_from(inserted)
            })
            .await
    }

    fn get_by_id(&self, event_id: &str) -> Result<Option<FinancialEvent>> {
        let mut conn = get_connection(&self.pool)?;
        transactions::table
            .find(event_id)
            .select(TransactionDB::as_select())
            .first(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(FinancialEvent::try_from)
            .transpose()
    }

    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<FinancialEvent>> {
        let mut conn = get_connection(&self.pool)?;
        transactions::table
            .filter(transactions::owner_id.eq(owner_id))
            .order((transactions::date.asc(), transactions::id.asc()))
            .select(TransactionDB::as_select())
            .load(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(FinancialEvent::try_from)
            .collect()
    }

    fn category_totals(&self, owner_id: &str, window: &PeriodWindow) -> Result<Vec<CategoryTotal>> {
        let mut conn = get_connection(&self.pool)?;
        let rows: Vec<CategoryTotalRow> = sql_query(
            "SELECT transaction_type, category,
                    CAST(SUM(amount_minor) AS INTEGER) AS total_minor,
                    COUNT(*) AS tx_count
             FROM transactions
             WHERE owner_id = ? AND date >= ? AND date < ?
             GROUP BY transaction_type, category",
        )
        .bind::<Text, _>(owner_id)
        .bind::<Timestamp, _>(window.from.naive_utc())
        .bind::<Timestamp, _>(window.to.naive_utc())
        .load(&mut conn)
        .map_err(StorageError::from)?;

        rows.into_iter()
            .map(|row| {
                Ok(CategoryTotal {
                    transaction_type: TransactionType::from_str(&row.transaction_type)?,
                    category: row.category,
                    total_minor: row.total_minor,
                    count: row.tx_count,
                })
            })
            .collect()
    }

    fn due_recurring_page(
        &self,
        now: DateTime<Utc>,
        after: Option<&ScanCursor>,
        limit: i64,
    ) -> Result<Vec<DueItem<FinancialEvent>>> {
        let mut conn = get_connection(&self.pool)?;
        let sql = format!(
            "SELECT t.*, o.email AS owner_email, o.display_name AS owner_display_name
             FROM transactions t
             LEFT JOIN owners o ON o.id = t.owner_id
             WHERE t.is_recurring = 1
               AND t.next_occurrence_at IS NOT NULL
               AND t.next_occurrence_at <= ?
               {}
             ORDER BY t.next_occurrence_at, t.id
             LIMIT ?",
            if after.is_some() {
                after_cursor_clause("t", "next_occurrence_at")
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
        let rows: Vec<DueTransactionRow> = query
            .bind::<BigInt, _>(limit)
            .load(&mut conn)
            .map_err(StorageError::from)?;

        Self::into_due_items(rows, |t| t.recurring.next_occurrence_at)
    }

    fn salary_candidates_page(
        &self,
        salary_categories: &[String],
        after: Option<&ScanCursor>,
        limit: i64,
    ) -> Result<Vec<DueItem<FinancialEvent>>> {
        if salary_categories.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = get_connection(&self.pool)?;
        let keyword_matches = vec!["instr(lower(t.category), ?) > 0"; salary_categories.len()]
            .join(" OR ");
        let sql = format!(
            "SELECT t.*, o.email AS owner_email, o.display_name AS owner_display_name
             FROM transactions t
             LEFT JOIN owners o ON o.id = t.owner_id
             WHERE t.transaction_type = 'INCOME'
               AND t.savings_goal_percentage IS NOT NULL
               AND t.savings_alert_sent = 0
               AND ({})
               {}
             ORDER BY t.date, t.id
             LIMIT ?",
            keyword_matches,
            if after.is_some() {
                after_cursor_clause("t", "date")
            } else {
                String::new()
            }
        );

        let mut query = sql_query(sql).into_boxed::<Sqlite>();
        for category in salary_categories {
            query = query.bind::<Text, _>(category.to_lowercase());
        }
        if let Some(cursor) = after {
            query = query
                .bind::<Timestamp, _>(cursor.key.naive_utc())
                .bind::<Timestamp, _>(cursor.key.naive_utc())
                .bind::<Text, _>(cursor.id.clone());
        }
        let rows: Vec<DueTransactionRow> = query
            .bind::<BigInt, _>(limit)
            .load(&mut conn)
            .map_err(StorageError::from)?;

        Self::into_due_items(rows, |t| Some(t.date))
    }
}
