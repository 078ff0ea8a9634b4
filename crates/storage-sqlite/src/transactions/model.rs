//! Database models for transactions.

use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use log::warn;
use std::str::FromStr;
use uuid::Uuid;

use fintrack_core::errors::{Error, Result, ValidationError};
use fintrack_core::transactions::{
    FinancialEvent, NewFinancialEvent, RecurringInterval, RecurringSchedule, TransactionType,
};

/// Database model for transactions
#[derive(
    Queryable,
    QueryableByName,
    Identifiable,
    Selectable,
    Insertable,
    AsChangeset,
    PartialEq,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionDB {
    pub id: String,
    pub owner_id: String,
    pub amount_minor: i64,
    pub category: String,
    pub transaction_type: String,
    pub description: Option<String>,
    pub date: NaiveDateTime,
    pub is_recurring: bool,
    pub recurring_interval: Option<String>,
    pub next_occurrence_at: Option<NaiveDateTime>,
    pub last_processed_at: Option<NaiveDateTime>,
    pub savings_goal_percentage: Option<i32>,
    pub savings_alert_sent: bool,
    pub created_at: NaiveDateTime,
}

impl TransactionDB {
    /// Validates a new transaction and builds the row to insert, including
    /// its initial recurring schedule.
    pub fn from_new(new_event: NewFinancialEvent, created_at: DateTime<Utc>) -> Result<Self> {
        new_event.validate()?;
        let amount_minor = new_event.amount_minor()?;
        let schedule = new_event.initial_schedule();
        Ok(Self {
            id: new_event.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            owner_id: new_event.owner_id,
            amount_minor,
            category: new_event.category.trim().to_string(),
            transaction_type: new_event.transaction_type.as_str().to_string(),
            description: new_event.description,
            date: new_event.date.naive_utc(),
            is_recurring: schedule.is_recurring,
            recurring_interval: schedule.interval.map(|i| i.as_str().to_string()),
            next_occurrence_at: schedule.next_occurrence_at.map(|t| t.naive_utc()),
            last_processed_at: None,
            savings_goal_percentage: new_event.savings_goal_percentage,
            savings_alert_sent: false,
            created_at: created_at.naive_utc(),
        })
    }
}

impl TryFrom<TransactionDB> for FinancialEvent {
    type Error = Error;

    fn try_from(db: TransactionDB) -> std::result::Result<Self, Self::Error> {
        let transaction_type = TransactionType::from_str(&db.transaction_type).map_err(|e| {
            Error::from(ValidationError::MalformedRecord {
                id: db.id.clone(),
                reason: e.to_string(),
            })
        })?;
        // An unreadable interval leaves the schedule without one, which the
        // recurring job reports as a malformed record.
        let interval = db.recurring_interval.as_deref().and_then(|raw| {
            RecurringInterval::from_str(raw)
                .map_err(|_| warn!("Transaction {} has unknown interval '{}'", db.id, raw))
                .ok()
        });
        Ok(Self {
            id: db.id,
            owner_id: db.owner_id,
            amount_minor: db.amount_minor,
            category: db.category,
            transaction_type,
            description: db.description,
            date: db.date.and_utc(),
            recurring: RecurringSchedule {
                is_recurring: db.is_recurring,
                interval,
                next_occurrence_at: db.next_occurrence_at.map(|t| t.and_utc()),
                last_processed_at: db.last_processed_at.map(|t| t.and_utc()),
            },
            savings_goal_percentage: db.savings_goal_percentage,
            savings_alert_sent: db.savings_alert_sent,
            created_at: db.created_at.and_utc(),
        })
    }
}
