//! Database models for report subscriptions and report logs.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use std::str::FromStr;

use fintrack_core::errors::{Error, ValidationError};
use fintrack_core::reports::{ReportFrequency, ReportLog, ReportStatus, ReportSubscription};

/// Database model for report subscriptions
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
#[diesel(table_name = crate::schema::report_subscriptions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ReportSubscriptionDB {
    pub id: String,
    pub owner_id: String,
    pub frequency: String,
    pub is_enabled: bool,
    pub next_report_at: NaiveDateTime,
    pub last_sent_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<ReportSubscriptionDB> for ReportSubscription {
    fn from(db: ReportSubscriptionDB) -> Self {
        Self {
            id: db.id,
            owner_id: db.owner_id,
            frequency: ReportFrequency::parse_or_default(Some(&db.frequency)),
            is_enabled: db.is_enabled,
            next_report_at: db.next_report_at.and_utc(),
            last_sent_at: db.last_sent_at.map(|t| t.and_utc()),
        }
    }
}

/// Database model for report logs
#[derive(Queryable, Identifiable, Selectable, Insertable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::report_logs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ReportLogDB {
    pub id: String,
    pub owner_id: String,
    pub subscription_id: String,
    pub sent_date: NaiveDateTime,
    pub period_label: String,
    pub status: String,
}

impl TryFrom<ReportLogDB> for ReportLog {
    type Error = Error;

    fn try_from(db: ReportLogDB) -> Result<Self, Self::Error> {
        let status = ReportStatus::from_str(&db.status).map_err(|e| {
            Error::from(ValidationError::MalformedRecord {
                id: db.id.clone(),
                reason: e.to_string(),
            })
        })?;
        Ok(Self {
            id: db.id,
            owner_id: db.owner_id,
            subscription_id: db.subscription_id,
            sent_date: db.sent_date.and_utc(),
            period_label: db.period_label,
            status,
        })
    }
}
