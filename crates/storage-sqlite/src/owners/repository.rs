use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::info;
use std::sync::Arc;
use uuid::Uuid;

use fintrack_core::owners::{NewOwner, Owner, OwnerRepositoryTrait};
use fintrack_core::period::next_due_at;
use fintrack_core::reports::ReportFrequency;
use fintrack_core::Result;

use super::model::OwnerDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::reports::ReportSubscriptionDB;
use crate::schema::{owners, report_subscriptions};

pub struct OwnerRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl OwnerRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        OwnerRepository { pool, writer }
    }
}

#[async_trait]
impl OwnerRepositoryTrait for OwnerRepository {
    fn get_by_id(&self, owner_id: &str) -> Result<Option<Owner>> {
        let mut conn = get_connection(&self.pool)?;
        let owner = owners::table
            .find(owner_id)
            .first::<OwnerDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(owner.map(Owner::from))
    }

    async fn create(&self, new_owner: NewOwner, now: DateTime<Utc>) -> Result<Owner> {
        new_owner.validate()?;
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Owner> {
                let owner_db = OwnerDB {
                    id: new_owner.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                    email: new_owner.email.trim().to_string(),
                    display_name: new_owner.display_name,
                    created_at: now.naive_utc(),
                };
                diesel::insert_into(owners::table)
                    .values(&owner_db)
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let frequency = ReportFrequency::default();
                let subscription = ReportSubscriptionDB {
                    id: Uuid::new_v4().to_string(),
                    owner_id: owner_db.id.clone(),
                    frequency: frequency.as_str().to_string(),
                    is_enabled: true,
                    next_report_at: next_due_at(frequency.into(), now).naive_utc(),
                    last_sent_at: None,
                    created_at: now.naive_utc(),
                    updated_at: now.naive_utc(),
                };
                diesel::insert_into(report_subscriptions::table)
                    .values(&subscription)
                    .execute(conn)
                    .map_err(StorageError::from)?;

                info!("Registered owner {} with a {} report subscription", owner_db.id, frequency);
                Ok(Owner::from(owner_db))
            })
            .await
    }

    async fn delete(&self, owner_id: &str) -> Result<usize> {
        let owner_id = owner_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                diesel::delete(owners::table.find(owner_id))
                    .execute(conn)
                    .into_core()
            })
            .await
    }
}
