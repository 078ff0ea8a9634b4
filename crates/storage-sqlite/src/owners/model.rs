//! Database models for owners.

use chrono::NaiveDateTime;
use diesel::prelude::*;

/// Database model for owners
#[derive(Queryable, Identifiable, Selectable, Insertable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::owners)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OwnerDB {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub created_at: NaiveDateTime,
}

impl From<OwnerDB> for fintrack_core::owners::Owner {
    fn from(db: OwnerDB) -> Self {
        Self {
            id: db.id,
            email: db.email,
            display_name: db.display_name,
            created_at: db.created_at,
        }
    }
}
