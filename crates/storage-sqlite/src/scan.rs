//! Shared pieces of the keyset-paginated due scans.

use diesel::sql_types::{Nullable, Text};
use diesel::QueryableByName;

use fintrack_core::owners::OwnerContact;

use crate::reports::ReportSubscriptionDB;
use crate::transactions::TransactionDB;

/// `AND` clause selecting rows strictly after a `(key, id)` cursor.
/// Binds: key, key, id.
pub(crate) fn after_cursor_clause(alias: &str, key_column: &str) -> String {
    format!(
        "AND ({a}.{k} > ? OR ({a}.{k} = ? AND {a}.id > ?))",
        a = alias,
        k = key_column
    )
}

pub(crate) fn owner_contact(email: Option<String>, display_name: Option<String>) -> Option<OwnerContact> {
    Some(OwnerContact {
        email: email?,
        display_name: display_name?,
    })
}

#[derive(QueryableByName, Debug)]
pub(crate) struct DueTransactionRow {
    #[diesel(embed)]
    pub transaction: TransactionDB,
    #[diesel(sql_type = Nullable<Text>)]
    pub owner_email: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub owner_display_name: Option<String>,
}

#[derive(QueryableByName, Debug)]
pub(crate) struct DueSubscriptionRow {
    #[diesel(embed)]
    pub subscription: ReportSubscriptionDB,
    #[diesel(sql_type = Nullable<Text>)]
    pub owner_email: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub owner_display_name: Option<String>,
}
