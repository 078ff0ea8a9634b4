//! Owner domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};

/// The account holder every financial record belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub created_at: NaiveDateTime,
}

/// Input model for registering a new owner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOwner {
    pub id: Option<String>,
    pub email: String,
    pub display_name: String,
}

impl NewOwner {
    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() {
            return Err(ValidationError::MissingField("email".to_string()).into());
        }
        if !self.email.contains('@') {
            return Err(ValidationError::InvalidInput(format!(
                "'{}' is not an email address",
                self.email
            ))
            .into());
        }
        Ok(())
    }
}

/// Owner fields joined onto a due item at scan time.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnerContact {
    pub email: String,
    pub display_name: String,
}
