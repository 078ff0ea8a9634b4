//! Financial transaction domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{MAX_SAVINGS_GOAL_PERCENTAGE, MIN_SAVINGS_GOAL_PERCENTAGE};
use crate::errors::{Error, Result, ValidationError};
use crate::money::{to_major, to_minor};
use crate::period::PeriodFrequency;

/// Direction of a financial event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "INCOME",
            TransactionType::Expense => "EXPENSE",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "INCOME" => Ok(TransactionType::Income),
            "EXPENSE" => Ok(TransactionType::Expense),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown transaction type '{}'",
                other
            ))
            .into()),
        }
    }
}

/// How often a recurring transaction repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecurringInterval {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RecurringInterval {
    pub fn as_str(&self) -> &'static str {
        PeriodFrequency::from(*self).as_str()
    }
}

impl From<RecurringInterval> for PeriodFrequency {
    fn from(interval: RecurringInterval) -> Self {
        match interval {
            RecurringInterval::Daily => PeriodFrequency::Daily,
            RecurringInterval::Weekly => PeriodFrequency::Weekly,
            RecurringInterval::Monthly => PeriodFrequency::Monthly,
            RecurringInterval::Yearly => PeriodFrequency::Yearly,
        }
    }
}

impl FromStr for RecurringInterval {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.parse::<PeriodFrequency>()? {
            PeriodFrequency::Daily => Ok(RecurringInterval::Daily),
            PeriodFrequency::Weekly => Ok(RecurringInterval::Weekly),
            PeriodFrequency::Monthly => Ok(RecurringInterval::Monthly),
            PeriodFrequency::Yearly => Ok(RecurringInterval::Yearly),
        }
    }
}

/// Due-state fields of a recurring transaction.
///
/// Invariant: `next_occurrence_at` is `None` iff `is_recurring` is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RecurringSchedule {
    pub is_recurring: bool,
    pub interval: Option<RecurringInterval>,
    pub next_occurrence_at: Option<DateTime<Utc>>,
    pub last_processed_at: Option<DateTime<Utc>>,
}

impl RecurringSchedule {
    pub fn one_off() -> Self {
        Self::default()
    }

    pub fn validate(&self, record_id: &str) -> Result<()> {
        let malformed = |reason: &str| -> Error {
            ValidationError::MalformedRecord {
                id: record_id.to_string(),
                reason: reason.to_string(),
            }
            .into()
        };
        match (self.is_recurring, self.next_occurrence_at, self.interval) {
            (true, None, _) => Err(malformed("recurring without next occurrence")),
            (true, Some(_), None) => Err(malformed("recurring without interval")),
            (false, Some(_), _) => Err(malformed("next occurrence set on a one-off transaction")),
            _ => Ok(()),
        }
    }
}

/// A persisted income or expense row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialEvent {
    pub id: String,
    pub owner_id: String,
    /// Amount in minor units (cents), always positive; direction comes from `transaction_type`.
    pub amount_minor: i64,
    pub category: String,
    pub transaction_type: TransactionType,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub recurring: RecurringSchedule,
    pub savings_goal_percentage: Option<i32>,
    pub savings_alert_sent: bool,
    pub created_at: DateTime<Utc>,
}

impl FinancialEvent {
    /// Amount in major units.
    pub fn amount(&self) -> Decimal {
        to_major(self.amount_minor)
    }

    /// One-off copy of this transaction dated at `occurrence_at`.
    pub fn occurrence_at(&self, occurrence_at: DateTime<Utc>) -> NewFinancialEvent {
        NewFinancialEvent {
            id: None,
            owner_id: self.owner_id.clone(),
            amount: self.amount(),
            category: self.category.clone(),
            transaction_type: self.transaction_type,
            description: self.description.clone(),
            date: occurrence_at,
            recurring_interval: None,
            savings_goal_percentage: None,
        }
    }
}

/// Input model for creating a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFinancialEvent {
    pub id: Option<String>,
    pub owner_id: String,
    /// Amount in major units.
    pub amount: Decimal,
    pub category: String,
    pub transaction_type: TransactionType,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub recurring_interval: Option<RecurringInterval>,
    pub savings_goal_percentage: Option<i32>,
}

impl NewFinancialEvent {
    pub fn validate(&self) -> Result<()> {
        if self.owner_id.trim().is_empty() {
            return Err(ValidationError::MissingField("ownerId".to_string()).into());
        }
        if self.category.trim().is_empty() {
            return Err(ValidationError::MissingField("category".to_string()).into());
        }
        if self.amount <= Decimal::ZERO {
            return Err(ValidationError::InvalidInput(format!(
                "Amount must be positive, got {}",
                self.amount
            ))
            .into());
        }
        if let Some(goal) = self.savings_goal_percentage {
            if !(MIN_SAVINGS_GOAL_PERCENTAGE..=MAX_SAVINGS_GOAL_PERCENTAGE).contains(&goal) {
                return Err(ValidationError::InvalidInput(format!(
                    "Savings goal must be between {} and {} percent, got {}",
                    MIN_SAVINGS_GOAL_PERCENTAGE, MAX_SAVINGS_GOAL_PERCENTAGE, goal
                ))
                .into());
            }
            if self.transaction_type != TransactionType::Income {
                return Err(ValidationError::InvalidInput(
                    "Savings goals can only be set on income".to_string(),
                )
                .into());
            }
        }
        Ok(())
    }

    pub fn amount_minor(&self) -> Result<i64> {
        to_minor(self.amount)
    }

    /// Schedule for a freshly created transaction; the first occurrence after
    /// the original is due one interval boundary after its date.
    pub fn initial_schedule(&self) -> RecurringSchedule {
        match self.recurring_interval {
            Some(interval) => RecurringSchedule {
                is_recurring: true,
                interval: Some(interval),
                next_occurrence_at: Some(crate::period::next_due_at(interval.into(), self.date)),
                last_processed_at: None,
            },
            None => RecurringSchedule::one_off(),
        }
    }
}

/// Summed amounts for one `(type, category)` group inside a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    pub transaction_type: TransactionType,
    pub category: String,
    pub total_minor: i64,
    pub count: i64,
}
