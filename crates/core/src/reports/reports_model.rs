//! Report subscription and audit log domain models.

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, Result, ValidationError};
use crate::period::PeriodFrequency;

/// Cadence an owner receives financial reports at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportFrequency {
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl ReportFrequency {
    pub fn as_str(&self) -> &'static str {
        PeriodFrequency::from(*self).as_str()
    }

    /// Parses a stored frequency, falling back to `Monthly` when it is
    /// missing or unrecognised.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value.map(str::parse::<ReportFrequency>) {
            Some(Ok(frequency)) => frequency,
            Some(Err(_)) => {
                warn!(
                    "Unrecognised report frequency {:?}, falling back to MONTHLY",
                    value.unwrap_or_default()
                );
                ReportFrequency::default()
            }
            None => ReportFrequency::default(),
        }
    }
}

impl From<ReportFrequency> for PeriodFrequency {
    fn from(frequency: ReportFrequency) -> Self {
        match frequency {
            ReportFrequency::Weekly => PeriodFrequency::Weekly,
            ReportFrequency::Monthly => PeriodFrequency::Monthly,
            ReportFrequency::Yearly => PeriodFrequency::Yearly,
        }
    }
}

impl FromStr for ReportFrequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.parse::<PeriodFrequency>()? {
            PeriodFrequency::Weekly => Ok(ReportFrequency::Weekly),
            PeriodFrequency::Monthly => Ok(ReportFrequency::Monthly),
            PeriodFrequency::Yearly => Ok(ReportFrequency::Yearly),
            PeriodFrequency::Daily => Err(ValidationError::InvalidInput(
                "Reports cannot be sent daily".to_string(),
            )
            .into()),
        }
    }
}

impl fmt::Display for ReportFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An owner's report preferences plus its due state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSubscription {
    pub id: String,
    pub owner_id: String,
    pub frequency: ReportFrequency,
    pub is_enabled: bool,
    pub next_report_at: DateTime<Utc>,
    pub last_sent_at: Option<DateTime<Utc>>,
}

/// Owner-initiated change to a subscription.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionUpdate {
    pub frequency: Option<ReportFrequency>,
    pub is_enabled: Option<bool>,
}

/// Outcome recorded for one processed report cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    Sent,
    Failed,
    NoActivity,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Sent => "SENT",
            ReportStatus::Failed => "FAILED",
            ReportStatus::NoActivity => "NO_ACTIVITY",
        }
    }
}

impl FromStr for ReportStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "SENT" => Ok(ReportStatus::Sent),
            "FAILED" => Ok(ReportStatus::Failed),
            "NO_ACTIVITY" => Ok(ReportStatus::NoActivity),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown report status '{}'",
                other
            ))
            .into()),
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable audit record, one per processed subscription cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportLog {
    pub id: String,
    pub owner_id: String,
    pub subscription_id: String,
    pub sent_date: DateTime<Utc>,
    pub period_label: String,
    pub status: ReportStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReportLog {
    pub owner_id: String,
    pub subscription_id: String,
    pub sent_date: DateTime<Utc>,
    pub period_label: String,
    pub status: ReportStatus,
}
