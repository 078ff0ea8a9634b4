//! Period domain models.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, ValidationError};

/// Calendar granularity used for report windows and next-due computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodFrequency {
    Daily,
    /// Weeks start on Monday.
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl PeriodFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodFrequency::Daily => "DAILY",
            PeriodFrequency::Weekly => "WEEKLY",
            PeriodFrequency::Monthly => "MONTHLY",
            PeriodFrequency::Yearly => "YEARLY",
        }
    }
}

impl fmt::Display for PeriodFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodFrequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAILY" => Ok(PeriodFrequency::Daily),
            "WEEKLY" => Ok(PeriodFrequency::Weekly),
            "MONTHLY" => Ok(PeriodFrequency::Monthly),
            "YEARLY" => Ok(PeriodFrequency::Yearly),
            other => Err(ValidationError::InvalidInput(format!("Unknown frequency '{}'", other)).into()),
        }
    }
}

/// A half-open `[from, to)` reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl PeriodWindow {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// Last representable instant inside the window, at millisecond precision.
    pub fn inclusive_end(&self) -> DateTime<Utc> {
        self.to - Duration::milliseconds(1)
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.from && instant < self.to
    }
}
