//! Trigger cadences, always interpreted in UTC.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use std::fmt;
use std::str::FromStr;

use crate::errors::Error;

/// When a job fires.
///
/// Parsed from `daily@HH:MM` or `every:<seconds>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    DailyAt(NaiveTime),
    Every(std::time::Duration),
}

impl Cadence {
    /// First firing instant strictly after `now`.
    pub fn next_fire_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Cadence::DailyAt(time) => {
                let today = now.date_naive().and_time(*time).and_utc();
                if today > now {
                    today
                } else {
                    today + Duration::days(1)
                }
            }
            Cadence::Every(interval) => now + Duration::seconds(interval.as_secs().max(1) as i64),
        }
    }
}

impl FromStr for Cadence {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidConfigValue(format!("Invalid cadence '{}'", s));
        let value = s.trim();
        if let Some(time) = value.strip_prefix("daily@") {
            let time = NaiveTime::parse_from_str(time, "%H:%M").map_err(|_| invalid())?;
            return Ok(Cadence::DailyAt(time));
        }
        if let Some(secs) = value.strip_prefix("every:") {
            let secs: u64 = secs.trim_end_matches('s').parse().map_err(|_| invalid())?;
            if secs == 0 {
                return Err(invalid());
            }
            return Ok(Cadence::Every(std::time::Duration::from_secs(secs)));
        }
        Err(invalid())
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cadence::DailyAt(time) => write!(f, "daily at {} UTC", time.format("%H:%M")),
            Cadence::Every(interval) => write!(f, "every {}s", interval.as_secs()),
        }
    }
}
