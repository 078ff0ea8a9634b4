//! Pure calendar arithmetic for report windows and next-due timestamps.
//!
//! All functions operate in UTC and never touch I/O, so every scheduling
//! decision made by the jobs can be reproduced from `(frequency, instant)`.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};

use super::period_model::{PeriodFrequency, PeriodWindow};

fn at_midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

fn year_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.ordinal0() as i64)
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// First day of the period containing `date`.
fn period_start_date(frequency: PeriodFrequency, date: NaiveDate) -> NaiveDate {
    match frequency {
        PeriodFrequency::Daily => date,
        PeriodFrequency::Weekly => week_start(date),
        PeriodFrequency::Monthly => month_start(date),
        PeriodFrequency::Yearly => year_start(date),
    }
}

/// First day of the period after the one starting at `start`.
fn following_period_start(frequency: PeriodFrequency, start: NaiveDate) -> NaiveDate {
    match frequency {
        PeriodFrequency::Daily => start + Duration::days(1),
        PeriodFrequency::Weekly => start + Duration::days(7),
        // 32 days past a month start always lands in the next month,
        // 366 past a year start always lands in the next year.
        PeriodFrequency::Monthly => month_start(start + Duration::days(32)),
        PeriodFrequency::Yearly => year_start(start + Duration::days(366)),
    }
}

/// First day of the period before the one starting at `start`.
fn preceding_period_start(frequency: PeriodFrequency, start: NaiveDate) -> NaiveDate {
    match frequency {
        PeriodFrequency::Daily => start - Duration::days(1),
        PeriodFrequency::Weekly => start - Duration::days(7),
        PeriodFrequency::Monthly => month_start(start - Duration::days(1)),
        PeriodFrequency::Yearly => year_start(start - Duration::days(1)),
    }
}

/// Start of the period that contains `instant`.
pub fn period_start(frequency: PeriodFrequency, instant: DateTime<Utc>) -> DateTime<Utc> {
    at_midnight(period_start_date(frequency, instant.date_naive()))
}

/// The completed period immediately before the one containing `reference`.
///
/// For `Monthly` and a reference of `2025-03-01T00:05Z` this is
/// `[2025-02-01T00:00Z, 2025-03-01T00:00Z)`.
pub fn window_for(frequency: PeriodFrequency, reference: DateTime<Utc>) -> PeriodWindow {
    let current = period_start_date(frequency, reference.date_naive());
    let previous = preceding_period_start(frequency, current);
    PeriodWindow::new(at_midnight(previous), at_midnight(current))
}

/// Start of day of the next period boundary strictly after `from`.
pub fn next_due_at(frequency: PeriodFrequency, from: DateTime<Utc>) -> DateTime<Utc> {
    let current = period_start_date(frequency, from.date_naive());
    at_midnight(following_period_start(frequency, current))
}

/// Human-readable label for a report window, stored on report logs.
pub fn period_label(frequency: PeriodFrequency, window: &PeriodWindow) -> String {
    let first_day = window.from.date_naive();
    let last_day = window.inclusive_end().date_naive();
    match frequency {
        PeriodFrequency::Daily => first_day.format("%Y-%m-%d").to_string(),
        PeriodFrequency::Weekly => format!(
            "{} – {}",
            first_day.format("%Y-%m-%d"),
            last_day.format("%Y-%m-%d")
        ),
        PeriodFrequency::Monthly => first_day.format("%B %Y").to_string(),
        PeriodFrequency::Yearly => first_day.format("%Y").to_string(),
    }
}
