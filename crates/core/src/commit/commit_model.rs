//! State transitions handed to the committer, one per processed due item.
//!
//! Each carries the due marker observed at scan time so the storage layer can
//! refuse to advance an item that changed underneath the job.

use chrono::{DateTime, Utc};

use crate::reports::NewReportLog;
use crate::transactions::NewFinancialEvent;

/// Materialise one occurrence of a recurring transaction and reschedule it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurringOccurrenceCommit {
    pub source_id: String,
    pub observed_next_occurrence_at: DateTime<Utc>,
    pub occurrence: NewFinancialEvent,
    pub processed_at: DateTime<Utc>,
    pub next_occurrence_at: DateTime<Utc>,
}

/// Log one report cycle and move the subscription to its next due time.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportCycleCommit {
    pub subscription_id: String,
    pub observed_next_report_at: DateTime<Utc>,
    pub log: NewReportLog,
    pub next_report_at: DateTime<Utc>,
    /// Only set when the report was actually delivered.
    pub last_sent_at: Option<DateTime<Utc>>,
}

/// Latch a salary record's savings alert and append its audit row.
#[derive(Debug, Clone, PartialEq)]
pub struct SavingsAlertCommit {
    pub transaction_id: String,
    pub owner_id: String,
    pub sent_at: DateTime<Utc>,
    pub expense_total_minor: i64,
    pub threshold_minor: i64,
}
