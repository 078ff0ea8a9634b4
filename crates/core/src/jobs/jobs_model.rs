//! Job run bookkeeping.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// How a single due item left the pipeline when nothing went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// State advanced and the output record was written.
    Committed,
    /// Committed, but the email could not be delivered.
    CommittedWithDispatchFailure,
    /// Evaluated and left untouched; the item stays eligible for a later run.
    Deferred,
}

/// Lifecycle of one due item inside a run, used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Pending,
    Evaluating,
    SideEffectAttempted,
    Committed,
    RolledBack,
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ItemState::Pending => "PENDING",
            ItemState::Evaluating => "EVALUATING",
            ItemState::SideEffectAttempted => "SIDE_EFFECT_ATTEMPTED",
            ItemState::Committed => "COMMITTED",
            ItemState::RolledBack => "ROLLED_BACK",
        };
        f.write_str(s)
    }
}

/// Counters emitted at the end of every job run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRunSummary {
    pub job: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub processed: usize,
    pub failed: usize,
    /// Failed items skipped as malformed; a subset of `failed`. These are
    /// selected again every run until an operator repairs the record.
    pub needs_attention: usize,
    /// Items whose owner could not be resolved; neither processed nor failed.
    pub orphaned: usize,
    pub deferred: usize,
    /// Processed items whose email failed; a subset of `processed`.
    pub dispatch_failures: usize,
}

impl JobRunSummary {
    pub fn new(job: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            job: job.into(),
            started_at,
            finished_at: None,
            processed: 0,
            failed: 0,
            needs_attention: 0,
            orphaned: 0,
            deferred: 0,
            dispatch_failures: 0,
        }
    }

    pub fn record(&mut self, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Committed => self.processed += 1,
            ItemOutcome::CommittedWithDispatchFailure => {
                self.processed += 1;
                self.dispatch_failures += 1;
            }
            ItemOutcome::Deferred => self.deferred += 1,
        }
    }

    pub fn finish(mut self, at: DateTime<Utc>) -> Self {
        self.finished_at = Some(at);
        self
    }

    pub fn seen(&self) -> usize {
        self.processed + self.failed + self.orphaned + self.deferred
    }
}

impl fmt::Display for JobRunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "job={} processed={} failed={} needs_attention={} orphaned={} deferred={} dispatch_failures={}",
            self.job,
            self.processed,
            self.failed,
            self.needs_attention,
            self.orphaned,
            self.deferred,
            self.dispatch_failures
        )
    }
}
