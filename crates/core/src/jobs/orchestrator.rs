//! Owns the registered jobs and runs them with isolation and overlap guards.

use chrono::{DateTime, Utc};
use futures::FutureExt;
use log::{debug, error, info, warn};
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::cadence::Cadence;
use super::isolation::panic_message;
use super::jobs_model::JobRunSummary;
use super::jobs_traits::ScheduledJob;
use crate::errors::{Error, Result};

/// A job together with the cadence it fires at.
pub struct JobRegistration {
    pub cadence: Cadence,
    pub job: Arc<dyn ScheduledJob>,
    running: AtomicBool,
}

impl JobRegistration {
    pub fn label(&self) -> &str {
        self.job.label()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Clears a registration's running flag however the run ends.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// The explicit job list, built once by the composition root.
#[derive(Default)]
pub struct JobOrchestrator {
    registrations: Vec<JobRegistration>,
}

impl JobOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, cadence: Cadence, job: Arc<dyn ScheduledJob>) -> Self {
        info!("Registered job '{}' ({})", job.label(), cadence);
        self.registrations.push(JobRegistration {
            cadence,
            job,
            running: AtomicBool::new(false),
        });
        self
    }

    pub fn registrations(&self) -> &[JobRegistration] {
        &self.registrations
    }

    pub fn labels(&self) -> Vec<String> {
        self.registrations
            .iter()
            .map(|r| r.label().to_string())
            .collect()
    }

    fn find(&self, label: &str) -> Result<&JobRegistration> {
        self.registrations
            .iter()
            .find(|r| r.label() == label)
            .ok_or_else(|| Error::UnknownJob(label.to_string()))
    }

    /// Runs one job now. Panics inside the job surface as `Error::Unexpected`;
    /// a run already in progress yields `Error::JobAlreadyRunning`.
    pub async fn run_job(&self, label: &str, now: DateTime<Utc>) -> Result<JobRunSummary> {
        let registration = self.find(label)?;
        if registration.running.swap(true, Ordering::SeqCst) {
            return Err(Error::JobAlreadyRunning(label.to_string()));
        }
        let _guard = RunningGuard(&registration.running);

        info!("Job '{}' started", label);
        match AssertUnwindSafe(registration.job.run(now))
            .catch_unwind()
            .await
        {
            Ok(Ok(summary)) => {
                debug!("Job '{}' finished: {}", label, summary);
                Ok(summary)
            }
            Ok(Err(e)) => Err(e),
            Err(payload) => Err(Error::Unexpected(format!(
                "job '{}' panicked: {}",
                label,
                panic_message(payload.as_ref())
            ))),
        }
    }

    /// Scheduler entry point: runs the job and logs instead of returning errors.
    pub async fn trigger(&self, label: &str, now: DateTime<Utc>) -> Option<JobRunSummary> {
        match self.run_job(label, now).await {
            Ok(summary) => Some(summary),
            Err(Error::JobAlreadyRunning(_)) => {
                warn!("Job '{}' skipped: previous run still in progress", label);
                None
            }
            Err(e) => {
                error!("Job '{}' failed: {}", label, e);
                None
            }
        }
    }

    /// Runs every registered job once, in registration order.
    pub async fn run_all(&self, now: DateTime<Utc>) -> Vec<(String, Result<JobRunSummary>)> {
        let mut results = Vec::with_capacity(self.registrations.len());
        for label in self.labels() {
            let result = self.run_job(&label, now).await;
            if let Err(e) = &result {
                error!("Job '{}' failed: {}", label, e);
            }
            results.push((label, result));
        }
        results
    }
}
