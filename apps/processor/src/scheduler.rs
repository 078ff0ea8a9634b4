//! Cadence-driven trigger loops, one task per registered job.
//!
//! Each loop sleeps until the job's next firing instant and then asks the
//! orchestrator to run it. A run that is still in progress when the next
//! firing arrives is skipped by the orchestrator's overlap guard.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use fintrack_core::jobs::{Cadence, JobOrchestrator};

use crate::main_lib::log_summary;

/// Time to wait from `now` until the cadence next fires.
pub fn delay_until_next_fire(cadence: &Cadence, now: DateTime<Utc>) -> Duration {
    (cadence.next_fire_after(now) - now)
        .to_std()
        .unwrap_or(Duration::ZERO)
}

/// Starts one trigger loop per registered job.
pub fn start_job_schedulers(orchestrator: Arc<JobOrchestrator>) -> Vec<JoinHandle<()>> {
    orchestrator
        .registrations()
        .iter()
        .map(|registration| {
            let label = registration.label().to_string();
            let cadence = registration.cadence;
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move {
                info!("Scheduler for '{}' started ({})", label, cadence);
                loop {
                    let delay = delay_until_next_fire(&cadence, Utc::now());
                    debug!("'{}' next fires in {}s", label, delay.as_secs());
                    tokio::time::sleep(delay).await;
                    if let Some(summary) = orchestrator.trigger(&label, Utc::now()).await {
                        log_summary(&summary);
                    }
                }
            })
        })
        .collect()
}
