//! Per-item failure containment shared by all jobs.

use futures::FutureExt;
use log::{debug, error, warn};
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use super::jobs_model::{ItemOutcome, ItemState, JobRunSummary};
use crate::errors::{Error, Result};
use crate::owners::OwnerContact;
use crate::scanner::{DueItem, PagedScan};

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Runs one item's evaluation and commit, converting errors and panics into
/// a failure count so the scan can continue.
pub(crate) async fn run_isolated<F>(
    job: &str,
    item_id: &str,
    summary: &mut JobRunSummary,
    work: F,
) where
    F: Future<Output = Result<ItemOutcome>>,
{
    debug!("[{}] item {} {}", job, item_id, ItemState::Evaluating);
    match AssertUnwindSafe(work).catch_unwind().await {
        Ok(Ok(outcome)) => {
            match outcome {
                ItemOutcome::Deferred => {
                    debug!("[{}] item {} deferred, stays {}", job, item_id, ItemState::Pending)
                }
                _ => debug!("[{}] item {} {}", job, item_id, ItemState::Committed),
            }
            summary.record(outcome);
        }
        Ok(Err(e)) if e.is_data_integrity() => {
            warn!(
                "[{}] item {} skipped, needs operator attention: {}",
                job, item_id, e
            );
            summary.failed += 1;
            summary.needs_attention += 1;
        }
        Ok(Err(e @ Error::StaleDueState(_))) => {
            warn!("[{}] item {} {}: {}", job, item_id, ItemState::RolledBack, e);
            summary.failed += 1;
        }
        Ok(Err(e)) => {
            error!("[{}] item {} {}: {}", job, item_id, ItemState::RolledBack, e);
            summary.failed += 1;
        }
        Err(payload) => {
            error!(
                "[{}] item {} panicked: {}",
                job,
                item_id,
                panic_message(payload.as_ref())
            );
            summary.failed += 1;
        }
    }
}

/// Drives a scan to completion, skipping orphans and isolating every item.
///
/// A failing page fetch aborts the run with that error.
pub(crate) async fn drain_scan<T, F, Fut>(
    job: &str,
    scan: PagedScan<'_, T>,
    summary: &mut JobRunSummary,
    mut process: F,
) -> Result<()>
where
    F: FnMut(DueItem<T>, OwnerContact) -> Fut,
    Fut: Future<Output = Result<ItemOutcome>>,
{
    for next in scan {
        let mut item = next?;
        let item_id = item.cursor.id.clone();
        let Some(owner) = item.owner.take() else {
            warn!("[{}] item {} is orphaned: owner not found", job, item_id);
            summary.orphaned += 1;
            continue;
        };
        run_isolated(job, &item_id, summary, process(item, owner)).await;
    }
    Ok(())
}
