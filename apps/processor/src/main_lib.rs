use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use fintrack_core::aggregation::{AggregationService, AggregationServiceTrait};
use fintrack_core::commit::DueStateCommitterTrait;
use fintrack_core::jobs::{
    JobOrchestrator, JobRunSummary, RecurringTransactionJob, ReportJob, SavingsCheckJob,
};
use fintrack_core::notifications::EmailDispatcherTrait;
use fintrack_core::reports::ReportRepositoryTrait;
use fintrack_core::transactions::TransactionRepositoryTrait;
use fintrack_storage_sqlite::{
    db, DueStateCommitter, ReportRepository, TransactionRepository,
};

use crate::config::Config;
use crate::mailer::{HttpEmailDispatcher, LogOnlyDispatcher};

pub fn init_tracing() {
    let log_format = std::env::var("FT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Logs a finished run with each counter as its own field.
pub fn log_summary(summary: &JobRunSummary) {
    tracing::info!(
        job = %summary.job,
        processed = summary.processed as u64,
        failed = summary.failed as u64,
        needs_attention = summary.needs_attention as u64,
        orphaned = summary.orphaned as u64,
        deferred = summary.deferred as u64,
        dispatch_failures = summary.dispatch_failures as u64,
        "Job run completed"
    );
}

pub fn build_dispatcher(config: &Config) -> anyhow::Result<Arc<dyn EmailDispatcherTrait>> {
    match &config.email {
        Some(email) => {
            tracing::info!("Sending email through {}", email.api_url);
            Ok(Arc::new(HttpEmailDispatcher::new(email)?))
        }
        None => {
            tracing::warn!("FT_EMAIL_API_URL is not set, emails will only be logged");
            Ok(Arc::new(LogOnlyDispatcher))
        }
    }
}

/// Opens the database and registers the three jobs with their cadences.
pub fn build_orchestrator(config: &Config) -> anyhow::Result<JobOrchestrator> {
    let dispatcher = build_dispatcher(config)?;
    build_orchestrator_with(config, dispatcher)
}

pub fn build_orchestrator_with(
    config: &Config,
    dispatcher: Arc<dyn EmailDispatcherTrait>,
) -> anyhow::Result<JobOrchestrator> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let transaction_repository: Arc<dyn TransactionRepositoryTrait> =
        Arc::new(TransactionRepository::new(pool.clone(), writer.clone()));
    let report_repository: Arc<dyn ReportRepositoryTrait> =
        Arc::new(ReportRepository::new(pool.clone(), writer.clone()));
    let committer: Arc<dyn DueStateCommitterTrait> = Arc::new(DueStateCommitter::new(writer));
    let aggregation_service: Arc<dyn AggregationServiceTrait> =
        Arc::new(AggregationService::new(transaction_repository.clone()));

    let report_job = ReportJob::new(
        report_repository,
        aggregation_service.clone(),
        dispatcher.clone(),
        committer.clone(),
    )
    .with_page_size(config.scan_page_size);
    let recurring_job =
        RecurringTransactionJob::new(transaction_repository.clone(), committer.clone())
            .with_page_size(config.scan_page_size);
    let savings_job = SavingsCheckJob::new(
        transaction_repository,
        aggregation_service,
        dispatcher,
        committer,
    )
    .with_salary_categories(config.salary_categories.clone())
    .with_page_size(config.scan_page_size);

    Ok(JobOrchestrator::new()
        .register(config.report_cadence, Arc::new(report_job))
        .register(config.recurring_cadence, Arc::new(recurring_job))
        .register(config.savings_cadence, Arc::new(savings_job)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fintrack_core::constants::{RECURRING_JOB_LABEL, REPORT_JOB_LABEL, SAVINGS_JOB_LABEL};
    use std::collections::HashMap;
    use std::io;
    use std::sync::Mutex;
    use tempfile::tempdir;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_summary_counters_are_separate_json_fields() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_writer(logs.clone())
            .finish();

        let mut summary = JobRunSummary::new(RECURRING_JOB_LABEL, Utc::now());
        summary.processed = 2;
        summary.failed = 1;
        summary.needs_attention = 1;
        summary.orphaned = 3;
        tracing::subscriber::with_default(subscriber, || log_summary(&summary));

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        let line = output.lines().next().unwrap();
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        let fields = &value["fields"];
        assert_eq!(fields["message"], "Job run completed");
        assert_eq!(fields["job"], RECURRING_JOB_LABEL);
        assert_eq!(fields["processed"], 2);
        assert_eq!(fields["failed"], 1);
        assert_eq!(fields["needs_attention"], 1);
        assert_eq!(fields["orphaned"], 3);
        assert_eq!(fields["deferred"], 0);
        assert_eq!(fields["dispatch_failures"], 0);
    }

    #[tokio::test]
    async fn test_orchestrator_runs_all_jobs_on_empty_database() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("processor.db");
        let vars: HashMap<String, String> = HashMap::from([(
            "FT_DB_PATH".to_string(),
            db_path.to_string_lossy().to_string(),
        )]);
        let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();

        let orchestrator = build_orchestrator_with(&config, Arc::new(LogOnlyDispatcher)).unwrap();
        assert_eq!(
            orchestrator.labels(),
            vec![REPORT_JOB_LABEL, RECURRING_JOB_LABEL, SAVINGS_JOB_LABEL]
        );

        let results = orchestrator.run_all(Utc::now()).await;
        assert_eq!(results.len(), 3);
        for (label, result) in results {
            let summary = result.unwrap();
            assert_eq!(summary.job, label);
            assert_eq!(summary.processed, 0);
            assert_eq!(summary.failed, 0);
        }
    }
}
