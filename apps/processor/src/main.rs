mod config;
mod mailer;
mod main_lib;
mod scheduler;

use std::sync::Arc;

use anyhow::bail;
use chrono::Utc;
use config::Config;
use main_lib::{build_orchestrator, init_tracing, log_summary};

enum Mode {
    Serve,
    RunOnce(String),
}

fn parse_args() -> anyhow::Result<Mode> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        None => Ok(Mode::Serve),
        Some("--run-once") => match args.next() {
            Some(label) => Ok(Mode::RunOnce(label)),
            None => bail!("--run-once expects a job label or 'all'"),
        },
        Some(other) => bail!("Unknown argument '{}'. Usage: fintrack-processor [--run-once <label|all>]", other),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let mode = parse_args()?;
    let config = Config::from_env()?;
    let orchestrator = Arc::new(build_orchestrator(&config)?);

    match mode {
        Mode::RunOnce(label) if label == "all" => {
            let mut failed = false;
            for (label, result) in orchestrator.run_all(Utc::now()).await {
                match result {
                    Ok(summary) => log_summary(&summary),
                    Err(e) => {
                        failed = true;
                        eprintln!("{}: {}", label, e);
                    }
                }
            }
            if failed {
                bail!("One or more jobs failed");
            }
        }
        Mode::RunOnce(label) => {
            let summary = orchestrator.run_job(&label, Utc::now()).await?;
            log_summary(&summary);
        }
        Mode::Serve => {
            let handles = scheduler::start_job_schedulers(orchestrator.clone());
            tracing::info!("Processor running {} jobs", handles.len());
            tokio::signal::ctrl_c().await?;
            tracing::info!("Shutdown requested");
            for handle in handles {
                handle.abort();
            }
        }
    }
    Ok(())
}
