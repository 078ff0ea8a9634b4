//! Process configuration read from `FT_*` environment variables.

use std::time::Duration;

use anyhow::{bail, Context};
use fintrack_core::constants::{DEFAULT_SALARY_CATEGORIES, DEFAULT_SCAN_PAGE_SIZE};
use fintrack_core::jobs::Cadence;

const DEFAULT_DB_PATH: &str = "./db/fintrack.db";
const DEFAULT_REPORT_CADENCE: &str = "daily@00:05";
const DEFAULT_RECURRING_CADENCE: &str = "daily@02:30";
const DEFAULT_SAVINGS_CADENCE: &str = "daily@03:00";
const DEFAULT_EMAIL_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct EmailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: String,
    pub report_cadence: Cadence,
    pub recurring_cadence: Cadence,
    pub savings_cadence: Cadence,
    pub scan_page_size: i64,
    pub salary_categories: Vec<String>,
    /// `None` means emails are only logged.
    pub email: Option<EmailConfig>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let cadence = |key: &str, default: &str| -> anyhow::Result<Cadence> {
            let raw = var(key).unwrap_or_else(|| default.to_string());
            raw.parse::<Cadence>()
                .with_context(|| format!("{} is not a valid cadence", key))
        };

        let scan_page_size = match var("FT_SCAN_PAGE_SIZE") {
            Some(raw) => raw
                .parse::<i64>()
                .with_context(|| format!("FT_SCAN_PAGE_SIZE must be an integer, got '{}'", raw))?,
            None => DEFAULT_SCAN_PAGE_SIZE,
        };
        if scan_page_size < 1 {
            bail!("FT_SCAN_PAGE_SIZE must be at least 1");
        }

        let salary_categories = match var("FT_SALARY_CATEGORIES") {
            Some(raw) => raw
                .split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
            None => DEFAULT_SALARY_CATEGORIES
                .iter()
                .map(|c| c.to_string())
                .collect(),
        };

        let email = match var("FT_EMAIL_API_URL") {
            Some(api_url) => {
                let api_key = var("FT_EMAIL_API_KEY")
                    .context("FT_EMAIL_API_KEY is required when FT_EMAIL_API_URL is set")?;
                let from = var("FT_EMAIL_FROM")
                    .context("FT_EMAIL_FROM is required when FT_EMAIL_API_URL is set")?;
                let timeout_secs = match var("FT_EMAIL_TIMEOUT_SECS") {
                    Some(raw) => raw.parse::<u64>().with_context(|| {
                        format!("FT_EMAIL_TIMEOUT_SECS must be an integer, got '{}'", raw)
                    })?,
                    None => DEFAULT_EMAIL_TIMEOUT_SECS,
                };
                Some(EmailConfig {
                    api_url: api_url.trim_end_matches('/').to_string(),
                    api_key,
                    from,
                    timeout: Duration::from_secs(timeout_secs.max(1)),
                })
            }
            None => None,
        };

        Ok(Config {
            db_path: var("FT_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            report_cadence: cadence("FT_REPORT_CADENCE", DEFAULT_REPORT_CADENCE)?,
            recurring_cadence: cadence("FT_RECURRING_CADENCE", DEFAULT_RECURRING_CADENCE)?,
            savings_cadence: cadence("FT_SAVINGS_CADENCE", DEFAULT_SAVINGS_CADENCE)?,
            scan_page_size,
            salary_categories,
            email,
        })
    }
}
