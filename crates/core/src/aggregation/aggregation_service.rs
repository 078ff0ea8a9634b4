use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

use super::aggregation_model::{CategoryShare, PeriodSummary};
use crate::constants::TOP_CATEGORY_LIMIT;
use crate::errors::Result;
use crate::money::{percentage_of, to_major};
use crate::period::PeriodWindow;
use crate::transactions::{CategoryTotal, TransactionRepositoryTrait, TransactionType};

/// Trait defining the contract for period aggregation
pub trait AggregationServiceTrait: Send + Sync {
    fn summarize(&self, owner_id: &str, window: &PeriodWindow) -> Result<PeriodSummary>;

    /// Total expense in minor units for one owner inside `window`.
    fn expense_total_minor(&self, owner_id: &str, window: &PeriodWindow) -> Result<i64>;
}

pub struct AggregationService {
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
}

impl AggregationService {
    pub fn new(transaction_repository: Arc<dyn TransactionRepositoryTrait>) -> Self {
        Self {
            transaction_repository,
        }
    }
}

impl AggregationServiceTrait for AggregationService {
    fn summarize(&self, owner_id: &str, window: &PeriodWindow) -> Result<PeriodSummary> {
        debug!(
            "Summarizing owner {} for [{}, {})",
            owner_id, window.from, window.to
        );
        let totals = self
            .transaction_repository
            .category_totals(owner_id, window)?;
        Ok(summarize_totals(*window, &totals))
    }

    fn expense_total_minor(&self, owner_id: &str, window: &PeriodWindow) -> Result<i64> {
        let totals = self
            .transaction_repository
            .category_totals(owner_id, window)?;
        Ok(totals
            .iter()
            .filter(|t| t.transaction_type == TransactionType::Expense)
            .map(|t| t.total_minor)
            .sum())
    }
}

/// Builds a summary from grouped totals. All arithmetic stays in minor units
/// until the final conversion.
pub fn summarize_totals(window: PeriodWindow, totals: &[CategoryTotal]) -> PeriodSummary {
    let mut income_minor: i64 = 0;
    let mut expense_minor: i64 = 0;
    let mut transaction_count: i64 = 0;
    // The same category can arrive in several rows when the storage layer
    // groups case-sensitively.
    let mut by_category: HashMap<&str, (i64, i64)> = HashMap::new();

    for total in totals {
        transaction_count += total.count;
        match total.transaction_type {
            TransactionType::Income => income_minor += total.total_minor,
            TransactionType::Expense => {
                expense_minor += total.total_minor;
                let entry = by_category.entry(total.category.as_str()).or_insert((0, 0));
                entry.0 += total.total_minor;
                entry.1 += total.count;
            }
        }
    }

    let mut ranked: Vec<(&str, i64, i64)> = by_category
        .into_iter()
        .map(|(category, (amount, count))| (category, amount, count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let top_categories = ranked
        .into_iter()
        .take(TOP_CATEGORY_LIMIT)
        .map(|(category, amount, count)| CategoryShare {
            category: category.to_string(),
            amount: to_major(amount),
            percentage: percentage_of(amount, expense_minor),
            transaction_count: count,
        })
        .collect();

    PeriodSummary {
        window,
        income_total: to_major(income_minor),
        expense_total: to_major(expense_minor),
        balance: to_major(income_minor - expense_minor),
        savings_rate: percentage_of(income_minor - expense_minor, income_minor),
        top_categories,
        transaction_count,
    }
}
