//! Period summary models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::period::PeriodWindow;

/// One expense category's share of total spending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    pub category: String,
    pub amount: Decimal,
    pub percentage: Decimal,
    pub transaction_count: i64,
}

/// Aggregated figures for one owner over one window, in major units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    pub window: PeriodWindow,
    pub income_total: Decimal,
    pub expense_total: Decimal,
    pub balance: Decimal,
    /// `(income - expense) / income * 100`, zero without income.
    pub savings_rate: Decimal,
    pub top_categories: Vec<CategoryShare>,
    pub transaction_count: i64,
}

impl PeriodSummary {
    pub fn has_activity(&self) -> bool {
        self.transaction_count > 0
    }
}
