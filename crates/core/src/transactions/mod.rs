//! Transactions module - income/expense records and their recurring schedule.

mod transactions_model;
mod transactions_traits;

pub use transactions_model::{
    CategoryTotal, FinancialEvent, NewFinancialEvent, RecurringInterval, RecurringSchedule,
    TransactionType,
};
pub use transactions_traits::TransactionRepositoryTrait;
