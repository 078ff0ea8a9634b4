//! Period module - report windows and next-due arithmetic.

mod period_calculator;
mod period_model;

pub use period_calculator::{next_due_at, period_label, period_start, window_for};
pub use period_model::{PeriodFrequency, PeriodWindow};
