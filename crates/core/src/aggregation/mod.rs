//! Aggregation module - owner-scoped, time-windowed financial summaries.

mod aggregation_model;
mod aggregation_service;

pub use aggregation_model::{CategoryShare, PeriodSummary};
pub use aggregation_service::{summarize_totals, AggregationService, AggregationServiceTrait};
