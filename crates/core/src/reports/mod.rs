//! Reports module - subscriptions, audit logs and their repository contract.

mod reports_model;
mod reports_traits;

pub use reports_model::{
    NewReportLog, ReportFrequency, ReportLog, ReportStatus, ReportSubscription,
    SubscriptionUpdate,
};
pub use reports_traits::ReportRepositoryTrait;
