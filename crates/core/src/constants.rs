/// Decimal places between minor and major currency units (cents)
pub const MINOR_UNIT_SCALE: u32 = 2;

/// Decimal precision for display of percentages and major-unit amounts
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Number of expense categories reported in a period summary
pub const TOP_CATEGORY_LIMIT: usize = 5;

/// Default page size for keyset-paginated due-item scans
pub const DEFAULT_SCAN_PAGE_SIZE: i64 = 200;

/// Share of the non-saved salary portion that, once spent, triggers a savings alert
pub const SAVINGS_ALERT_THRESHOLD_PERCENT: i64 = 85;

/// Valid bounds for a salary record's savings goal percentage
pub const MIN_SAVINGS_GOAL_PERCENTAGE: i32 = 5;
pub const MAX_SAVINGS_GOAL_PERCENTAGE: i32 = 100;

/// Category names treated as salary income when none are configured
pub const DEFAULT_SALARY_CATEGORIES: &[&str] = &["salary", "gaji"];

/// Email template identifiers understood by the dispatcher
pub const PERIODIC_REPORT_TEMPLATE: &str = "periodic-report";
pub const SAVINGS_ALERT_TEMPLATE: &str = "savings-alert";

/// Job labels as registered with the orchestrator
pub const REPORT_JOB_LABEL: &str = "periodic-reports";
pub const RECURRING_JOB_LABEL: &str = "recurring-transactions";
pub const SAVINGS_JOB_LABEL: &str = "savings-check";
