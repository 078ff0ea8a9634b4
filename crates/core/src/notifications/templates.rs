//! Builders for the emails sent by the periodic jobs.

use serde::Serialize;

use super::notifications_model::EmailMessage;
use crate::aggregation::{CategoryShare, PeriodSummary};
use crate::constants::{PERIODIC_REPORT_TEMPLATE, SAVINGS_ALERT_TEMPLATE};
use crate::errors::Result;
use crate::money::to_major;
use crate::owners::OwnerContact;
use crate::reports::ReportFrequency;
use crate::transactions::FinancialEvent;
use rust_decimal::Decimal;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportTemplateData<'a> {
    name: &'a str,
    frequency: ReportFrequency,
    period_label: &'a str,
    income_total: Decimal,
    expense_total: Decimal,
    balance: Decimal,
    savings_rate: Decimal,
    top_categories: &'a [CategoryShare],
    transaction_count: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SavingsAlertTemplateData<'a> {
    name: &'a str,
    salary_date: String,
    salary_amount: Decimal,
    savings_goal_percentage: i32,
    expense_total: Decimal,
    alert_threshold: Decimal,
    remaining_budget: Decimal,
}

pub fn report_email(
    owner: &OwnerContact,
    frequency: ReportFrequency,
    period_label: &str,
    summary: &PeriodSummary,
) -> Result<EmailMessage> {
    let cadence = match frequency {
        ReportFrequency::Weekly => "weekly",
        ReportFrequency::Monthly => "monthly",
        ReportFrequency::Yearly => "yearly",
    };
    let data = ReportTemplateData {
        name: &owner.display_name,
        frequency,
        period_label,
        income_total: summary.income_total,
        expense_total: summary.expense_total,
        balance: summary.balance,
        savings_rate: summary.savings_rate,
        top_categories: &summary.top_categories,
        transaction_count: summary.transaction_count,
    };
    Ok(EmailMessage {
        to: owner.email.clone(),
        subject: format!("Your {} financial report: {}", cadence, period_label),
        template_id: PERIODIC_REPORT_TEMPLATE.to_string(),
        template_data: serde_json::to_value(data)?,
    })
}

pub fn savings_alert_email(
    owner: &OwnerContact,
    salary: &FinancialEvent,
    goal_percentage: i32,
    expense_total_minor: i64,
    threshold_minor: i64,
) -> Result<EmailMessage> {
    let spendable_minor =
        salary.amount_minor - salary.amount_minor * goal_percentage as i64 / 100;
    let data = SavingsAlertTemplateData {
        name: &owner.display_name,
        salary_date: salary.date.format("%Y-%m-%d").to_string(),
        salary_amount: salary.amount(),
        savings_goal_percentage: goal_percentage,
        expense_total: to_major(expense_total_minor),
        alert_threshold: to_major(threshold_minor),
        remaining_budget: to_major(spendable_minor - expense_total_minor),
    };
    Ok(EmailMessage {
        to: owner.email.clone(),
        subject: format!(
            "Heads up: you've spent {}% of this pay period's budget",
            crate::money::percentage_of(expense_total_minor, spendable_minor.max(1)).round()
        ),
        template_id: SAVINGS_ALERT_TEMPLATE.to_string(),
        template_data: serde_json::to_value(data)?,
    })
}
