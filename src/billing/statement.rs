use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::aggregator::{calculate_monthly_billing, BillingResult};
use super::period::BillingPeriod;
use crate::config::Roster;
use crate::status::{recompute_status, PanelStatus};

/// A billed panel together with its current status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementLine {
    #[serde(flatten)]
    pub billing: BillingResult,
    pub status: PanelStatus,
}

/// Billing for every panel of a roster in one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyStatement {
    pub period: BillingPeriod,
    pub lines: Vec<StatementLine>,
    pub total_billed_days: u32,
    pub total_amount: Decimal,
}

impl MonthlyStatement {
    /// Bill each panel in id order. A panel is listed when it has billed
    /// days or is currently installed.
    pub fn build(roster: &Roster, period: BillingPeriod, today: NaiveDate) -> Self {
        let lines: Vec<StatementLine> = roster
            .panels
            .iter()
            .map(|(id, record)| StatementLine {
                billing: calculate_monthly_billing(id, period, &roster.panels),
                status: recompute_status(id, record, roster.events_for(id), today).status,
            })
            .filter(|line| line.billing.billed_days > 0 || line.status == PanelStatus::Installed)
            .collect();

        let total_billed_days = lines.iter().map(|l| l.billing.billed_days).sum();
        let total_amount = lines.iter().map(|l| l.billing.amount).sum();

        tracing::info!(
            %period,
            panels = roster.panels.len(),
            billed = lines.len(),
            total = %total_amount,
            "monthly statement built"
        );

        Self {
            period,
            lines,
            total_billed_days,
            total_amount,
        }
    }
}
