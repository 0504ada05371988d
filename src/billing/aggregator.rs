use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::classifier::{has_inconsistent_order, is_billable};
use super::period::BillingPeriod;
use super::snapshot::PanelSnapshot;
use super::STANDARD_MONTH_DAYS;
use crate::config::{PanelRecord, Panels};

/// Billed days and amount for one panel-month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlyCharge {
    pub billed_days: u32,
    pub amount: Decimal,
}

/// Monthly billing summary for one panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillingResult {
    pub panel_id: String,
    pub year: i32,
    pub month: u32,
    pub billed_days: u32,
    pub total_days_in_month: u32,
    pub amount: Decimal,
    /// The full record, absent when the panel id was not found.
    pub panel: Option<PanelRecord>,
}

impl BillingResult {
    fn empty(panel_id: &str, period: BillingPeriod) -> Self {
        Self {
            panel_id: panel_id.to_string(),
            year: period.year(),
            month: period.month(),
            billed_days: 0,
            total_days_in_month: STANDARD_MONTH_DAYS,
            amount: Decimal::ZERO,
            panel: None,
        }
    }
}

/// Number of calendar days in `period` on which the panel is billable.
pub fn count_billable_days(snapshot: &PanelSnapshot, period: BillingPeriod) -> u32 {
    period
        .days()
        .filter(|day| {
            is_billable(
                *day,
                snapshot.install_date,
                snapshot.deinstall_date,
                snapshot.reinstall_date,
            )
        })
        .count() as u32
}

/// Normalise a raw day count against the 30-day standard month.
///
/// A panel active every day of the month bills exactly 30 days whatever
/// the month length; partial months keep their raw count.
pub fn normalize_billed_days(active_days: u32, days_in_month: u32) -> u32 {
    if active_days >= days_in_month {
        STANDARD_MONTH_DAYS
    } else {
        active_days
    }
}

/// `billed_days * monthly_rate / 30`, rounded to cents.
pub fn prorate(billed_days: u32, monthly_rate: Decimal) -> Decimal {
    let mut amount = (Decimal::from(billed_days) * monthly_rate
        / Decimal::from(STANDARD_MONTH_DAYS))
    .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    amount.rescale(2);
    amount
}

/// Charge for `snapshot` over `period`.
pub fn monthly_charge(snapshot: &PanelSnapshot, period: BillingPeriod) -> MonthlyCharge {
    if snapshot.install_date.is_none() {
        return MonthlyCharge {
            billed_days: 0,
            amount: Decimal::ZERO,
        };
    }

    let active_days = count_billable_days(snapshot, period);
    let billed_days = normalize_billed_days(active_days, period.days_in_month());

    MonthlyCharge {
        billed_days,
        amount: prorate(billed_days, snapshot.effective_rate()),
    }
}

/// Monthly billing for the panel `panel_id` in `panels`.
///
/// An unknown id yields a zero result with no panel attached.
pub fn calculate_monthly_billing(panel_id: &str, period: BillingPeriod, panels: &Panels) -> BillingResult {
    let Some(record) = panels.get(panel_id) else {
        tracing::debug!(panel = panel_id, %period, "panel not found, billing zero");
        return BillingResult::empty(panel_id, period);
    };

    let snapshot = PanelSnapshot::from(record);
    if has_inconsistent_order(snapshot.deinstall_date, snapshot.reinstall_date) {
        tracing::warn!(
            panel = panel_id,
            deinstall = ?snapshot.deinstall_date,
            reinstall = ?snapshot.reinstall_date,
            "reinstall precedes deinstall, billing through deinstall date only"
        );
    }

    let charge = monthly_charge(&snapshot, period);
    tracing::debug!(
        panel = panel_id,
        %period,
        billed_days = charge.billed_days,
        amount = %charge.amount,
        "computed monthly billing"
    );

    BillingResult {
        billed_days: charge.billed_days,
        amount: charge.amount,
        panel: Some(record.clone()),
        ..BillingResult::empty(panel_id, period)
    }
}
