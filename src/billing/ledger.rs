use chrono::NaiveDate;
use serde::Serialize;

use super::classifier::{has_inconsistent_order, is_billable};
use super::period::BillingPeriod;
use super::snapshot::PanelSnapshot;
use crate::config::Panels;
use crate::status::PanelStatus;

/// One calendar day of a panel's billing month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub is_billable: bool,
    pub status: PanelStatus,
    pub note: String,
}

/// Build the day-by-day ledger of `snapshot` for `period`.
///
/// `today` only decides whether days before installation read as pending
/// or unknown; it never changes what is billable.
pub fn build_ledger(snapshot: &PanelSnapshot, period: BillingPeriod, today: NaiveDate) -> Vec<DayRecord> {
    let PanelSnapshot {
        install_date,
        deinstall_date,
        reinstall_date,
        ..
    } = *snapshot;

    period
        .days()
        .map(|day| {
            let billable = is_billable(day, install_date, deinstall_date, reinstall_date);
            let status = match install_date {
                None => PanelStatus::Unknown,
                Some(install) if day < install && install > today => PanelStatus::PendingInstallation,
                Some(install) if day < install => PanelStatus::Unknown,
                Some(_) if billable => PanelStatus::Installed,
                Some(_) => PanelStatus::Removed,
            };

            DayRecord {
                date: day,
                is_billable: billable,
                status,
                note: day_note(day, snapshot, status, billable),
            }
        })
        .collect()
}

fn day_note(day: NaiveDate, snapshot: &PanelSnapshot, status: PanelStatus, billable: bool) -> String {
    let base = match (status, snapshot.install_date) {
        (PanelStatus::PendingInstallation, Some(install)) => {
            format!("{} (scheduled {})", status.label(), install)
        }
        _ => status.label().to_string(),
    };
    let full_day = format!("{}, full day billable", PanelStatus::Installed.label());

    if Some(day) == snapshot.reinstall_date {
        if has_inconsistent_order(snapshot.deinstall_date, snapshot.reinstall_date) {
            return format!("PIV reinstall dated before removal, ignored ({base})");
        }
        return match (billable, snapshot.deinstall_date.is_some()) {
            (true, true) => format!("PIV reinstalled at 00:01 ({full_day})"),
            (true, false) => {
                format!("PIV reinstalled at 00:01, replaces original installation ({full_day})")
            }
            (false, _) => format!("PIV reinstalled at 00:01 ({base})"),
        };
    }
    if Some(day) == snapshot.deinstall_date {
        return if billable {
            format!("PIV removed at 23:59 ({full_day})")
        } else {
            format!("PIV removed at 23:59 ({base})")
        };
    }
    if Some(day) == snapshot.install_date {
        return format!("PIV installed ({base})");
    }
    base
}

/// Ledger for the panel `panel_id` in `panels`; empty when the id is unknown.
pub fn panel_history_for_month(
    panel_id: &str,
    period: BillingPeriod,
    panels: &Panels,
    today: NaiveDate,
) -> Vec<DayRecord> {
    match panels.get(panel_id) {
        Some(record) => build_ledger(&PanelSnapshot::from(record), period, today),
        None => Vec::new(),
    }
}
