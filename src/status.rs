//! Current panel status derived from the install date and the event log.
//!
//! This is the explicit recompute step callers run after any lifecycle
//! change; nothing here watches the roster.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

use crate::billing::dates::{parse_lifecycle_date, parse_optional_date};
use crate::config::{EventKind, PanelEvent, PanelRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelStatus {
    Installed,
    Removed,
    PendingInstallation,
    Unknown,
}

impl PanelStatus {
    /// Human readable label used in notes and tables.
    pub fn label(&self) -> &'static str {
        match self {
            PanelStatus::Installed => "Installed",
            PanelStatus::Removed => "Removed",
            PanelStatus::PendingInstallation => "Pending installation",
            PanelStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for PanelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelStatus::Installed => write!(f, "INSTALLED"),
            PanelStatus::Removed => write!(f, "REMOVED"),
            PanelStatus::PendingInstallation => write!(f, "PENDING"),
            PanelStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    pub status: PanelStatus,
    pub last_status_update: NaiveDate,
}

/// Recompute a panel's status as of `today`.
///
/// `events` may contain entries for other panels; only those whose
/// `panel_id` is `panel_id` are applied.
pub fn recompute_status<'a, I>(
    panel_id: &str,
    panel: &PanelRecord,
    events: I,
    today: NaiveDate,
) -> StatusUpdate
where
    I: IntoIterator<Item = &'a PanelEvent>,
{
    let Some(install_date) = parse_optional_date(panel.install_date.as_deref()) else {
        return StatusUpdate {
            status: PanelStatus::Unknown,
            last_status_update: parse_optional_date(panel.imported_on.as_deref()).unwrap_or(today),
        };
    };

    let mut update = StatusUpdate {
        status: if install_date > today {
            PanelStatus::PendingInstallation
        } else {
            PanelStatus::Installed
        },
        last_status_update: install_date,
    };

    let mut applicable: Vec<(NaiveDate, EventKind)> = events
        .into_iter()
        .filter(|e| e.panel_id == panel_id)
        .filter_map(|e| match parse_lifecycle_date(&e.date) {
            Some(date) => Some((date, e.kind)),
            None => {
                tracing::warn!(event = %e.id, panel = panel_id, date = %e.date, "ignoring event with invalid date");
                None
            }
        })
        .filter(|(date, _)| *date <= today && *date >= install_date)
        .collect();
    // stable: same-day events keep their log order
    applicable.sort_by_key(|(date, _)| *date);

    for (date, kind) in applicable {
        update.status = match kind {
            EventKind::Deinstallation => PanelStatus::Removed,
            EventKind::Reinstallation => PanelStatus::Installed,
        };
        update.last_status_update = date;
    }

    update
}
