use chrono::NaiveDate;

/// How a panel's removal and reinstallation dates shape its active windows.
///
/// Deinstallation happens at 23:59 and reinstallation at 00:01, so both
/// boundary days are billable in every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Active from installation onward.
    Continuous,
    /// Reinstalled without a recorded removal: the reinstall supersedes the
    /// original installation.
    Replaced { reinstall: NaiveDate },
    /// Active from installation through the removal day.
    Removed { deinstall: NaiveDate },
    /// Removed and reinstalled on the same day: active from that day on,
    /// with no gap across it.
    SameDaySwap { on: NaiveDate },
    /// Removed, then reinstalled on a later day.
    Reinstalled {
        deinstall: NaiveDate,
        reinstall: NaiveDate,
    },
}

impl Lifecycle {
    pub fn from_dates(deinstall: Option<NaiveDate>, reinstall: Option<NaiveDate>) -> Self {
        match (deinstall, reinstall) {
            (None, None) => Lifecycle::Continuous,
            (None, Some(reinstall)) => Lifecycle::Replaced { reinstall },
            (Some(deinstall), None) => Lifecycle::Removed { deinstall },
            // reinstall before removal is inconsistent data; bill up to removal only
            (Some(deinstall), Some(reinstall)) if reinstall < deinstall => {
                Lifecycle::Removed { deinstall }
            }
            (Some(deinstall), Some(reinstall)) if reinstall == deinstall => {
                Lifecycle::SameDaySwap { on: reinstall }
            }
            (Some(deinstall), Some(reinstall)) => Lifecycle::Reinstalled {
                deinstall,
                reinstall,
            },
        }
    }

    /// Whether `day` falls in an active window, given it is on or after the
    /// install date.
    fn covers(&self, day: NaiveDate) -> bool {
        match *self {
            Lifecycle::Continuous => true,
            Lifecycle::Replaced { reinstall } => day >= reinstall,
            Lifecycle::Removed { deinstall } => day <= deinstall,
            Lifecycle::SameDaySwap { on } => day >= on,
            Lifecycle::Reinstalled {
                deinstall,
                reinstall,
            } => day <= deinstall || day >= reinstall,
        }
    }
}

/// Whether the panel is billable on `day`.
///
/// No install date means never billable, and no day before installation is
/// ever billable.
pub fn is_billable(
    day: NaiveDate,
    install: Option<NaiveDate>,
    deinstall: Option<NaiveDate>,
    reinstall: Option<NaiveDate>,
) -> bool {
    match install {
        Some(install) if day >= install => Lifecycle::from_dates(deinstall, reinstall).covers(day),
        _ => false,
    }
}

/// Whether the dates were recorded in an order the billing rules do not
/// model (reinstallation strictly before removal).
pub fn has_inconsistent_order(deinstall: Option<NaiveDate>, reinstall: Option<NaiveDate>) -> bool {
    matches!((deinstall, reinstall), (Some(d), Some(r)) if r < d)
}
