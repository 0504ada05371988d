use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::dates::parse_optional_date;
use super::DEFAULT_MONTHLY_RATE;
use crate::config::PanelRecord;

/// The narrow, validated view of a panel the engine works on.
///
/// Invalid date strings and non-positive rates have already been dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanelSnapshot {
    pub install_date: Option<NaiveDate>,
    pub deinstall_date: Option<NaiveDate>,
    pub reinstall_date: Option<NaiveDate>,
    pub monthly_rate: Option<Decimal>,
}

impl PanelSnapshot {
    /// The panel's rate, or the default rate when none is usable.
    pub fn effective_rate(&self) -> Decimal {
        self.monthly_rate
            .filter(|rate| *rate > Decimal::ZERO)
            .unwrap_or(DEFAULT_MONTHLY_RATE)
    }
}

impl From<&PanelRecord> for PanelSnapshot {
    fn from(record: &PanelRecord) -> Self {
        Self {
            install_date: parse_optional_date(record.install_date.as_deref()),
            deinstall_date: parse_optional_date(record.deinstall_date.as_deref()),
            reinstall_date: parse_optional_date(record.reinstall_date.as_deref()),
            monthly_rate: record.monthly_rate.as_ref().and_then(|r| r.to_decimal()),
        }
    }
}
