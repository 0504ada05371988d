use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt;

use crate::error::{BillingError, Result};

/// A calendar month being billed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BillingPeriod {
    year: i32,
    month: u32,
}

impl BillingPeriod {
    /// Build a period from a four-digit year and a 1-based month.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(BillingError::InvalidPeriod {
                year,
                month,
                reason: "month must be between 1 and 12",
            });
        }
        if !(1000..=9999).contains(&year) {
            return Err(BillingError::InvalidPeriod {
                year,
                month,
                reason: "year must have four digits",
            });
        }
        Ok(Self { year, month })
    }

    /// The period containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // year and month are range-checked on construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Actual number of calendar days in the month (28 to 31).
    pub fn days_in_month(&self) -> u32 {
        let first = self.first_day();
        let next = first
            .checked_add_months(chrono::Months::new(1))
            .unwrap_or(first);
        (next - first).num_days() as u32
    }

    /// Every day of the month in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let first = self.first_day();
        first.iter_days().take(self.days_in_month() as usize)
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first_day().format("%B %Y"))
    }
}
