//! Day counting and prorated monthly billing.
//!
//! Every function here is pure: the same panel and month always give the
//! same ledger and the same amount.

pub mod aggregator;
pub mod classifier;
pub mod dates;
pub mod ledger;
pub mod period;
pub mod snapshot;
pub mod statement;

use rust_decimal::Decimal;

pub use aggregator::{calculate_monthly_billing, monthly_charge, BillingResult, MonthlyCharge};
pub use classifier::{is_billable, Lifecycle};
pub use dates::parse_lifecycle_date;
pub use ledger::{build_ledger, panel_history_for_month, DayRecord};
pub use period::BillingPeriod;
pub use snapshot::PanelSnapshot;
pub use statement::{MonthlyStatement, StatementLine};

/// Monthly rate applied when a panel has no usable rate of its own.
pub const DEFAULT_MONTHLY_RATE: Decimal = Decimal::from_parts(3770, 0, 0, false, 2);

/// Denominator of every proration, whatever the calendar month length.
pub const STANDARD_MONTH_DAYS: u32 = 30;
