pub mod billing;
pub mod config;
pub mod error;
pub mod status;

pub use billing::{
    build_ledger, calculate_monthly_billing, panel_history_for_month, BillingPeriod,
    BillingResult, DayRecord, MonthlyStatement, PanelSnapshot,
};
pub use config::{PanelEvent, PanelRecord, Roster};
pub use error::{BillingError, Result};
pub use status::{recompute_status, PanelStatus, StatusUpdate};
