mod event;
mod panel;
mod settings;

pub use event::{EventKind, EventLog, PanelEvent};
pub use panel::{MonthlyRate, PanelRecord};
pub use settings::{BillingSettings, Config, Operator};

use crate::error::{BillingError, Result};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Panel records keyed by panel id.
pub type Panels = BTreeMap<String, PanelRecord>;

/// Everything the billing commands read from the config directory.
#[derive(Debug, Default)]
pub struct Roster {
    pub panels: Panels,
    pub events: Vec<PanelEvent>,
}

impl Roster {
    /// Events logged against one panel, in file order.
    pub fn events_for<'a>(&'a self, panel_id: &'a str) -> impl Iterator<Item = &'a PanelEvent> {
        self.events.iter().filter(move |e| e.panel_id == panel_id)
    }
}

/// Get the config directory path (XDG config dir, or ~/.piv/)
pub fn config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "piv") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    let home = std::env::var_os("HOME").map(PathBuf::from).ok_or_else(|| {
        BillingError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".piv"))
}

fn load_toml<T: DeserializeOwned>(path: PathBuf) -> Result<T> {
    if !path.exists() {
        return Err(BillingError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    tracing::debug!(path = %path.display(), "loading config file");
    toml::from_str(&content).map_err(|e| BillingError::ConfigParse { path, source: e })
}

/// Load the main config.toml
pub fn load_config(config_dir: &Path) -> Result<Config> {
    load_toml(config_dir.join("config.toml"))
}

/// Load panels.toml as a map keyed by panel id
pub fn load_panels(config_dir: &Path) -> Result<Panels> {
    load_toml(config_dir.join("panels.toml"))
}

/// Load events.toml (empty log if missing)
pub fn load_events(config_dir: &Path) -> Result<Vec<PanelEvent>> {
    let path = config_dir.join("events.toml");
    if !path.exists() {
        return Ok(Vec::new());
    }
    let log: EventLog = load_toml(path)?;
    Ok(log.events)
}

/// Load panels and events together
pub fn load_roster(config_dir: &Path) -> Result<Roster> {
    let panels = load_panels(config_dir)?;
    let events = load_events(config_dir)?;
    tracing::debug!(panels = panels.len(), events = events.len(), "roster loaded");
    Ok(Roster { panels, events })
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[operator]
name = "Your Company Name"
# email = "billing@yourcompany.com"   # optional

[billing]
currency = "EUR"
currency_symbol = "€"
"#;

/// Template content for panels.toml
pub const PANELS_TEMPLATE: &str = r#"# One table per panel. The table name (e.g., ["P001"]) is the panel id
# used by the ledger command.
#
# Dates are "YYYY-MM-DD" strings or bare TOML dates:
#   install_date    first installation (required for billing)
#   deinstall_date  removal, effective at 23:59 (that day is billed)
#   reinstall_date  reinstallation, effective at 00:01 (that day is billed)
#
# monthly_rate defaults to 37.70 when missing or not a positive number.
# Any other column is kept as-is and ignored by billing.
#
# Example:
#   piv ledger P001 --year 2024 --month 1

["P001"]
install_date = "2024-01-01"
monthly_rate = 37.70
client = "Example Transit Authority"
municipality = "Example City"
address = "1 Main Street"

["P002"]
install_date = "2024-01-01"
deinstall_date = "2024-01-10"
reinstall_date = "2024-01-20"
monthly_rate = 30.00
client = "Example Transit Authority"
municipality = "Example City"
"#;

/// Template content for events.toml
pub const EVENTS_TEMPLATE: &str = r#"# Lifecycle events used to recompute each panel's current status.
# kind is "deinstallation" or "reinstallation".

[[events]]
id = "E001"
panel_id = "P002"
kind = "deinstallation"
date = "2024-01-10"

[[events]]
id = "E002"
panel_id = "P002"
kind = "reinstallation"
date = "2024-01-20"
notes = "Relocated after road works"
"#;
