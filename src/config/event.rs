use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Deinstallation,
    Reinstallation,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Deinstallation => write!(f, "deinstallation"),
            EventKind::Reinstallation => write!(f, "reinstallation"),
        }
    }
}

/// A lifecycle event logged against a panel in events.toml.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PanelEvent {
    pub id: String,
    pub panel_id: String,
    pub kind: EventKind,
    /// `YYYY-MM-DD`
    pub date: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Wrapper matching the `[[events]]` layout of events.toml.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct EventLog {
    #[serde(default)]
    pub events: Vec<PanelEvent>,
}
