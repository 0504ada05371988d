use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// A panel as stored in panels.toml. The table key is the panel id.
///
/// Only the lifecycle dates and the monthly rate matter for billing; any
/// extra columns carried over from spreadsheets are kept in `extra`.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct PanelRecord {
    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub install_date: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub deinstall_date: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub reinstall_date: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_rate",
        skip_serializing_if = "Option::is_none"
    )]
    pub monthly_rate: Option<MonthlyRate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub municipality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Date the record entered the roster, used as the status date of
    /// panels that were never installed.
    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub imported_on: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, toml::Value>,
}

/// Monthly rate as written by hand or exported from a spreadsheet.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum MonthlyRate {
    Amount(f64),
    Text(String),
}

impl MonthlyRate {
    /// The rate as a strictly positive decimal, if it is one.
    pub fn to_decimal(&self) -> Option<Decimal> {
        let value = match self {
            MonthlyRate::Amount(v) => Decimal::from_f64(*v)?,
            MonthlyRate::Text(s) => Decimal::from_str(s.trim()).ok()?,
        };
        (value > Decimal::ZERO).then_some(value)
    }
}

/// Accept quoted strings and native TOML dates alike. Values of any other
/// type are dropped so one bad cell never fails the whole roster.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<toml::Value>::deserialize(deserializer)? {
        Some(toml::Value::String(s)) => Some(s),
        Some(toml::Value::Datetime(dt)) => Some(dt.to_string()),
        Some(other) => {
            tracing::warn!(value = %other, "ignoring lifecycle date that is not a date");
            None
        }
        None => None,
    })
}

fn lenient_rate<'de, D>(deserializer: D) -> Result<Option<MonthlyRate>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<toml::Value>::deserialize(deserializer)? {
        Some(toml::Value::Float(v)) => Some(MonthlyRate::Amount(v)),
        Some(toml::Value::Integer(v)) => Some(MonthlyRate::Amount(v as f64)),
        Some(toml::Value::String(s)) => Some(MonthlyRate::Text(s)),
        Some(other) => {
            tracing::warn!(value = %other, "ignoring monthly rate that is not a number");
            None
        }
        None => None,
    })
}
