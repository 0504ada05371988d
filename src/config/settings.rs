use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub operator: Operator,
    #[serde(default)]
    pub billing: BillingSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Operator {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct BillingSettings {
    pub currency: String,
    pub currency_symbol: String,
}

impl Default for BillingSettings {
    fn default() -> Self {
        Self {
            currency: "EUR".to_string(),
            currency_symbol: "€".to_string(),
        }
    }
}
