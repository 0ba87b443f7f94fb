use serde::{Deserialize, Serialize};

use crate::ledger::{EngineOptions, DEFAULT_ROWS_PER_CUSTOMER, DEFAULT_STORAGE_KEY};

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub ledger: LedgerSettings,
    #[serde(default)]
    pub display: DisplaySettings,
}

impl Config {
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            rows_per_customer: self.ledger.rows_per_customer,
            storage_key: self.ledger.storage_key.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LedgerSettings {
    #[serde(default = "default_rows_per_customer")]
    pub rows_per_customer: usize,
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            rows_per_customer: default_rows_per_customer(),
            storage_key: default_storage_key(),
        }
    }
}

fn default_rows_per_customer() -> usize {
    DEFAULT_ROWS_PER_CUSTOMER
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct DisplaySettings {
    #[serde(default)]
    pub currency_symbol: String,
}
