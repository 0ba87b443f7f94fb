use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Ledger already initialized: {0} exists")]
    AlreadyInitialized(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Customer '{0}' not found. Use 'ledger customers' to see available customers.")]
    CustomerNotFound(String),

    #[error("No customers in the ledger")]
    NoCustomers,

    #[error("Invalid row {index} for {customer} (only {count} row(s))")]
    RowOutOfRange {
        customer: String,
        index: usize,
        count: usize,
    },

    #[error("Unknown field '{0}'. Expected one of: label, sold, rate, deduction1, deduction2")]
    UnknownField(String),

    #[error("Malformed ledger document: {0}")]
    Document(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
