pub mod config;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod report;
pub mod store;

pub use config::{Config, DisplaySettings, LedgerSettings};
pub use error::{LedgerError, Result};
pub use ledger::{
    coerce_number, CellAddress, Customer, EngineOptions, Field, LedgerEngine, Row, RowInputs,
    RowUpdate, Summary,
};
pub use store::{FileStore, MemoryStore, Store};
