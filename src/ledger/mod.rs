mod customer;
mod engine;
mod row;

pub use customer::{Customer, Summary, DEFAULT_ROWS_PER_CUSTOMER};
pub use engine::{CellAddress, EngineOptions, LedgerEngine, RowUpdate, DEFAULT_STORAGE_KEY};
pub use row::{coerce_number, placeholder_label, Field, Row, RowInputs};
