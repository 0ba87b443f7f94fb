use std::collections::HashSet;

use tracing::{debug, info, warn};

use super::customer::{Customer, Summary, DEFAULT_ROWS_PER_CUSTOMER};
use super::row::{finite_or_zero, Field, Row, RowInputs};
use crate::error::{LedgerError, Result};
use crate::store::Store;

/// Storage key the customer set is written under
pub const DEFAULT_STORAGE_KEY: &str = "customers";

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub rows_per_customer: usize,
    pub storage_key: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            rows_per_customer: DEFAULT_ROWS_PER_CUSTOMER,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

/// Typed address of one editable cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellAddress {
    pub customer_id: String,
    /// 0-based
    pub row_index: usize,
    pub field: Field,
}

/// What the presentation layer has to re-render after a row changes
#[derive(Debug, Clone, PartialEq)]
pub struct RowUpdate {
    pub customer_id: String,
    pub row_index: usize,
    pub label: String,
    pub total: f64,
    pub net_bill: f64,
    pub summary: Summary,
}

/// Owns the customer set and writes it through to a [`Store`] after every
/// mutation.
pub struct LedgerEngine<S: Store> {
    store: S,
    options: EngineOptions,
    customers: Vec<Customer>,
}

impl<S: Store> LedgerEngine<S> {
    /// Load the customer set from `store`.
    ///
    /// A missing or empty document is replaced by a fresh set holding one
    /// default customer, which is persisted right away. An unreadable
    /// document is copied to `<storage_key>.unreadable` and left in place;
    /// the default set only overwrites it on the first mutation.
    pub fn open(store: S, options: EngineOptions) -> Result<Self> {
        let mut engine = Self {
            store,
            options,
            customers: Vec::new(),
        };

        let key = engine.options.storage_key.clone();
        let mut persist_default = true;
        if let Some(blob) = engine.store.get(&key)? {
            match Self::deserialize(&blob) {
                Ok(customers) if !customers.is_empty() => {
                    debug!(count = customers.len(), "loaded customers");
                    engine.customers = customers;
                    engine.normalize_customers();
                    return Ok(engine);
                }
                Ok(_) => warn!("stored ledger has no customers, starting fresh"),
                Err(e) => {
                    let backup = format!("{key}.unreadable");
                    warn!(error = %e, backup = %backup, "stored ledger is unreadable, starting fresh");
                    engine.store.set(&backup, &blob)?;
                    persist_default = false;
                }
            }
        }

        let customer = engine.new_customer("");
        info!(id = %customer.id, "created default customer");
        engine.customers.push(customer);
        if persist_default {
            engine.persist()?;
        }

        Ok(engine)
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn customer(&self, customer_id: &str) -> Result<&Customer> {
        self.customers
            .iter()
            .find(|c| c.id == customer_id)
            .ok_or_else(|| LedgerError::CustomerNotFound(customer_id.to_string()))
    }

    pub fn first_customer(&self) -> Result<&Customer> {
        self.customers.first().ok_or(LedgerError::NoCustomers)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replace a row's four raw inputs and recompute it
    pub fn recalculate_row(
        &mut self,
        customer_id: &str,
        row_index: usize,
        inputs: RowInputs,
    ) -> Result<RowUpdate> {
        row_mut(self.customer_mut(customer_id)?, row_index)?.apply(inputs);
        debug!(customer = customer_id, row = row_index, ?inputs, "recalculated row");
        self.commit_row(customer_id, row_index)
    }

    pub fn recalculate_summary(&self, customer_id: &str) -> Result<Summary> {
        Ok(self.customer(customer_id)?.summary())
    }

    pub fn clear_row(&mut self, customer_id: &str, row_index: usize) -> Result<RowUpdate> {
        row_mut(self.customer_mut(customer_id)?, row_index)?.clear(row_index);
        debug!(customer = customer_id, row = row_index, "cleared row");
        self.commit_row(customer_id, row_index)
    }

    /// Apply raw field text to one cell. Numeric fields coerce to 0 on bad
    /// input; the label is stored verbatim.
    pub fn update_cell(&mut self, address: &CellAddress, raw: &str) -> Result<RowUpdate> {
        let customer_id = address.customer_id.as_str();
        row_mut(self.customer_mut(customer_id)?, address.row_index)?.update(address.field, raw);
        debug!(
            customer = customer_id,
            row = address.row_index,
            field = ?address.field,
            "updated cell"
        );
        self.commit_row(customer_id, address.row_index)
    }

    pub fn set_balance(&mut self, customer_id: &str, value: f64) -> Result<Summary> {
        let customer = self.customer_mut(customer_id)?;
        customer.balance = finite_or_zero(value);
        debug!(customer = customer_id, balance = customer.balance, "set balance");
        self.commit(customer_id)
    }

    pub fn rename_customer(&mut self, customer_id: &str, name: &str) -> Result<()> {
        self.customer_mut(customer_id)?.name = name.to_string();
        self.persist()
    }

    /// Add a customer with zeroed placeholder rows. A blank name becomes
    /// `Customer {n}`.
    pub fn create_customer(&mut self, name: &str) -> Result<&Customer> {
        let customer = self.new_customer(name);
        info!(id = %customer.id, name = %customer.name, "created customer");
        self.customers.push(customer);
        self.persist()?;
        self.customers.last().ok_or(LedgerError::NoCustomers)
    }

    /// Replace the whole customer set, e.g. from an imported document
    pub fn replace_customers(&mut self, mut customers: Vec<Customer>) -> Result<()> {
        if customers.is_empty() {
            customers.push(self.new_customer(""));
        }
        for customer in &mut customers {
            customer.recompute();
        }
        self.customers = customers;
        self.normalize_customers();
        info!(count = self.customers.len(), "replaced customer set");
        self.persist()
    }

    pub fn serialize(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.customers)?)
    }

    /// Parse a serialized customer set. Row totals are recomputed from the
    /// raw inputs while parsing.
    pub fn deserialize(blob: &str) -> Result<Vec<Customer>> {
        Ok(serde_json::from_str(blob)?)
    }

    fn new_customer(&self, name: &str) -> Customer {
        let name = match name.trim() {
            "" => format!("Customer {}", self.customers.len() + 1),
            _ => name.to_string(),
        };
        Customer::new(self.next_id(), name, self.options.rows_per_customer)
    }

    fn next_id(&self) -> String {
        let taken: HashSet<String> = self.customers.iter().map(|c| c.id.clone()).collect();
        unused_id(&taken)
    }

    /// Give blank or repeated ids a fresh id and blank names a default name,
    /// so every customer stays addressable.
    fn normalize_customers(&mut self) {
        let mut taken: HashSet<String> = self.customers.iter().map(|c| c.id.clone()).collect();
        let mut seen: HashSet<String> = HashSet::new();
        for (i, customer) in self.customers.iter_mut().enumerate() {
            if customer.id.trim().is_empty() || !seen.insert(customer.id.clone()) {
                let fresh = unused_id(&taken);
                warn!(old = %customer.id, new = %fresh, "reassigned customer id");
                taken.insert(fresh.clone());
                seen.insert(fresh.clone());
                customer.id = fresh;
            }
            if customer.name.trim().is_empty() {
                customer.name = format!("Customer {}", i + 1);
            }
        }
    }

    fn customer_mut(&mut self, customer_id: &str) -> Result<&mut Customer> {
        self.customers
            .iter_mut()
            .find(|c| c.id == customer_id)
            .ok_or_else(|| LedgerError::CustomerNotFound(customer_id.to_string()))
    }

    fn commit(&mut self, customer_id: &str) -> Result<Summary> {
        self.persist()?;
        self.recalculate_summary(customer_id)
    }

    fn commit_row(&mut self, customer_id: &str, row_index: usize) -> Result<RowUpdate> {
        let summary = self.commit(customer_id)?;
        let row = &self.customer(customer_id)?.rows[row_index];
        Ok(RowUpdate {
            customer_id: customer_id.to_string(),
            row_index,
            label: row.display_label(row_index),
            total: row.total(),
            net_bill: row.net_bill(),
            summary,
        })
    }

    fn persist(&mut self) -> Result<()> {
        let blob = self.serialize()?;
        self.store.set(&self.options.storage_key, &blob)
    }
}

fn unused_id(taken: &HashSet<String>) -> String {
    let mut stamp = chrono::Utc::now().timestamp_millis();
    loop {
        let id = format!("customer-{stamp}");
        if !taken.contains(&id) {
            return id;
        }
        stamp += 1;
    }
}

fn row_mut(customer: &mut Customer, row_index: usize) -> Result<&mut Row> {
    let count = customer.rows.len();
    if row_index >= count {
        return Err(LedgerError::RowOutOfRange {
            customer: customer.id.clone(),
            index: row_index + 1,
            count,
        });
    }
    Ok(&mut customer.rows[row_index])
}
