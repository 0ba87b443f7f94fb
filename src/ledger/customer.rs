use serde::{Deserialize, Serialize};

use super::row::{lenient_optional_number, lenient_string, Row};

/// Number of rows a new customer starts with
pub const DEFAULT_ROWS_PER_CUSTOMER: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredCustomer")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub rows: Vec<Row>,
    /// Carried-forward adjustment added to the running bill
    pub balance: f64,
}

/// Customer as found in a persisted document. Older documents keep the
/// name under `customerName` and the balance under `summary.balance`; a
/// top-level `balance` wins when both are present.
#[derive(Deserialize)]
struct StoredCustomer {
    #[serde(default, deserialize_with = "lenient_string")]
    id: String,
    #[serde(default, alias = "customerName", deserialize_with = "lenient_string")]
    name: String,
    #[serde(default)]
    rows: Option<Vec<Row>>,
    #[serde(default, deserialize_with = "lenient_optional_number")]
    balance: Option<f64>,
    #[serde(default)]
    summary: Option<StoredSummary>,
}

#[derive(Deserialize)]
struct StoredSummary {
    #[serde(default, deserialize_with = "lenient_optional_number")]
    balance: Option<f64>,
}

impl From<StoredCustomer> for Customer {
    fn from(stored: StoredCustomer) -> Self {
        let balance = stored
            .balance
            .or_else(|| stored.summary.and_then(|s| s.balance))
            .unwrap_or(0.0);
        Self {
            id: stored.id,
            name: stored.name,
            rows: stored.rows.unwrap_or_default(),
            balance,
        }
    }
}

impl Customer {
    /// A customer with `row_count` zeroed placeholder rows and no balance
    pub fn new(id: impl Into<String>, name: impl Into<String>, row_count: usize) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rows: (0..row_count).map(Row::placeholder).collect(),
            balance: 0.0,
        }
    }

    pub fn summary(&self) -> Summary {
        Summary::of(&self.rows, self.balance)
    }

    pub fn recompute(&mut self) {
        for row in &mut self.rows {
            row.recompute();
        }
    }
}

/// Column sums and balances derived from a customer's rows
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub total_sold: f64,
    pub total: f64,
    pub total_deduction1: f64,
    pub total_deduction2: f64,
    pub total_net_bill: f64,
    pub running_bill: f64,
    pub balance: f64,
    pub outstanding: f64,
}

impl Summary {
    pub fn of(rows: &[Row], balance: f64) -> Self {
        let mut summary = rows.iter().fold(Summary::default(), |mut acc, row| {
            acc.total_sold += row.quantity_sold();
            acc.total += row.total();
            acc.total_deduction1 += row.deduction1();
            acc.total_deduction2 += row.deduction2();
            acc.total_net_bill += row.net_bill();
            acc
        });
        summary.running_bill = summary.total_net_bill;
        summary.balance = balance;
        summary.outstanding = summary.running_bill + balance;
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::row::RowInputs;

    #[test]
    fn test_new_customer_has_placeholder_rows() {
        let customer = Customer::new("customer-1", "Acme", DEFAULT_ROWS_PER_CUSTOMER);
        assert_eq!(customer.rows.len(), 7);
        assert_eq!(customer.rows[0].label(), "Item 1");
        assert_eq!(customer.rows[6].label(), "Item 7");
        assert_eq!(customer.balance, 0.0);
        assert_eq!(customer.summary(), Summary::default());
    }

    #[test]
    fn test_summary_sums_columns() {
        let mut customer = Customer::new("customer-1", "Acme", 3);
        customer.rows[0].apply(RowInputs::new(10.0, 5.0, 2.0, 3.0));
        customer.rows[1].apply(RowInputs::new(10.0, 5.0, 2.0, 3.0));
        customer.balance = -10.0;

        let summary = customer.summary();
        assert_eq!(summary.total_sold, 20.0);
        assert_eq!(summary.total, 100.0);
        assert_eq!(summary.total_deduction1, 4.0);
        assert_eq!(summary.total_deduction2, 6.0);
        assert_eq!(summary.running_bill, 90.0);
        assert_eq!(summary.outstanding, 80.0);
    }

    #[test]
    fn test_deserialize_reads_balance_from_legacy_summary() {
        let json = r#"{"id":"customer-1","customerName":"Old",
            "summary":{"balance":-10,"runningBill":45,"outstanding":35},
            "rows":[{"company":"A","sold":10,"rate":5,"pwt":2,"vc":3}]}"#;
        let customer: Customer = serde_json::from_str(json).unwrap();
        assert_eq!(customer.balance, -10.0);
        assert_eq!(customer.summary().outstanding, 35.0);
    }

    #[test]
    fn test_top_level_balance_wins_over_summary() {
        let json = r#"{"id":"c","name":"N","balance":4,"summary":{"balance":-10},"rows":[]}"#;
        let customer: Customer = serde_json::from_str(json).unwrap();
        assert_eq!(customer.balance, 4.0);
    }

    #[test]
    fn test_deserialize_tolerates_null_text_and_rows() {
        let json = r#"{"id":7,"name":null,"rows":null,"balance":null}"#;
        let customer: Customer = serde_json::from_str(json).unwrap();
        assert_eq!(customer.id, "7");
        assert_eq!(customer.name, "");
        assert!(customer.rows.is_empty());
        assert_eq!(customer.balance, 0.0);
    }

    #[test]
    fn test_deserialize_accepts_legacy_name_and_string_balance() {
        let json = r#"{"id":"customer-9","customerName":"Old","rows":[],"balance":"12.5"}"#;
        let customer: Customer = serde_json::from_str(json).unwrap();
        assert_eq!(customer.name, "Old");
        assert_eq!(customer.balance, 12.5);
    }
}
