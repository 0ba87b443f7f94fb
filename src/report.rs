//! Display strings for the terminal front end.

use tabled::{settings::Style, Table, Tabled};

use crate::ledger::{Customer, RowUpdate, Summary};

#[derive(Tabled)]
struct RowLine {
    #[tabled(rename = "#")]
    index: String,
    #[tabled(rename = "LABEL")]
    label: String,
    #[tabled(rename = "SOLD")]
    sold: String,
    #[tabled(rename = "RATE")]
    rate: String,
    #[tabled(rename = "TOTAL")]
    total: String,
    #[tabled(rename = "DED. 1")]
    deduction1: String,
    #[tabled(rename = "DED. 2")]
    deduction2: String,
    #[tabled(rename = "NET BILL")]
    net_bill: String,
}

#[derive(Tabled)]
struct CustomerLine {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "RUNNING BILL")]
    running_bill: String,
    #[tabled(rename = "OUTSTANDING")]
    outstanding: String,
}

/// Two decimals with the currency symbol in front of the digits
pub fn format_money(value: f64, currency_symbol: &str) -> String {
    let fixed = format!("{:.2}", value);
    match fixed.strip_prefix('-') {
        Some(digits) => format!("-{currency_symbol}{digits}"),
        None => format!("{currency_symbol}{fixed}"),
    }
}

/// Quantities print as plain numbers: `10`, `2.5`
pub fn format_count(value: f64) -> String {
    format!("{}", value)
}

pub fn render_customer(customer: &Customer, currency_symbol: &str) -> String {
    let money = |v: f64| format_money(v, currency_symbol);
    let summary = customer.summary();

    let mut lines: Vec<RowLine> = customer
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| RowLine {
            index: (i + 1).to_string(),
            label: row.display_label(i),
            sold: format_count(row.quantity_sold()),
            rate: format_count(row.rate()),
            total: money(row.total()),
            deduction1: format_count(row.deduction1()),
            deduction2: format_count(row.deduction2()),
            net_bill: money(row.net_bill()),
        })
        .collect();

    lines.push(RowLine {
        index: String::new(),
        label: "TOTAL".to_string(),
        sold: format_count(summary.total_sold),
        rate: String::new(),
        total: money(summary.total),
        deduction1: format_count(summary.total_deduction1),
        deduction2: format_count(summary.total_deduction2),
        net_bill: money(summary.total_net_bill),
    });

    let table = Table::new(lines).with(Style::rounded()).to_string();
    format!(
        "{} ({})\n{}\n{}",
        customer.name,
        customer.id,
        table,
        render_summary(&summary, currency_symbol)
    )
}

pub fn render_summary(summary: &Summary, currency_symbol: &str) -> String {
    format!(
        "Running bill: {}\nBalance:      {}\nOutstanding:  {}",
        format_money(summary.running_bill, currency_symbol),
        format_money(summary.balance, currency_symbol),
        format_money(summary.outstanding, currency_symbol),
    )
}

/// The derived cells of the changed row followed by the summary
pub fn render_update(update: &RowUpdate, currency_symbol: &str) -> String {
    format!(
        "Row {} ({}): total {}, net bill {}\n{}",
        update.row_index + 1,
        update.label,
        format_money(update.total, currency_symbol),
        format_money(update.net_bill, currency_symbol),
        render_summary(&update.summary, currency_symbol)
    )
}

pub fn render_customer_list(customers: &[Customer], currency_symbol: &str) -> String {
    let lines: Vec<CustomerLine> = customers
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let summary = c.summary();
            CustomerLine {
                index: i + 1,
                id: c.id.clone(),
                name: c.name.clone(),
                running_bill: format_money(summary.running_bill, currency_symbol),
                outstanding: format_money(summary.outstanding, currency_symbol),
            }
        })
        .collect();
    Table::new(lines).with(Style::rounded()).to_string()
}

/// Every customer's balances plus grand totals
pub fn render_report(customers: &[Customer], currency_symbol: &str) -> String {
    let (running_bill, outstanding) = customers.iter().fold((0.0, 0.0), |(r, o), c| {
        let summary = c.summary();
        (r + summary.running_bill, o + summary.outstanding)
    });

    format!(
        "{}\nCustomers:          {}\nTotal running bill: {}\nTotal outstanding:  {}",
        render_customer_list(customers, currency_symbol),
        customers.len(),
        format_money(running_bill, currency_symbol),
        format_money(outstanding, currency_symbol),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::RowInputs;

    fn sample() -> Customer {
        let mut customer = Customer::new("customer-1", "Acme", 3);
        customer.rows[0].apply(RowInputs::new(10.0, 5.0, 2.0, 3.0));
        customer.rows[1].apply(RowInputs::new(10.0, 5.0, 2.0, 3.0));
        customer.balance = -10.0;
        customer
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(50.0, ""), "50.00");
        assert_eq!(format_money(2.005, "$"), "$2.00");
        assert_eq!(format_money(-10.0, "$"), "-$10.00");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(10.0), "10");
        assert_eq!(format_count(2.5), "2.5");
    }

    #[test]
    fn test_render_customer() {
        let out = render_customer(&sample(), "");
        assert!(out.starts_with("Acme (customer-1)"));
        assert!(out.contains("Item 3"));
        assert!(out.contains("TOTAL"));
        assert!(out.contains("100.00"));
        assert!(out.contains("Running bill: 90.00"));
        assert!(out.contains("Outstanding:  80.00"));
    }

    #[test]
    fn test_render_report_totals() {
        let customers = vec![sample(), Customer::new("customer-2", "Empty", 2)];
        let out = render_report(&customers, "$");
        assert!(out.contains("Empty"));
        assert!(out.contains("Customers:          2"));
        assert!(out.contains("Total running bill: $90.00"));
        assert!(out.contains("Total outstanding:  $80.00"));
    }
}
