use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

use crate::error::LedgerError;

/// Coerce form-field text to a number.
///
/// Leading whitespace is skipped and the longest numeric prefix is parsed,
/// so `"12abc"` reads as `12`. Empty, unparsable, NaN or infinite input reads
/// as `0`. Never fails.
pub fn coerce_number(raw: &str) -> f64 {
    let prefix = numeric_prefix(raw.trim_start());
    prefix.parse::<f64>().map(finite_or_zero).unwrap_or(0.0)
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    // -0.0 collapses to 0.0 as well
    if value.is_finite() && value != 0.0 {
        value
    } else {
        0.0
    }
}

fn numeric_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        digits += j - frac_start;
        end = j;
    }

    if digits == 0 {
        return "";
    }

    // Exponent only counts when at least one digit follows it
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut j = end + 1;
        if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            end = j;
        }
    }

    &s[..end]
}

/// Accepts numbers, numeric strings, `null` or a missing key for a numeric
/// field of a persisted document.
pub(crate) fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64().map(finite_or_zero).unwrap_or(0.0),
        Some(serde_json::Value::String(s)) => coerce_number(&s),
        _ => 0.0,
    })
}

/// Like [`lenient_number`], but keeps "absent" (`null` or a missing key)
/// apart from an explicit value.
pub(crate) fn lenient_optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => Some(n.as_f64().map(finite_or_zero).unwrap_or(0.0)),
        Some(serde_json::Value::String(s)) => Some(coerce_number(&s)),
        _ => None,
    })
}

/// Accepts a string, a number (kept as its text) or `null` for a text field.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

/// Placeholder label for the row at a 0-based position
pub fn placeholder_label(index: usize) -> String {
    format!("Item {}", index + 1)
}

/// The four raw numeric inputs of a row
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RowInputs {
    pub quantity_sold: f64,
    pub rate: f64,
    pub deduction1: f64,
    pub deduction2: f64,
}

impl RowInputs {
    pub fn new(quantity_sold: f64, rate: f64, deduction1: f64, deduction2: f64) -> Self {
        Self {
            quantity_sold: finite_or_zero(quantity_sold),
            rate: finite_or_zero(rate),
            deduction1: finite_or_zero(deduction1),
            deduction2: finite_or_zero(deduction2),
        }
    }

    /// Build inputs from raw field text; absent fields read as 0.
    pub fn from_raw(
        quantity_sold: Option<&str>,
        rate: Option<&str>,
        deduction1: Option<&str>,
        deduction2: Option<&str>,
    ) -> Self {
        let coerce = |raw: Option<&str>| raw.map(coerce_number).unwrap_or(0.0);
        Self {
            quantity_sold: coerce(quantity_sold),
            rate: coerce(rate),
            deduction1: coerce(deduction1),
            deduction2: coerce(deduction2),
        }
    }
}

/// One billable line item.
///
/// `total` and `net_bill` are private and recomputed on every change to the
/// raw inputs, including deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredRow")]
pub struct Row {
    label: String,
    quantity_sold: f64,
    rate: f64,
    deduction1: f64,
    deduction2: f64,
    total: f64,
    net_bill: f64,
}

/// Raw row as found in a persisted document. Derived values in the document
/// are ignored. Aliases accept the older `company`/`sold`/`pwt`/`vc` keys.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRow {
    #[serde(default, alias = "company", deserialize_with = "lenient_string")]
    label: String,
    #[serde(default, alias = "sold", deserialize_with = "lenient_number")]
    quantity_sold: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    rate: f64,
    #[serde(default, alias = "pwt", deserialize_with = "lenient_number")]
    deduction1: f64,
    #[serde(default, alias = "vc", deserialize_with = "lenient_number")]
    deduction2: f64,
}

impl From<StoredRow> for Row {
    fn from(stored: StoredRow) -> Self {
        Row::new(
            stored.label,
            RowInputs {
                quantity_sold: stored.quantity_sold,
                rate: stored.rate,
                deduction1: stored.deduction1,
                deduction2: stored.deduction2,
            },
        )
    }
}

impl Row {
    pub fn new(label: impl Into<String>, inputs: RowInputs) -> Self {
        let mut row = Self {
            label: label.into(),
            quantity_sold: 0.0,
            rate: 0.0,
            deduction1: 0.0,
            deduction2: 0.0,
            total: 0.0,
            net_bill: 0.0,
        };
        row.apply(inputs);
        row
    }

    /// A zeroed row carrying the placeholder label for its position
    pub fn placeholder(index: usize) -> Self {
        Self::new(placeholder_label(index), RowInputs::default())
    }

    /// Replace the raw inputs and recompute the derived values
    pub fn apply(&mut self, inputs: RowInputs) {
        let inputs = RowInputs::new(
            inputs.quantity_sold,
            inputs.rate,
            inputs.deduction1,
            inputs.deduction2,
        );
        self.quantity_sold = inputs.quantity_sold;
        self.rate = inputs.rate;
        self.deduction1 = inputs.deduction1;
        self.deduction2 = inputs.deduction2;
        self.recompute();
    }

    /// Overflowing products and differences read as 0, like overflowing input
    pub fn recompute(&mut self) {
        self.total = finite_or_zero(self.quantity_sold * self.rate);
        self.net_bill = finite_or_zero(self.total - (self.deduction1 + self.deduction2));
    }

    /// Reset to the placeholder label and zero inputs
    pub fn clear(&mut self, index: usize) {
        self.label = placeholder_label(index);
        self.apply(RowInputs::default());
    }

    /// Apply raw text to one field. Numeric fields are coerced.
    pub fn update(&mut self, field: Field, raw: &str) {
        let mut inputs = self.inputs();
        match field {
            Field::Label => {
                self.label = raw.to_string();
                return;
            }
            Field::QuantitySold => inputs.quantity_sold = coerce_number(raw),
            Field::Rate => inputs.rate = coerce_number(raw),
            Field::Deduction1 => inputs.deduction1 = coerce_number(raw),
            Field::Deduction2 => inputs.deduction2 = coerce_number(raw),
        }
        self.apply(inputs);
    }

    pub fn inputs(&self) -> RowInputs {
        RowInputs {
            quantity_sold: self.quantity_sold,
            rate: self.rate,
            deduction1: self.deduction1,
            deduction2: self.deduction2,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The label, or the positional placeholder when the label is blank
    pub fn display_label(&self, index: usize) -> String {
        if self.label.trim().is_empty() {
            placeholder_label(index)
        } else {
            self.label.clone()
        }
    }

    pub fn quantity_sold(&self) -> f64 {
        self.quantity_sold
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn deduction1(&self) -> f64 {
        self.deduction1
    }

    pub fn deduction2(&self) -> f64 {
        self.deduction2
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn net_bill(&self) -> f64 {
        self.net_bill
    }
}

/// Editable cell of a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Label,
    QuantitySold,
    Rate,
    Deduction1,
    Deduction2,
}

impl FromStr for Field {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "label" | "company" => Ok(Field::Label),
            "sold" | "quantity" | "quantity-sold" => Ok(Field::QuantitySold),
            "rate" => Ok(Field::Rate),
            "deduction1" | "d1" | "pwt" => Ok(Field::Deduction1),
            "deduction2" | "d2" | "vc" => Ok(Field::Deduction2),
            _ => Err(LedgerError::UnknownField(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_plain_numbers() {
        assert_eq!(coerce_number("10"), 10.0);
        assert_eq!(coerce_number("  2.5"), 2.5);
        assert_eq!(coerce_number("-10"), -10.0);
        assert_eq!(coerce_number(".5"), 0.5);
        assert_eq!(coerce_number("1e3"), 1000.0);
    }

    #[test]
    fn test_coerce_takes_numeric_prefix() {
        assert_eq!(coerce_number("12abc"), 12.0);
        assert_eq!(coerce_number("3.5kg"), 3.5);
        assert_eq!(coerce_number("7e"), 7.0);
        assert_eq!(coerce_number("4.2.1"), 4.2);
    }

    #[test]
    fn test_coerce_garbage_is_zero() {
        assert_eq!(coerce_number(""), 0.0);
        assert_eq!(coerce_number("abc"), 0.0);
        assert_eq!(coerce_number("-"), 0.0);
        assert_eq!(coerce_number("."), 0.0);
        assert_eq!(coerce_number("NaN"), 0.0);
        assert_eq!(coerce_number("inf"), 0.0);
        assert_eq!(coerce_number("1e999"), 0.0);
        assert!(coerce_number("-0").is_sign_positive());
    }

    #[test]
    fn test_row_derived_values() {
        let row = Row::new("Widgets", RowInputs::new(10.0, 5.0, 2.0, 3.0));
        assert_eq!(row.total(), 50.0);
        assert_eq!(row.net_bill(), 45.0);
    }

    #[test]
    fn test_update_numeric_field_recomputes() {
        let mut row = Row::placeholder(0);
        row.update(Field::QuantitySold, "4");
        row.update(Field::Rate, "2.5");
        row.update(Field::Deduction2, "1");
        assert_eq!(row.total(), 10.0);
        assert_eq!(row.net_bill(), 9.0);

        row.update(Field::Rate, "");
        assert_eq!(row.rate(), 0.0);
        assert_eq!(row.total(), 0.0);
        assert_eq!(row.net_bill(), -1.0);
    }

    #[test]
    fn test_update_label_keeps_numbers() {
        let mut row = Row::new("Old", RowInputs::new(2.0, 3.0, 0.0, 0.0));
        row.update(Field::Label, "Milk");
        assert_eq!(row.label(), "Milk");
        assert_eq!(row.total(), 6.0);
    }

    #[test]
    fn test_clear_resets_row() {
        let mut row = Row::new("Milk", RowInputs::new(10.0, 5.0, 2.0, 3.0));
        row.clear(2);
        assert_eq!(row.label(), "Item 3");
        assert_eq!(row.inputs(), RowInputs::default());
        assert_eq!(row.total(), 0.0);
        assert_eq!(row.net_bill(), 0.0);
    }

    #[test]
    fn test_display_label_falls_back_to_placeholder() {
        let row = Row::new("  ", RowInputs::default());
        assert_eq!(row.display_label(4), "Item 5");
    }

    #[test]
    fn test_deserialize_ignores_stored_derived_values() {
        let json = r#"{"label":"Eggs","quantitySold":10,"rate":5,"deduction1":2,"deduction2":3,"total":999,"netBill":-1}"#;
        let row: Row = serde_json::from_str(json).unwrap();
        assert_eq!(row.total(), 50.0);
        assert_eq!(row.net_bill(), 45.0);
    }

    #[test]
    fn test_deserialize_tolerates_strings_and_nulls() {
        let json = r#"{"company":"Eggs","sold":"10","rate":"5x","pwt":null,"currentBill":12}"#;
        let row: Row = serde_json::from_str(json).unwrap();
        assert_eq!(row.label(), "Eggs");
        assert_eq!(row.inputs(), RowInputs::new(10.0, 5.0, 0.0, 0.0));
        assert_eq!(row.net_bill(), 50.0);
    }

    #[test]
    fn test_deserialize_null_label() {
        let json = r#"{"label":null,"quantitySold":2,"rate":3}"#;
        let row: Row = serde_json::from_str(json).unwrap();
        assert_eq!(row.label(), "");
        assert_eq!(row.display_label(0), "Item 1");
        assert_eq!(row.total(), 6.0);
    }

    #[test]
    fn test_overflowing_values_read_as_zero() {
        let row = Row::new("Big", RowInputs::new(1e200, 1e200, 0.0, 0.0));
        assert_eq!(row.total(), 0.0);
        assert_eq!(row.net_bill(), 0.0);

        let row = Row::new("Deductions", RowInputs::new(1.0, 1.0, 1e308, 1e308));
        assert_eq!(row.total(), 1.0);
        assert_eq!(row.net_bill(), 0.0);
        assert!(serde_json::to_string(&row).unwrap().contains("\"netBill\":0.0"));
    }

    #[test]
    fn test_field_from_str() {
        assert_eq!("sold".parse::<Field>().unwrap(), Field::QuantitySold);
        assert_eq!("Deduction1".parse::<Field>().unwrap(), Field::Deduction1);
        assert_eq!("vc".parse::<Field>().unwrap(), Field::Deduction2);
        assert!("price".parse::<Field>().is_err());
    }
}
