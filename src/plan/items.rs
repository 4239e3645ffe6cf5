//! Cost and investment items that may decompose into child line items
//!
//! In the document every item carries an `amount` and an optional `children`
//! list. The parent amount is authoritative only while the item has no
//! children; as soon as one child exists the amount is derived. This module
//! turns that rule into a type so no consumer can read the stale parent field.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default)]
    pub name: String,
    pub amount: f64,
}

/// Amount of a cost or investment item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawItemAmount", into = "RawItemAmount")]
pub enum ItemAmount {
    Flat(f64),
    Composite(Vec<LineItem>),
}

impl ItemAmount {
    /// Amount every downstream consumer must use
    pub fn effective(&self) -> f64 {
        match self {
            ItemAmount::Flat(amount) => *amount,
            ItemAmount::Composite(children) => children.iter().map(|c| c.amount).sum(),
        }
    }

    pub fn children(&self) -> &[LineItem] {
        match self {
            ItemAmount::Flat(_) => &[],
            ItemAmount::Composite(children) => children,
        }
    }
}

impl Default for ItemAmount {
    fn default() -> Self {
        ItemAmount::Flat(0.0)
    }
}

/// Document shape of [`ItemAmount`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItemAmount {
    #[serde(default)]
    amount: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<LineItem>,
}

impl From<RawItemAmount> for ItemAmount {
    fn from(raw: RawItemAmount) -> Self {
        if raw.children.is_empty() {
            ItemAmount::Flat(raw.amount)
        } else {
            ItemAmount::Composite(raw.children)
        }
    }
}

impl From<ItemAmount> for RawItemAmount {
    fn from(amount: ItemAmount) -> Self {
        let total = amount.effective();
        match amount {
            ItemAmount::Flat(_) => RawItemAmount {
                amount: total,
                children: Vec::new(),
            },
            ItemAmount::Composite(children) => RawItemAmount {
                amount: total,
                children,
            },
        }
    }
}

/// Recurring monthly cost (rent, software, insurance...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedCost {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_month")]
    pub start_month: u32,
    #[serde(flatten)]
    pub amount: ItemAmount,
}

/// Cost proportional to revenue; the amount is a percent of revenue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableCost {
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub amount: ItemAmount,
}

/// Capital expenditure disbursed in a single project month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_month")]
    pub month: u32,
    /// Captured for the document; statements use the blended schedule
    #[serde(default = "default_amortization_years")]
    pub amortization_years: u32,
    #[serde(flatten)]
    pub amount: ItemAmount,
}

fn default_month() -> u32 {
    1
}

fn default_amortization_years() -> u32 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_children_override_parent_amount() {
        let cost: FixedCost = serde_json::from_value(json!({
            "name": "Office",
            "startMonth": 1,
            "amount": 9999.0,
            "children": [
                {"name": "Rent", "amount": 1200.0},
                {"name": "Utilities", "amount": 300.0}
            ]
        }))
        .unwrap();

        assert_eq!(cost.amount.effective(), 1500.0);
        assert_eq!(cost.amount.children().len(), 2);
    }

    #[test]
    fn test_parent_amount_used_without_children() {
        let cost: FixedCost = serde_json::from_value(json!({
            "name": "Software",
            "amount": 250.0,
            "children": []
        }))
        .unwrap();

        assert_eq!(cost.amount, ItemAmount::Flat(250.0));
        assert_eq!(cost.start_month, 1);
    }

    #[test]
    fn test_serialized_parent_amount_is_derived() {
        let investment = Investment {
            name: "Hardware".to_string(),
            month: 3,
            amortization_years: 3,
            amount: ItemAmount::Composite(vec![
                LineItem { name: "Laptops".to_string(), amount: 4000.0 },
                LineItem { name: "Servers".to_string(), amount: 6000.0 },
            ]),
        };

        let value = serde_json::to_value(&investment).unwrap();
        assert_eq!(value["amount"], json!(10000.0));
        assert_eq!(value["children"].as_array().map(|c| c.len()), Some(2));
        assert_eq!(value["amortizationYears"], json!(3));

        let back: Investment = serde_json::from_value(value).unwrap();
        assert_eq!(back, investment);
    }
}
