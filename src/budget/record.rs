//! Budgets as returned by the describe calls.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::notification::NotificationRule;

/// An amount/unit pair as the provider reports it. `Amount` is a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Spend {
    pub amount: String,
    pub unit: String,
}

impl Spend {
    pub fn amount_value(&self) -> Option<Decimal> {
        self.amount.trim().parse().ok()
    }
}

/// A budget definition read back from the provider.
///
/// Only the fields this crate writes are typed. Everything else the
/// provider returns (calculated spend, last-updated time, ...) is kept in
/// `extra` and re-serialized unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BudgetRecord {
    pub budget_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_limit: Option<Spend>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub cost_filters: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_types: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_period: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_adjust_data: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A budget together with its notification rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetWithNotifications {
    #[serde(flatten)]
    pub budget: BudgetRecord,
    #[serde(rename = "Notifications", default)]
    pub notifications: Vec<NotificationRule>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_keeps_unknown_fields() {
        let record: BudgetRecord = serde_json::from_value(json!({
            "BudgetName": "team-alpha",
            "BudgetType": "COST",
            "TimeUnit": "MONTHLY",
            "BudgetLimit": {"Amount": "150.0", "Unit": "USD"},
            "CalculatedSpend": {"ActualSpend": {"Amount": "12.3", "Unit": "USD"}},
        }))
        .unwrap();

        assert_eq!(record.budget_limit.as_ref().unwrap().amount_value(), Some(Decimal::new(1500, 1)));
        assert!(record.extra.contains_key("CalculatedSpend"));

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["CalculatedSpend"]["ActualSpend"]["Amount"], "12.3");
    }

    #[test]
    fn test_enriched_budget_serializes_flat() {
        let enriched = BudgetWithNotifications {
            budget: serde_json::from_value(json!({"BudgetName": "b"})).unwrap(),
            notifications: vec![NotificationRule::actual_over_percent(90.0)],
        };
        let value = serde_json::to_value(&enriched).unwrap();
        assert_eq!(value["BudgetName"], "b");
        assert_eq!(value["Notifications"][0]["Threshold"], json!(90.0));
    }
}
