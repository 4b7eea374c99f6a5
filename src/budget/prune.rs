//! Falsy-value pruning for wire payloads.
//!
//! # Invariants
//! - Pruning is post-order: children are pruned before their parent is
//!   tested, so a map emptied by pruning is dropped as well.
//! - Array elements are never removed; an array is dropped only when empty.

use serde_json::{Map, Value};
use std::str::FromStr;

/// Which values the serializer treats as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PruneMode {
    /// Drop every falsy value: null, `""`, `[]`, `{}`, `0` and `false`.
    ///
    /// This is the behavior existing callers of the budgets payload rely on.
    /// Note that it silently drops `IncludeCredit: false` and zero periods.
    #[default]
    Compatible,
    /// Drop only nulls and empty strings/collections; keep `false` and zero.
    EmptyOnly,
}

impl PruneMode {
    fn drops(self, value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
            Value::Bool(b) => self == PruneMode::Compatible && !b,
            Value::Number(n) => self == PruneMode::Compatible && n.as_f64() == Some(0.0),
        }
    }
}

impl FromStr for PruneMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compatible" => Ok(PruneMode::Compatible),
            "empty-only" | "empty_only" => Ok(PruneMode::EmptyOnly),
            other => Err(format!(
                "unknown prune mode '{}' (expected 'compatible' or 'empty-only')",
                other
            )),
        }
    }
}

/// Recursively remove the keys `mode` considers absent.
pub fn prune_object(map: Map<String, Value>, mode: PruneMode) -> Map<String, Value> {
    map.into_iter()
        .filter_map(|(key, value)| {
            let value = prune_value(value, mode);
            (!mode.drops(&value)).then_some((key, value))
        })
        .collect()
}

fn prune_value(value: Value, mode: PruneMode) -> Value {
    match value {
        Value::Object(map) => Value::Object(prune_object(map, mode)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_compatible_drops_all_falsy() {
        let map = object(json!({
            "name": "",
            "count": 0,
            "flag": false,
            "list": [],
            "none": null,
            "kept": "x",
        }));
        let pruned = prune_object(map, PruneMode::Compatible);
        assert_eq!(Value::Object(pruned), json!({"kept": "x"}));
    }

    #[test]
    fn test_emptied_containers_are_dropped() {
        let map = object(json!({
            "outer": {"inner": {"flag": false}},
            "period": {"Start": null, "End": null},
        }));
        assert!(prune_object(map, PruneMode::Compatible).is_empty());
    }

    #[test]
    fn test_empty_only_keeps_scalars() {
        let map = object(json!({
            "CostTypes": {"IncludeCredit": false},
            "Threshold": 0,
            "Empty": {},
        }));
        let pruned = prune_object(map, PruneMode::EmptyOnly);
        assert_eq!(
            Value::Object(pruned),
            json!({"CostTypes": {"IncludeCredit": false}, "Threshold": 0})
        );
    }

    #[test]
    fn test_array_elements_untouched() {
        let map = object(json!({"Service": ["", "Amazon EC2"]}));
        let pruned = prune_object(map, PruneMode::Compatible);
        assert_eq!(Value::Object(pruned), json!({"Service": ["", "Amazon EC2"]}));
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!("compatible".parse(), Ok(PruneMode::Compatible));
        assert_eq!("Empty-Only".parse(), Ok(PruneMode::EmptyOnly));
        assert!("strict".parse::<PruneMode>().is_err());
    }
}
