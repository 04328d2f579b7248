//! Schema migration by shallow merge
//!
//! The schema is append-only: a stored record is laid over the current
//! defaults key by key. New fields keep their defaults, removed fields
//! disappear, stored values are taken as-is with no type checks.
//!
//! Nested values are replaced wholesale, not merged. The current schema is
//! flat so this does not matter yet.

use crate::form::FormRecord;

/// Overlay `stored` onto `defaults`, keeping only keys of `defaults`
pub fn merge_onto_defaults(defaults: &FormRecord, mut stored: FormRecord) -> FormRecord {
    let merged: FormRecord = defaults
        .iter()
        .map(|(key, default)| {
            let value = stored.remove(key).unwrap_or_else(|| default.clone());
            (key.clone(), value)
        })
        .collect();

    if !stored.is_empty() {
        log::debug!(
            "Dropped {} stored field(s) no longer in the schema: {:?}",
            stored.len(),
            stored.keys().collect::<Vec<_>>()
        );
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn record(value: Value) -> FormRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_merge_legacy_example() {
        let defaults = record(json!({"a": 0, "b": "", "c": 0}));
        let stored = record(json!({"a": 1, "b": "x"}));

        let merged = merge_onto_defaults(&defaults, stored);
        assert_eq!(Value::Object(merged), json!({"a": 1, "b": "x", "c": 0}));
    }

    #[test]
    fn test_merge_drops_removed_fields() {
        let defaults = record(json!({"a": 0}));
        let stored = record(json!({"a": 2, "gone": "y"}));

        let merged = merge_onto_defaults(&defaults, stored);
        assert!(!merged.contains_key("gone"));
        assert_eq!(merged["a"], json!(2));
    }

    #[test]
    fn test_merge_keeps_invalid_values() {
        let defaults = record(json!({"step1Intensity": null}));
        let stored = record(json!({"step1Intensity": "stale"}));

        let merged = merge_onto_defaults(&defaults, stored);
        assert_eq!(merged["step1Intensity"], json!("stale"));
    }

    #[test]
    fn test_merge_replaces_nested_values_wholesale() {
        let defaults = record(json!({"nested": {"x": 1, "y": 2}}));
        let stored = record(json!({"nested": {"x": 5}}));

        let merged = merge_onto_defaults(&defaults, stored);
        assert_eq!(merged["nested"], json!({"x": 5}));
    }

    #[test]
    fn test_merge_empty_defaults() {
        let merged = merge_onto_defaults(&FormRecord::new(), record(json!({"a": 1})));
        assert!(merged.is_empty());
    }
}
