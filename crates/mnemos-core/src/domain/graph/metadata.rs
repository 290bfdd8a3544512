//! Open metadata bags and their merge rules
//!
//! Knowledge items, nodes, and relationships all carry an open metadata bag
//! for caller data the core does not model. Rather than inspecting runtime
//! types ad hoc, the bag values form a small closed union with one explicit
//! merge rule per kind. [`MetaValue::Opaque`] is the escape hatch for
//! unmodeled caller data and always resolves first-wins.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A metadata bag: caller-defined keys mapped to [`MetaValue`]s.
pub type MetaBag = BTreeMap<String, MetaValue>;

/// A value in an open metadata bag
///
/// Untagged on the wire, so bags round-trip as plain JSON objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    /// Boolean flag
    Flag(bool),
    /// Numeric value
    Number(f64),
    /// Text value
    Text(String),
    /// Ordered list of values; lists concatenate on merge
    List(Vec<MetaValue>),
    /// String-keyed mapping; mappings shallow-merge on merge
    Map(MetaBag),
    /// Unmodeled caller data; always resolves first-wins on merge
    Opaque(serde_json::Value),
}

impl MetaValue {
    /// Merge a second value into this one, returning the survivor
    ///
    /// Two Lists concatenate; two Maps shallow-merge with the second's keys
    /// overriding on overlap. Every other combination keeps the first value
    /// unchanged.
    pub fn merged_with(&self, second: &MetaValue) -> MetaValue {
        match (self, second) {
            (Self::List(first), Self::List(other)) => {
                let mut combined = first.clone();
                combined.extend(other.iter().cloned());
                Self::List(combined)
            }
            (Self::Map(first), Self::Map(other)) => {
                let mut combined = first.clone();
                for (key, value) in other {
                    combined.insert(key.clone(), value.clone());
                }
                Self::Map(combined)
            }
            _ => self.clone(),
        }
    }

    /// Check whether merging with `second` would change this value
    pub fn combines_with(&self, second: &MetaValue) -> bool {
        matches!(
            (self, second),
            (Self::List(_), Self::List(_)) | (Self::Map(_), Self::Map(_))
        )
    }
}

impl From<bool> for MetaValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<f64> for MetaValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for MetaValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<MetaValue>> for MetaValue {
    fn from(values: Vec<MetaValue>) -> Self {
        Self::List(values)
    }
}

impl From<serde_json::Value> for MetaValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Bool(flag) => Self::Flag(flag),
            serde_json::Value::Number(number) => match number.as_f64() {
                Some(value) => Self::Number(value),
                None => Self::Opaque(serde_json::Value::Number(number)),
            },
            serde_json::Value::String(text) => Self::Text(text),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, value.into()))
                    .collect(),
            ),
            other => Self::Opaque(other),
        }
    }
}

/// Merge a second metadata bag into the first
///
/// Keys absent on the first adopt the second's value; keys present on both
/// merge per [`MetaValue::merged_with`]. Returns the keys that were adopted
/// or combined, for the caller's notes trail.
pub fn merge_bags(first: &mut MetaBag, second: &MetaBag) -> Vec<String> {
    let mut changed = Vec::new();

    for (key, value) in second {
        match first.get(key) {
            None => {
                first.insert(key.clone(), value.clone());
                changed.push(key.clone());
            }
            Some(existing) => {
                if existing.combines_with(value) {
                    let merged = existing.merged_with(value);
                    first.insert(key.clone(), merged);
                    changed.push(key.clone());
                }
            }
        }
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag(entries: &[(&str, MetaValue)]) -> MetaBag {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_lists_concatenate() {
        let first = MetaValue::List(vec!["a".into(), "b".into()]);
        let second = MetaValue::List(vec!["c".into()]);

        let merged = first.merged_with(&second);
        assert_eq!(
            merged,
            MetaValue::List(vec!["a".into(), "b".into(), "c".into()])
        );
    }

    #[test]
    fn test_maps_shallow_merge_second_overrides() {
        let first = MetaValue::Map(bag(&[("kept", "one".into()), ("shared", "old".into())]));
        let second = MetaValue::Map(bag(&[("shared", "new".into()), ("added", "two".into())]));

        let merged = first.merged_with(&second);
        let MetaValue::Map(entries) = merged else {
            panic!("expected a map");
        };
        assert_eq!(entries.get("kept"), Some(&"one".into()));
        assert_eq!(entries.get("shared"), Some(&"new".into()));
        assert_eq!(entries.get("added"), Some(&"two".into()));
    }

    #[test]
    fn test_scalars_keep_first() {
        let first = MetaValue::Text("original".into());
        let second = MetaValue::Text("replacement".into());

        assert_eq!(first.merged_with(&second), first);
    }

    #[test]
    fn test_opaque_keeps_first() {
        let first = MetaValue::Opaque(serde_json::Value::Null);
        let second = MetaValue::Number(3.0);

        assert_eq!(first.merged_with(&second), first);
        assert_eq!(second.merged_with(&first), second);
    }

    #[test]
    fn test_mismatched_kinds_keep_first() {
        let first = MetaValue::List(vec!["a".into()]);
        let second = MetaValue::Text("b".into());

        assert_eq!(first.merged_with(&second), first);
    }

    #[test]
    fn test_merge_bags_adopts_missing_keys() {
        let mut first = bag(&[("present", "kept".into())]);
        let second = bag(&[("present", "ignored".into()), ("new", "adopted".into())]);

        let changed = merge_bags(&mut first, &second);

        assert_eq!(changed, vec!["new".to_string()]);
        assert_eq!(first.get("present"), Some(&"kept".into()));
        assert_eq!(first.get("new"), Some(&"adopted".into()));
    }

    #[test]
    fn test_merge_bags_combines_lists() {
        let mut first = bag(&[("history", MetaValue::List(vec!["a".into()]))]);
        let second = bag(&[("history", MetaValue::List(vec!["b".into()]))]);

        let changed = merge_bags(&mut first, &second);

        assert_eq!(changed, vec!["history".to_string()]);
        assert_eq!(
            first.get("history"),
            Some(&MetaValue::List(vec!["a".into(), "b".into()]))
        );
    }

    #[test]
    fn test_json_conversion() {
        let value: MetaValue = serde_json::json!({
            "flag": true,
            "count": 3,
            "label": "x",
            "items": [1, 2],
        })
        .into();

        let MetaValue::Map(entries) = value else {
            panic!("expected a map");
        };
        assert_eq!(entries.get("flag"), Some(&MetaValue::Flag(true)));
        assert_eq!(entries.get("count"), Some(&MetaValue::Number(3.0)));
        assert_eq!(entries.get("label"), Some(&"x".into()));
        assert_eq!(
            entries.get("items"),
            Some(&MetaValue::List(vec![
                MetaValue::Number(1.0),
                MetaValue::Number(2.0)
            ]))
        );
    }

    #[test]
    fn test_untagged_round_trip() {
        let original = MetaValue::Map(bag(&[
            ("flag", MetaValue::Flag(false)),
            ("list", MetaValue::List(vec![MetaValue::Number(1.5)])),
        ]));

        let encoded = serde_json::to_string(&original).unwrap();
        let decoded: MetaValue = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded, original);
    }
}
