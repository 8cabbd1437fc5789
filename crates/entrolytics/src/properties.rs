// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Free-form JSON mappings for event data, user traits and vital attribution.

use serde::Serialize;
use serde_json::{Map, Value};

/// A JSON object sent as `data`, `traits` or `attribution`.
///
/// # Example
///
/// ```
/// use entrolytics::Properties;
///
/// let data = Properties::new()
///     .insert("revenue", 99.99)
///     .insert("currency", "USD")
///     .insert("first_purchase", true);
/// assert_eq!(data.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Properties {
	inner: Map<String, Value>,
}

impl Properties {
	pub fn new() -> Self {
		Self { inner: Map::new() }
	}

	/// Inserts a key-value pair, replacing any previous value for `key`.
	pub fn insert<K, V>(mut self, key: K, value: V) -> Self
	where
		K: Into<String>,
		V: Into<Value>,
	{
		self.inner.insert(key.into(), value.into());
		self
	}

	/// Merges `other` into this mapping; `other` wins on key collision.
	pub fn merge(mut self, other: Properties) -> Self {
		self.inner.extend(other.inner);
		self
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	pub fn len(&self) -> usize {
		self.inner.len()
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.inner.get(key)
	}

	pub fn into_value(self) -> Value {
		Value::Object(self.inner)
	}
}

impl From<Properties> for Value {
	fn from(props: Properties) -> Self {
		props.into_value()
	}
}

/// Non-object values produce an empty mapping.
impl From<Value> for Properties {
	fn from(value: Value) -> Self {
		match value {
			Value::Object(map) => Self { inner: map },
			_ => Self::new(),
		}
	}
}

impl From<Map<String, Value>> for Properties {
	fn from(map: Map<String, Value>) -> Self {
		Self { inner: map }
	}
}

impl<K, V> FromIterator<(K, V)> for Properties
where
	K: Into<String>,
	V: Into<Value>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self {
			inner: iter
				.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use serde_json::json;

	#[test]
	fn test_new_is_empty() {
		let props = Properties::new();
		assert!(props.is_empty());
		assert_eq!(serde_json::to_value(&props).unwrap(), json!({}));
	}

	#[test]
	fn test_insert_mixed_values() {
		let props = Properties::new()
			.insert("plan", "pro")
			.insert("seats", 5)
			.insert("trial", false);

		assert_eq!(props.len(), 3);
		assert_eq!(props.get("plan"), Some(&json!("pro")));
		assert_eq!(props.get("seats"), Some(&json!(5)));
		assert_eq!(props.get("trial"), Some(&json!(false)));
	}

	#[test]
	fn test_merge_prefers_other() {
		let merged = Properties::new()
			.insert("a", 1)
			.insert("b", 2)
			.merge(Properties::new().insert("b", 20).insert("c", 3));

		assert_eq!(merged.into_value(), json!({"a": 1, "b": 20, "c": 3}));
	}

	#[test]
	fn test_serializes_as_plain_object() {
		let props = Properties::new().insert("title", "Pricing");
		assert_eq!(
			serde_json::to_string(&props).unwrap(),
			r#"{"title":"Pricing"}"#
		);
	}

	#[test]
	fn test_from_non_object_value_is_empty() {
		assert!(Properties::from(json!(["a", "b"])).is_empty());
		assert!(Properties::from(Value::Null).is_empty());
	}

	#[test]
	fn test_from_iterator() {
		let props: Properties = [("element", "button"), ("selector", "#buy")]
			.into_iter()
			.collect();
		assert_eq!(props.get("selector"), Some(&json!("#buy")));
	}

	proptest! {
		#[test]
		fn len_matches_unique_keys(keys in proptest::collection::vec("[a-z]{1,10}", 0..20)) {
			let unique: std::collections::HashSet<_> = keys.iter().cloned().collect();
			let props = keys.iter().fold(Properties::new(), |p, k| p.insert(k.clone(), 1));
			prop_assert_eq!(props.len(), unique.len());
		}
	}
}
