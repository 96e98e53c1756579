use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, SecondsFormat, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Represents any value that can be stored in file or pipeline metadata and
/// retrieved by a template placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
	Null,
	Bool(bool),
	Number(f64),
	String(String),
	List(Vec<Value>),
	Map(BTreeMap<String, Value>),
	#[serde(skip_deserializing)]
	Date(DateTime<Utc>),
}

impl Value {
	/// Whether a placeholder resolving to this value counts as "no data".
	pub fn is_blank(&self) -> bool {
		match self {
			Value::Null => true,
			Value::String(s) => s.is_empty(),
			Value::List(items) => items.is_empty(),
			_ => false,
		}
	}

	pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
		match self {
			Value::Map(map) => Some(map),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::String(s) => Some(s),
			_ => None,
		}
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::Null => Ok(()),
			Value::Bool(b) => write!(f, "{b}"),
			Value::Number(n) => write!(f, "{n}"),
			Value::String(s) => write!(f, "{s}"),
			Value::Date(date) => write!(f, "{}", date.to_rfc3339_opts(SecondsFormat::Millis, true)),
			Value::List(items) => write!(f, "{}", items.iter().join(",")),
			Value::Map(_) => {
				let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
				write!(f, "{json}")
			}
		}
	}
}

impl From<serde_json::Value> for Value {
	fn from(value: serde_json::Value) -> Self {
		match value {
			serde_json::Value::Null => Value::Null,
			serde_json::Value::Bool(b) => Value::Bool(b),
			serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
			serde_json::Value::String(s) => Value::String(s),
			serde_json::Value::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
			serde_json::Value::Object(map) => Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
		}
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Value::String(value.to_string())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Value::String(value)
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Value::Bool(value)
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Value::Number(value)
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Value::Number(value as f64)
	}
}

impl From<DateTime<Utc>> for Value {
	fn from(value: DateTime<Utc>) -> Self {
		Value::Date(value)
	}
}

impl From<Vec<Value>> for Value {
	fn from(value: Vec<Value>) -> Self {
		Value::List(value)
	}
}

impl From<BTreeMap<String, Value>> for Value {
	fn from(value: BTreeMap<String, Value>) -> Self {
		Value::Map(value)
	}
}

#[cfg(test)]
mod tests {
	use chrono::TimeZone;
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;

	#[test]
	fn whole_numbers_render_without_fraction() {
		assert_eq!(Value::Number(3.0).to_string(), "3");
		assert_eq!(Value::Number(2.5).to_string(), "2.5");
	}

	#[test]
	fn lists_render_comma_joined() {
		let value = Value::from(json!(["a", 1, true]));
		assert_eq!(value.to_string(), "a,1,true");
	}

	#[test]
	fn maps_render_as_json() {
		let value = Value::from(json!({"b": 1, "a": "x"}));
		assert_eq!(value.to_string(), r#"{"a":"x","b":1.0}"#);
	}

	#[test]
	fn dates_render_as_rfc3339() {
		let date = Utc.with_ymd_and_hms(2015, 7, 15, 12, 0, 0).unwrap();
		assert_eq!(Value::Date(date).to_string(), "2015-07-15T12:00:00.000Z");
	}

	#[test]
	fn null_renders_empty() {
		assert_eq!(Value::Null.to_string(), "");
	}

	#[test]
	fn blank_values() {
		assert!(Value::Null.is_blank());
		assert!(Value::from("").is_blank());
		assert!(Value::List(vec![]).is_blank());
		assert!(!Value::from(false).is_blank());
		assert!(!Value::from(0_i64).is_blank());
		assert!(!Value::Map(BTreeMap::new()).is_blank());
	}

	#[test]
	fn deserializes_untagged() {
		let value: Value = serde_json::from_str(r#"{"title": "Hi", "tags": ["x"], "draft": false, "n": 2}"#).unwrap();
		let map = value.as_map().unwrap();
		assert_eq!(map["title"], Value::from("Hi"));
		assert_eq!(map["tags"], Value::List(vec![Value::from("x")]));
		assert_eq!(map["draft"], Value::Bool(false));
		assert_eq!(map["n"], Value::Number(2.0));
	}
}
