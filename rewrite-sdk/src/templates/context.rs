use std::collections::BTreeMap;

use rewrite_stdx::path::PathParts;

use crate::{file::Metadata, templates::parser::KeyPath, templates::value::Value};

/// The values a template is expanded against for a single file.
///
/// Built fresh for every (rule, file) pair and handed to name functions by
/// shared reference only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
	values: BTreeMap<String, Value>,
}

impl Context {
	pub fn new() -> Self {
		Self::default()
	}

	/// Layers file metadata, pipeline metadata and the decomposed path key,
	/// later layers overriding earlier ones on conflicting top-level keys.
	pub fn layered(file: &Metadata, global: &Metadata, path: &PathParts) -> Self {
		let mut values = file.clone();
		values.extend(global.iter().map(|(k, v)| (k.clone(), v.clone())));

		let path = path
			.fields()
			.into_iter()
			.map(|(field, value)| (field.to_string(), Value::from(value)))
			.collect();
		values.insert("path".to_string(), Value::Map(path));

		Self { values }
	}

	/// Walks `key` through nested maps. Any missing or non-map intermediate
	/// yields `None`, which is distinct from a present but empty value.
	pub fn lookup(&self, key: &KeyPath) -> Option<&Value> {
		let (first, rest) = key.parts.split_first()?;
		rest.iter()
			.try_fold(self.values.get(first)?, |current, part| current.as_map()?.get(part))
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.values.get(key)
	}

	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
		self.values.insert(key.into(), value.into())
	}

	pub fn remove(&mut self, key: &str) -> Option<Value> {
		self.values.remove(key)
	}
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
	fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
		Self {
			values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;

	fn key(s: &str) -> KeyPath {
		KeyPath::parse(s).unwrap()
	}

	fn metadata(value: serde_json::Value) -> Metadata {
		match Value::from(value) {
			Value::Map(map) => map,
			_ => unreachable!(),
		}
	}

	#[test]
	fn lookup_nested_key() {
		let ctx: Context = [("site", Value::from(json!({"author": {"name": "ann"}})))].into_iter().collect();
		assert_eq!(ctx.lookup(&key("site.author.name")), Some(&Value::from("ann")));
	}

	#[test]
	fn missing_intermediate_is_undefined() {
		let ctx: Context = [("site", Value::from(json!({"title": "x"})))].into_iter().collect();
		assert_eq!(ctx.lookup(&key("site.author.name")), None);
		assert_eq!(ctx.lookup(&key("nope.at.all")), None);
	}

	#[test]
	fn walking_into_a_scalar_is_undefined() {
		let ctx: Context = [("slug", "test-a")].into_iter().collect();
		assert_eq!(ctx.lookup(&key("slug.length")), None);
	}

	#[test]
	fn empty_string_is_defined() {
		let ctx: Context = [("slug", "")].into_iter().collect();
		assert_eq!(ctx.lookup(&key("slug")), Some(&Value::from("")));
	}

	#[test]
	fn layering_precedence() {
		let file = metadata(json!({"title": "file", "slug": "test-a", "path": "shadowed"}));
		let global = metadata(json!({"title": "site"}));
		let ctx = Context::layered(&file, &global, &PathParts::parse("p/a.md"));

		assert_eq!(ctx.get("title"), Some(&Value::from("site")));
		assert_eq!(ctx.get("slug"), Some(&Value::from("test-a")));
		assert_eq!(ctx.lookup(&key("path.dir")), Some(&Value::from("p")));
		assert_eq!(ctx.lookup(&key("path.base")), Some(&Value::from("a.md")));
		assert_eq!(ctx.lookup(&key("path.name")), Some(&Value::from("a")));
		assert_eq!(ctx.lookup(&key("path.ext")), Some(&Value::from(".md")));
	}
}
