use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::templates::{
	context::Context,
	parser::{self, KeyPath, Segment, TemplateError},
};

#[derive(Debug, Serialize, Eq, PartialEq, Clone)]
pub struct Template {
	pub text: String,
	#[serde(skip)]
	segments: Vec<Segment>,
}

impl<'de> Deserialize<'de> for Template {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let text = String::deserialize(deserializer)?;
		Template::from_str(&text).map_err(|e| serde::de::Error::custom(e.to_string()))
	}
}

impl FromStr for Template {
	type Err = TemplateError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self {
			text: s.to_string(),
			segments: parser::parse(s)?,
		})
	}
}

impl Template {
	pub fn placeholders(&self) -> impl Iterator<Item = &KeyPath> {
		self.segments.iter().filter_map(|segment| match segment {
			Segment::Placeholder(key) => Some(key),
			Segment::Literal(_) => None,
		})
	}

	pub fn has_placeholders(&self) -> bool {
		self.placeholders().next().is_some()
	}

	/// A template resolves only if it has placeholders and every one of them
	/// finds a non-blank value in `ctx`.
	pub fn is_resolvable(&self, ctx: &Context) -> bool {
		self.has_placeholders() && self.placeholders().all(|key| ctx.lookup(key).is_some_and(|value| !value.is_blank()))
	}

	/// Expands the template, or returns `None` when it does not resolve.
	pub fn render(&self, ctx: &Context) -> Option<String> {
		if !self.is_resolvable(ctx) {
			return None;
		}

		let mut output = String::new();
		for segment in &self.segments {
			match segment {
				Segment::Literal(s) => output.push_str(s),
				Segment::Placeholder(key) => output.push_str(&ctx.lookup(key)?.to_string()),
			}
		}
		Some(output)
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;
	use crate::templates::value::Value;

	fn ctx(value: serde_json::Value) -> Context {
		match Value::from(value) {
			Value::Map(map) => map.into_iter().collect(),
			_ => unreachable!(),
		}
	}

	#[test]
	fn render_mixed_content() {
		let template = Template::from_str("{slug}{path.ext}").unwrap();
		let ctx = ctx(json!({"slug": "test-a", "path": {"ext": ".md"}}));
		assert_eq!(template.render(&ctx), Some("test-a.md".to_string()));
	}

	#[test]
	fn render_stringifies_numbers() {
		let template = Template::from_str("page-{page}.html").unwrap();
		assert_eq!(template.render(&ctx(json!({"page": 2}))), Some("page-2.html".to_string()));
	}

	#[test]
	fn every_placeholder_must_resolve() {
		let template = Template::from_str("{beep}{path.ext}").unwrap();
		let ctx = ctx(json!({"path": {"ext": ".md"}}));
		assert!(!template.is_resolvable(&ctx));
		assert_eq!(template.render(&ctx), None);
	}

	#[test]
	fn blank_values_do_not_resolve() {
		let template = Template::from_str("{a}/x").unwrap();
		assert_eq!(template.render(&ctx(json!({"a": ""}))), None);
		assert_eq!(template.render(&ctx(json!({"a": []}))), None);
		assert_eq!(template.render(&ctx(json!({"a": null}))), None);
	}

	#[test]
	fn falsy_scalars_resolve() {
		let template = Template::from_str("{a}-{b}").unwrap();
		assert_eq!(template.render(&ctx(json!({"a": false, "b": 0}))), Some("false-0".to_string()));
	}

	#[test]
	fn template_without_placeholders_never_resolves() {
		let template = Template::from_str("static.html").unwrap();
		assert!(!template.has_placeholders());
		assert_eq!(template.render(&Context::new()), None);
	}

	#[test]
	fn deserialize_checks_syntax() {
		let ok: Result<Template, _> = serde_json::from_value(json!("{path.base}"));
		assert!(ok.is_ok());
		let err: Result<Template, _> = serde_json::from_value(json!("{path.base"));
		assert!(err.is_err());
	}
}
