use std::{fmt, sync::Arc};

use serde::{
	de::{self, value::MapAccessDeserializer, value::SeqAccessDeserializer, MapAccess, SeqAccess, Visitor},
	Deserialize, Deserializer,
};

use crate::{
	date::DEFAULT_DATE_FORMAT,
	engine::rule::{CompiledRule, Namer},
	error::Error,
	patterns::MATCH_ALL,
	templates::context::Context,
};

pub const DEFAULT_FILENAME: &str = "./{path.dir}/{path.base}";

/// The values a rule falls back to for every field it leaves unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDefaults {
	pub pattern: Vec<String>,
	pub filename: String,
	pub date: String,
	pub copy: bool,
}

impl Default for RuleDefaults {
	fn default() -> Self {
		Self {
			pattern: vec![MATCH_ALL.to_string()],
			filename: DEFAULT_FILENAME.to_string(),
			date: DEFAULT_DATE_FORMAT.to_string(),
			copy: false,
		}
	}
}

/// One glob or an ordered list of them.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Patterns {
	One(String),
	Many(Vec<String>),
}

impl Patterns {
	pub fn into_vec(self) -> Vec<String> {
		match self {
			Patterns::One(pattern) => vec![pattern],
			Patterns::Many(patterns) => patterns,
		}
	}
}

impl From<&str> for Patterns {
	fn from(value: &str) -> Self {
		Patterns::One(value.to_string())
	}
}

impl From<Vec<&str>> for Patterns {
	fn from(value: Vec<&str>) -> Self {
		Patterns::Many(value.into_iter().map(str::to_string).collect())
	}
}

impl From<Vec<String>> for Patterns {
	fn from(value: Vec<String>) -> Self {
		Patterns::Many(value)
	}
}

/// How a rule computes the new key: a template, or custom code.
#[derive(Clone)]
pub enum Filename {
	Template(String),
	Function(Arc<dyn Namer>),
}

impl fmt::Debug for Filename {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Filename::Template(text) => f.debug_tuple("Template").field(text).finish(),
			Filename::Function(_) => f.debug_tuple("Function").field(&"<closure>").finish(),
		}
	}
}

impl<'de> Deserialize<'de> for Filename {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		struct FilenameVisitor;

		impl Visitor<'_> for FilenameVisitor {
			type Value = Filename;

			fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
				formatter.write_str("a filename template string")
			}

			fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
				Ok(Filename::Template(v.to_string()))
			}
		}

		deserializer.deserialize_str(FilenameVisitor)
	}
}

impl From<&str> for Filename {
	fn from(value: &str) -> Self {
		Filename::Template(value.to_string())
	}
}

impl From<String> for Filename {
	fn from(value: String) -> Self {
		Filename::Template(value)
	}
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct RuleOptions {
	pub pattern: Option<Patterns>,
	pub filename: Option<Filename>,
	pub copy: Option<bool>,
	pub date: Option<String>,
}

impl RuleOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn pattern(mut self, pattern: impl Into<Patterns>) -> Self {
		self.pattern = Some(pattern.into());
		self
	}

	pub fn filename(mut self, filename: impl Into<Filename>) -> Self {
		self.filename = Some(filename.into());
		self
	}

	pub fn name_with<F>(mut self, f: F) -> Self
	where
		F: Fn(&Context, &str, &CompiledRule) -> anyhow::Result<String> + Send + Sync + 'static,
	{
		self.filename = Some(Filename::Function(Arc::new(f)));
		self
	}

	pub fn copy(mut self, copy: bool) -> Self {
		self.copy = Some(copy);
		self
	}

	pub fn date(mut self, format: impl Into<String>) -> Self {
		self.date = Some(format.into());
		self
	}
}

/// A single rule as written by the user: a bare template, a name function,
/// or a table of options.
#[derive(Clone)]
pub enum RuleConfig {
	Template(String),
	Function(Arc<dyn Namer>),
	Options(RuleOptions),
}

impl fmt::Debug for RuleConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RuleConfig::Template(text) => f.debug_tuple("Template").field(text).finish(),
			RuleConfig::Function(_) => f.debug_tuple("Function").field(&"<closure>").finish(),
			RuleConfig::Options(options) => f.debug_tuple("Options").field(options).finish(),
		}
	}
}

impl RuleConfig {
	pub fn function<F>(f: F) -> Self
	where
		F: Fn(&Context, &str, &CompiledRule) -> anyhow::Result<String> + Send + Sync + 'static,
	{
		RuleConfig::Function(Arc::new(f))
	}

	/// Folds the three shapes into one set of options, so compilation only
	/// ever deals with [`RuleOptions`].
	pub fn into_options(self) -> RuleOptions {
		match self {
			RuleConfig::Template(text) => RuleOptions::new().filename(text),
			RuleConfig::Function(namer) => RuleOptions {
				filename: Some(Filename::Function(namer)),
				..RuleOptions::default()
			},
			RuleConfig::Options(options) => options,
		}
	}
}

impl From<&str> for RuleConfig {
	fn from(value: &str) -> Self {
		RuleConfig::Template(value.to_string())
	}
}

impl From<String> for RuleConfig {
	fn from(value: String) -> Self {
		RuleConfig::Template(value)
	}
}

impl From<RuleOptions> for RuleConfig {
	fn from(value: RuleOptions) -> Self {
		RuleConfig::Options(value)
	}
}

struct RuleConfigVisitor;

impl<'de> Visitor<'de> for RuleConfigVisitor {
	type Value = RuleConfig;

	fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
		formatter.write_str("a filename template or a table of rule options")
	}

	fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
		Ok(RuleConfig::Template(v.to_string()))
	}

	fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
		RuleOptions::deserialize(MapAccessDeserializer::new(map)).map(RuleConfig::Options)
	}
}

impl<'de> Deserialize<'de> for RuleConfig {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		deserializer.deserialize_any(RuleConfigVisitor)
	}
}

/// Everything a rewrite plugin is configured with: one rule, or an ordered
/// list of rules applied one after the other.
#[derive(Clone, Debug)]
pub enum RewriteConfig {
	One(RuleConfig),
	Many(Vec<RuleConfig>),
}

impl RewriteConfig {
	pub fn into_rules(self) -> Vec<RuleConfig> {
		match self {
			RewriteConfig::One(rule) => vec![rule],
			RewriteConfig::Many(rules) => rules,
		}
	}

	/// Reads either a list of `[[rule]]` tables or a single rule written as
	/// top-level fields.
	pub fn from_toml_str(s: &str) -> Result<Self, Error> {
		let mut table: toml::Table = toml::from_str(s)?;
		match table.remove("rule") {
			Some(rules) if table.is_empty() => Ok(RewriteConfig::Many(rules.try_into()?)),
			Some(_) => Err(Error::Config(
				"`rule` tables cannot be mixed with top-level rule fields".to_string(),
			)),
			None => Ok(RewriteConfig::One(RuleConfig::Options(toml::Value::Table(table).try_into()?))),
		}
	}

	pub fn from_json_str(s: &str) -> Result<Self, Error> {
		Ok(serde_json::from_str(s)?)
	}
}

impl<'de> Deserialize<'de> for RewriteConfig {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		struct RewriteConfigVisitor;

		impl<'de> Visitor<'de> for RewriteConfigVisitor {
			type Value = RewriteConfig;

			fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
				formatter.write_str("a rule or a list of rules")
			}

			fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
				RuleConfigVisitor.visit_str(v).map(RewriteConfig::One)
			}

			fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
				RuleConfigVisitor.visit_map(map).map(RewriteConfig::One)
			}

			fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<Self::Value, A::Error> {
				Vec::<RuleConfig>::deserialize(SeqAccessDeserializer::new(seq)).map(RewriteConfig::Many)
			}
		}

		deserializer.deserialize_any(RewriteConfigVisitor)
	}
}

impl From<RuleConfig> for RewriteConfig {
	fn from(value: RuleConfig) -> Self {
		RewriteConfig::One(value)
	}
}

impl From<RuleOptions> for RewriteConfig {
	fn from(value: RuleOptions) -> Self {
		RewriteConfig::One(value.into())
	}
}

impl From<&str> for RewriteConfig {
	fn from(value: &str) -> Self {
		RewriteConfig::One(value.into())
	}
}

impl From<String> for RewriteConfig {
	fn from(value: String) -> Self {
		RewriteConfig::One(value.into())
	}
}

impl From<Vec<RuleConfig>> for RewriteConfig {
	fn from(value: Vec<RuleConfig>) -> Self {
		RewriteConfig::Many(value)
	}
}

impl From<Vec<RuleOptions>> for RewriteConfig {
	fn from(value: Vec<RuleOptions>) -> Self {
		RewriteConfig::Many(value.into_iter().map(RuleConfig::from).collect())
	}
}
