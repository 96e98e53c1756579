use std::{fmt, str::FromStr, sync::Arc};

use anyhow::Result;
use tracing::{debug, warn};

use crate::{
	config::{Filename, RuleConfig, RuleDefaults},
	date::DateFormat,
	error::Error,
	patterns::PatternSet,
	templates::{context::Context, template::Template},
};

/// Computes the key a file should move to. Returning the original key leaves
/// the file where it is.
///
/// Implemented for any `Fn(&Context, &str, &CompiledRule) -> Result<String>`,
/// so plain closures can stand in for a template.
pub trait Namer: Send + Sync {
	fn name(&self, ctx: &Context, key: &str, rule: &CompiledRule) -> Result<String>;
}

impl<F> Namer for F
where
	F: Fn(&Context, &str, &CompiledRule) -> Result<String> + Send + Sync,
{
	fn name(&self, ctx: &Context, key: &str, rule: &CompiledRule) -> Result<String> {
		self(ctx, key, rule)
	}
}

/// The namer built from a filename template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateNamer {
	template: Template,
}

impl TemplateNamer {
	pub fn new(text: &str) -> Result<Self, Error> {
		let template = Template::from_str(text)?;
		if !template.has_placeholders() {
			warn!(template = text, "filename template has no placeholders and will never rename a file");
		}
		Ok(Self { template })
	}

	pub fn template(&self) -> &Template {
		&self.template
	}
}

impl Namer for TemplateNamer {
	fn name(&self, ctx: &Context, key: &str, rule: &CompiledRule) -> Result<String> {
		// the namer may be called directly, outside the executor's pattern gate
		if !rule.patterns.matches(key) {
			return Ok(key.to_string());
		}

		let Some(path) = self.template.render(ctx) else {
			debug!(file = key, template = %self.template.text, "template data missing, keeping original path");
			return Ok(key.to_string());
		};

		if let Some(relative) = path.strip_prefix("./") {
			return Ok(relative.to_string());
		}
		Ok(path)
	}
}

/// The executable form of a rule, with every default filled in.
#[derive(Clone)]
pub struct CompiledRule {
	pub patterns: PatternSet,
	pub namer: Arc<dyn Namer>,
	pub copy: bool,
	pub date: DateFormat,
}

impl fmt::Debug for CompiledRule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CompiledRule")
			.field("patterns", &self.patterns)
			.field("namer", &"<namer>")
			.field("copy", &self.copy)
			.field("date", &self.date)
			.finish()
	}
}

impl CompiledRule {
	pub fn compile(config: RuleConfig, defaults: &RuleDefaults) -> Result<Self, Error> {
		let options = config.into_options();

		let patterns = match options.pattern {
			Some(patterns) => PatternSet::new(patterns.into_vec())?,
			None => PatternSet::new(&defaults.pattern)?,
		};

		let date = DateFormat::parse(options.date.as_deref().unwrap_or(&defaults.date))?;

		let namer: Arc<dyn Namer> = match options.filename {
			Some(Filename::Function(namer)) => namer,
			Some(Filename::Template(text)) => Arc::new(TemplateNamer::new(&text)?),
			None => Arc::new(TemplateNamer::new(&defaults.filename)?),
		};

		Ok(Self {
			patterns,
			namer,
			copy: options.copy.unwrap_or(defaults.copy),
			date,
		})
	}

	/// Asks this rule's namer for the new key of `key`.
	pub fn name(&self, ctx: &Context, key: &str) -> Result<String> {
		self.namer.name(ctx, key, self)
	}
}
