use rewrite_stdx::path::{KeyExt, PathParts};
use tracing::{debug, trace, warn};

use crate::{
	config::{RewriteConfig, RuleDefaults},
	error::Error,
	file::{FileRecord, Files, Metadata, DATE_KEY},
	plugins::{Host, Plugin},
	templates::context::Context,
};

pub mod pipeline;
pub mod rule;

use rule::CompiledRule;

/// Renames files matched by glob patterns to the paths their templates
/// produce, one rule after the other.
#[derive(Debug, Clone)]
pub struct Rewrite {
	rules: Vec<CompiledRule>,
}

impl Rewrite {
	/// Compiles every rule up front, so a misconfiguration is reported before
	/// any file is touched.
	pub fn new(config: impl Into<RewriteConfig>) -> Result<Self, Error> {
		Self::with_defaults(config, &RuleDefaults::default())
	}

	pub fn with_defaults(config: impl Into<RewriteConfig>, defaults: &RuleDefaults) -> Result<Self, Error> {
		let rules = config
			.into()
			.into_rules()
			.into_iter()
			.map(|rule| CompiledRule::compile(rule, defaults))
			.collect::<Result<Vec<_>, _>>()?;
		Ok(Self { rules })
	}

	pub fn rules(&self) -> &[CompiledRule] {
		&self.rules
	}

	/// Applies every rule in order. Each rule sees the collection as the
	/// previous one left it.
	pub fn apply(&self, files: &mut Files, global: &Metadata) -> Result<(), Error> {
		for (idx, rule) in self.rules.iter().enumerate() {
			trace!(rule = idx, patterns = ?rule.patterns.patterns().collect::<Vec<_>>(), "applying rule");
			Self::apply_rule(rule, files, global)?;
		}
		Ok(())
	}

	fn apply_rule(rule: &CompiledRule, files: &mut Files, global: &Metadata) -> Result<(), Error> {
		for key in files.snapshot_keys() {
			// moved away by an earlier step of this rule
			let Some(record) = files.get(&key) else {
				continue;
			};

			debug!(file = %key, "checking file");
			if !record.is_rewritable() || !rule.patterns.matches(&key) {
				continue;
			}

			let ctx = Self::context(rule, record, &key, global);
			let new_key = rule.name(&ctx, &key)?.normalize_key();
			if new_key == key {
				continue;
			}
			if new_key.is_empty() {
				debug!(file = %key, "name resolved to an empty path, keeping original");
				continue;
			}

			debug!(file = %key, "rewriting to: {new_key}");
			let duplicate = record.duplicate();
			if files.insert(&new_key, duplicate).is_some() {
				debug!(file = %new_key, "replaced an existing file");
			}
			if !rule.copy {
				files.remove(&key);
			}
		}
		Ok(())
	}

	fn context(rule: &CompiledRule, record: &FileRecord, key: &str, global: &Metadata) -> Context {
		let mut ctx = Context::layered(&record.metadata, global, &PathParts::parse(key));

		if let Some(date) = record.date() {
			match rule.date.format(date) {
				Some(formatted) => {
					ctx.insert(DATE_KEY, formatted);
				}
				None => {
					warn!(file = key, value = %date, "could not read `date` as a date");
					ctx.remove(DATE_KEY);
				}
			}
		}

		ctx
	}
}

impl Plugin for Rewrite {
	fn run(&self, files: &mut Files, host: &dyn Host) -> Result<(), Error> {
		self.apply(files, host.metadata())
	}

	fn name(&self) -> &str {
		"rewrite"
	}
}
