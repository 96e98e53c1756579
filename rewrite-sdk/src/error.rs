use thiserror::Error;

use crate::templates::parser::TemplateError;

/// The primary error type for configuring and running the rewrite engine.
#[derive(Error, Debug)]
pub enum Error {
	#[error("Error in configuration: {0}")]
	Config(String),

	#[error(transparent)]
	Template(#[from] TemplateError),

	#[error("Invalid glob pattern `{pattern}`")]
	Pattern {
		#[source]
		source: glob::PatternError,
		pattern: String,
	},

	#[error("Could not parse TOML configuration")]
	Toml(#[from] toml::de::Error),

	#[error("Could not parse JSON configuration")]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl Error {
	pub fn is_config(&self) -> bool {
		matches!(
			self,
			Error::Config(_) | Error::Template(_) | Error::Pattern { .. } | Error::Toml(_) | Error::Json(_)
		)
	}
}
