use tracing::debug;

use crate::{
	error::Error,
	file::{Files, Metadata},
	plugins::{Host, Plugin},
};

/// A minimal build pipeline: global metadata plus an ordered list of plugins
/// that each get the file collection in turn.
#[derive(Default)]
pub struct Pipeline {
	metadata: Metadata,
	plugins: Vec<Box<dyn Plugin>>,
}

impl Pipeline {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_metadata(mut self, metadata: Metadata) -> Self {
		self.metadata = metadata;
		self
	}

	pub fn with_plugin(mut self, plugin: impl Plugin + 'static) -> Self {
		self.plugins.push(Box::new(plugin));
		self
	}

	/// Runs every plugin in order, stopping at the first failure and handing
	/// its error back unchanged.
	pub fn process(&self, mut files: Files) -> Result<Files, Error> {
		for plugin in &self.plugins {
			debug!(plugin = plugin.name(), files = files.len(), "running plugin");
			plugin.run(&mut files, self)?;
		}
		Ok(files)
	}
}

impl Host for Pipeline {
	fn metadata(&self) -> &Metadata {
		&self.metadata
	}
}
