use crate::{
	error::Error,
	file::{Files, Metadata},
};

/// The build pipeline a plugin runs inside of.
pub trait Host {
	/// Pipeline-wide metadata, shared by every file.
	fn metadata(&self) -> &Metadata;
}

/// A transform over the whole file collection, run once per build.
///
/// The returned `Result` is the completion signal: the host learns about
/// success or failure exactly once per invocation.
pub trait Plugin {
	fn run(&self, files: &mut Files, host: &dyn Host) -> Result<(), Error>;

	fn name(&self) -> &str {
		std::any::type_name::<Self>()
	}
}

impl<F> Plugin for F
where
	F: Fn(&mut Files, &dyn Host) -> Result<(), Error>,
{
	fn run(&self, files: &mut Files, host: &dyn Host) -> Result<(), Error> {
		self(files, host)
	}
}
