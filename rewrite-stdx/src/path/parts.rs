/// The components of a path key, split the way templates address them
/// through `{path.dir}`, `{path.base}`, `{path.name}` and `{path.ext}`.
///
/// Keys are forward-slash separated and relative, so the decomposition works
/// on the string directly instead of going through `std::path`, whose notion
/// of a separator depends on the host platform.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathParts {
	/// Everything before the last separator. Empty for top-level keys.
	pub dir: String,
	/// The last component, extension included.
	pub base: String,
	/// `base` without `ext`.
	pub name: String,
	/// The extension with its leading dot (`.md`), or empty.
	pub ext: String,
}

impl PathParts {
	pub fn parse(key: &str) -> Self {
		let trimmed = key.trim_end_matches('/');
		let (dir, base) = match trimmed.rfind('/') {
			Some(idx) => (&trimmed[..idx], &trimmed[idx + 1..]),
			None => ("", trimmed),
		};

		// a leading dot marks a hidden file, not an extension
		let (name, ext) = match base.rfind('.') {
			Some(idx) if idx > 0 => (&base[..idx], &base[idx..]),
			_ => (base, ""),
		};

		Self {
			dir: dir.to_string(),
			base: base.to_string(),
			name: name.to_string(),
			ext: ext.to_string(),
		}
	}

	/// Field name / value pairs in declaration order.
	pub fn fields(&self) -> [(&'static str, &str); 4] {
		[
			("dir", self.dir.as_str()),
			("base", self.base.as_str()),
			("name", self.name.as_str()),
			("ext", self.ext.as_str()),
		]
	}
}
