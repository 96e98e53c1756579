use std::path::Path;

use path_clean::PathClean;

pub trait KeyExt {
	/// Turns a path-like string into a collection key: forward slashes only,
	/// `.` and `..` components resolved, no leading `./` or `/`.
	fn normalize_key(&self) -> String;
}

impl<T: AsRef<str>> KeyExt for T {
	fn normalize_key(&self) -> String {
		let unified = self.as_ref().replace('\\', "/");
		let cleaned = Path::new(&unified).clean();
		let normalized = cleaned.to_string_lossy().replace('\\', "/");

		match normalized.trim_start_matches('/') {
			"." => String::new(),
			rest => rest.to_string(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn already_normalized() {
		assert_eq!("p/b.js".normalize_key(), "p/b.js");
	}

	#[test]
	fn strips_current_dir_prefix() {
		assert_eq!("./p/b.js".normalize_key(), "p/b.js");
	}

	#[test]
	fn collapses_repeated_separators() {
		assert_eq!("2015//07/a.md".normalize_key(), "2015/07/a.md");
	}

	#[test]
	fn resolves_parent_components() {
		assert_eq!("p/q/../a.md".normalize_key(), "p/a.md");
	}

	#[test]
	fn backslashes_become_separators() {
		assert_eq!(r"p\a.md".normalize_key(), "p/a.md");
	}

	#[test]
	fn leading_slash_is_dropped() {
		assert_eq!("/a.md".normalize_key(), "a.md");
	}

	#[test]
	fn empty_stays_empty() {
		assert_eq!("".normalize_key(), "");
		assert_eq!("./".normalize_key(), "");
	}
}
