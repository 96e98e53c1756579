use std::collections::BTreeMap;

use rewrite_stdx::path::KeyExt;
use serde::{Deserialize, Serialize};

use crate::templates::value::Value;

pub type Metadata = BTreeMap<String, Value>;

pub const REWRITE_KEY: &str = "rewrite";
pub const DATE_KEY: &str = "date";

/// A virtual file: opaque contents plus arbitrary metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FileRecord {
	#[serde(default)]
	pub contents: Vec<u8>,
	#[serde(default)]
	pub metadata: Metadata,
}

impl FileRecord {
	pub fn new(contents: impl Into<Vec<u8>>) -> Self {
		Self {
			contents: contents.into(),
			metadata: Metadata::new(),
		}
	}

	pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.metadata.insert(key.into(), value.into());
		self
	}

	/// Copies the record into independently owned storage: metadata by value,
	/// contents into a fresh buffer. Mutating the copy never affects `self`.
	pub fn duplicate(&self) -> Self {
		Self {
			contents: self.contents.to_vec(),
			metadata: self.metadata.clone(),
		}
	}

	/// Files opt out of renaming with `rewrite = false`; anything other than an
	/// absent key or `true` opts out.
	pub fn is_rewritable(&self) -> bool {
		match self.metadata.get(REWRITE_KEY) {
			None | Some(Value::Bool(true)) => true,
			Some(_) => false,
		}
	}

	pub fn date(&self) -> Option<&Value> {
		self.metadata.get(DATE_KEY)
	}
}

/// The collection of virtual files a pipeline operates on, keyed by
/// normalized relative path and iterated in key order. Every lookup
/// normalizes its key the same way `insert` does.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Files {
	entries: BTreeMap<String, FileRecord>,
}

impl Files {
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts under the normalized form of `key`, replacing any previous
	/// record stored there.
	pub fn insert(&mut self, key: impl AsRef<str>, record: FileRecord) -> Option<FileRecord> {
		self.entries.insert(key.normalize_key(), record)
	}

	pub fn get(&self, key: impl AsRef<str>) -> Option<&FileRecord> {
		self.entries.get(&key.normalize_key())
	}

	pub fn get_mut(&mut self, key: impl AsRef<str>) -> Option<&mut FileRecord> {
		self.entries.get_mut(&key.normalize_key())
	}

	pub fn remove(&mut self, key: impl AsRef<str>) -> Option<FileRecord> {
		self.entries.remove(&key.normalize_key())
	}

	pub fn contains_key(&self, key: impl AsRef<str>) -> bool {
		self.entries.contains_key(&key.normalize_key())
	}

	pub fn keys(&self) -> impl Iterator<Item = &String> {
		self.entries.keys()
	}

	/// The current keys, detached from the collection so it can be mutated
	/// while they are walked.
	pub fn snapshot_keys(&self) -> Vec<String> {
		self.entries.keys().cloned().collect()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&String, &FileRecord)> {
		self.entries.iter()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl<K: AsRef<str>> FromIterator<(K, FileRecord)> for Files {
	fn from_iter<T: IntoIterator<Item = (K, FileRecord)>>(iter: T) -> Self {
		let mut files = Files::new();
		for (key, record) in iter {
			files.insert(key, record);
		}
		files
	}
}

impl IntoIterator for Files {
	type Item = (String, FileRecord);
	type IntoIter = std::collections::btree_map::IntoIter<String, FileRecord>;

	fn into_iter(self) -> Self::IntoIter {
		self.entries.into_iter()
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn duplicate_has_independent_contents() {
		let original = FileRecord::new("hello").with("slug", "test-a");
		let mut copy = original.duplicate();
		copy.contents.extend_from_slice(b" world");
		copy.metadata.insert("slug".into(), "changed".into());

		assert_eq!(original.contents, b"hello");
		assert_eq!(original.metadata["slug"], Value::from("test-a"));
	}

	#[test]
	fn rewritable_unless_opted_out() {
		assert!(FileRecord::default().is_rewritable());
		assert!(FileRecord::default().with(REWRITE_KEY, true).is_rewritable());
		assert!(!FileRecord::default().with(REWRITE_KEY, false).is_rewritable());
		assert!(!FileRecord::default().with(REWRITE_KEY, "yes").is_rewritable());
		assert!(!FileRecord::default().with(REWRITE_KEY, Value::Null).is_rewritable());
	}

	#[test]
	fn keys_are_normalized_on_insert() {
		let files: Files = [("./p/a.md", FileRecord::default()), ("b//c.md", FileRecord::default())]
			.into_iter()
			.collect();
		assert_eq!(files.snapshot_keys(), vec!["b/c.md".to_string(), "p/a.md".to_string()]);
	}

	#[test]
	fn insert_replaces_existing() {
		let mut files = Files::new();
		files.insert("a.md", FileRecord::new("one"));
		let previous = files.insert("a.md", FileRecord::new("two"));
		assert_eq!(previous.map(|r| r.contents), Some(b"one".to_vec()));
		assert_eq!(files.len(), 1);
	}

	#[test]
	fn lookups_normalize_like_insert() {
		let mut files = Files::new();
		files.insert("./p/a.md", FileRecord::new("a"));

		assert!(files.contains_key("./p/a.md"));
		assert!(files.contains_key("p//a.md"));
		assert_eq!(files.get("./p/a.md").map(|r| r.contents.as_slice()), Some(&b"a"[..]));

		files.get_mut("p/./a.md").unwrap().contents.push(b'!');
		assert_eq!(files.remove("./p/a.md").map(|r| r.contents), Some(b"a!".to_vec()));
		assert!(files.is_empty());
	}
}
