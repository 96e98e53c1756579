//! Glob- and template-driven renaming of files in an in-memory build
//! pipeline.
//!
//! ```
//! use rewrite_sdk::prelude::*;
//!
//! let mut files = Files::new();
//! files.insert("posts/hello.md", FileRecord::new("# Hello").with("slug", "hello-world"));
//!
//! let rewrite = Rewrite::new(RuleOptions::new().pattern("posts/*.md").filename("blog/{slug}{path.ext}")).unwrap();
//! let files = Pipeline::new().with_plugin(rewrite).process(files).unwrap();
//!
//! assert!(files.contains_key("blog/hello-world.md"));
//! ```

pub mod config;
pub mod date;
pub mod engine;
pub mod error;
pub mod file;
pub mod patterns;
pub mod plugins;
pub mod templates;

pub mod prelude {
	pub use crate::{
		config::{Filename, Patterns, RewriteConfig, RuleConfig, RuleDefaults, RuleOptions},
		date::DateFormat,
		engine::{pipeline::Pipeline, rule::CompiledRule, rule::Namer, Rewrite},
		error::Error,
		file::{FileRecord, Files, Metadata},
		patterns::PatternSet,
		plugins::{Host, Plugin},
		templates::prelude::*,
	};
}
