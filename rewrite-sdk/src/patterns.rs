use glob::{MatchOptions, Pattern};

use crate::error::Error;

pub const MATCH_ALL: &str = "**";

const MAX_RANGE_LEN: u64 = 1_000;

// Wildcards never match a leading dot, so dotfiles are only picked up by
// patterns that spell the dot out.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
	case_sensitive: true,
	require_literal_separator: true,
	require_literal_leading_dot: true,
};

#[derive(Debug, Clone, PartialEq)]
struct CompiledPattern {
	source: String,
	negated: bool,
	globs: Vec<Pattern>,
}

impl CompiledPattern {
	fn compile(source: &str) -> Result<Self, Error> {
		let (negated, body) = match source.strip_prefix('!') {
			Some(body) => (true, body),
			None => (false, source),
		};

		let globs = expand_braces(body)
			.iter()
			.map(|expanded| Pattern::new(&collapse_stars(expanded)))
			.collect::<Result<Vec<_>, _>>()
			.map_err(|e| Error::Pattern {
				source: e,
				pattern: source.to_string(),
			})?;

		Ok(Self {
			source: source.to_string(),
			negated,
			globs,
		})
	}

	fn matches(&self, key: &str) -> bool {
		self.globs.iter().any(|glob| glob.matches_with(key, MATCH_OPTIONS))
	}
}

/// An ordered, non-empty set of glob patterns. Patterns prefixed with `!`
/// exclude what earlier patterns included.
///
/// Beyond what [`glob::Pattern`] understands, `{a,b}` alternatives and
/// `{1..3}` ranges are expanded, and a `**` that is not a whole path segment
/// behaves like `*`.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternSet {
	patterns: Vec<CompiledPattern>,
}

impl Default for PatternSet {
	fn default() -> Self {
		Self::new([MATCH_ALL]).unwrap() // `**` is always a valid pattern
	}
}

impl PatternSet {
	pub fn new<I, S>(patterns: I) -> Result<Self, Error>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let patterns = patterns
			.into_iter()
			.map(|source| CompiledPattern::compile(source.as_ref()))
			.collect::<Result<Vec<_>, Error>>()?;

		if patterns.is_empty() {
			return Err(Error::Config("a rule needs at least one pattern".to_string()));
		}

		Ok(Self { patterns })
	}

	/// Whether `key` survives the patterns in order: a matching positive
	/// pattern includes it, a matching negation excludes it again.
	pub fn matches(&self, key: &str) -> bool {
		self.patterns.iter().fold(false, |matched, pattern| {
			if pattern.matches(key) {
				!pattern.negated
			} else {
				matched
			}
		})
	}

	pub fn patterns(&self) -> impl Iterator<Item = &str> {
		self.patterns.iter().map(|p| p.source.as_str())
	}

	pub fn len(&self) -> usize {
		self.patterns.len()
	}

	pub fn is_empty(&self) -> bool {
		self.patterns.is_empty()
	}
}

/// Expands the first brace group of `pattern` and recurses into each result.
/// Groups without a top-level comma or a numeric range stay literal.
fn expand_braces(pattern: &str) -> Vec<String> {
	let Some((open, close, alternatives)) = find_brace_group(pattern) else {
		return vec![pattern.to_string()];
	};

	let (prefix, suffix) = (&pattern[..open], &pattern[close + 1..]);
	alternatives
		.iter()
		.flat_map(|alternative| expand_braces(&format!("{prefix}{alternative}{suffix}")))
		.collect()
}

fn find_brace_group(pattern: &str) -> Option<(usize, usize, Vec<String>)> {
	for (open, _) in pattern.match_indices('{') {
		let mut depth = 0;
		let mut commas = Vec::new();
		let mut close = None;

		for (idx, c) in pattern[open..].char_indices() {
			match c {
				'{' => depth += 1,
				'}' => {
					depth -= 1;
					if depth == 0 {
						close = Some(open + idx);
						break;
					}
				}
				',' if depth == 1 => commas.push(open + idx),
				_ => {}
			}
		}

		let Some(close) = close else {
			continue;
		};

		if !commas.is_empty() {
			let bounds = std::iter::once(open).chain(commas).chain(std::iter::once(close));
			let alternatives = bounds
				.clone()
				.zip(bounds.skip(1))
				.map(|(start, end)| pattern[start + 1..end].to_string())
				.collect();
			return Some((open, close, alternatives));
		}

		if let Some(range) = numeric_range(&pattern[open + 1..close]) {
			return Some((open, close, range));
		}
	}
	None
}

fn numeric_range(body: &str) -> Option<Vec<String>> {
	let (start, end) = body.split_once("..")?;
	let (start, end) = (start.parse::<i64>().ok()?, end.parse::<i64>().ok()?);
	if start.abs_diff(end) >= MAX_RANGE_LEN {
		return None;
	}
	let values: Vec<i64> = if start <= end {
		(start..=end).collect()
	} else {
		(end..=start).rev().collect()
	};
	Some(values.iter().map(ToString::to_string).collect())
}

/// Turns every run of stars that is not a whole `**` segment into a single
/// `*`, so `**.md` reads as `*.md` instead of failing to compile.
fn collapse_stars(pattern: &str) -> String {
	pattern
		.split('/')
		.map(|segment| {
			if segment == "**" || !segment.contains("**") {
				return segment.to_string();
			}
			let mut collapsed = String::with_capacity(segment.len());
			for c in segment.chars() {
				if !(c == '*' && collapsed.ends_with('*')) {
					collapsed.push(c);
				}
			}
			collapsed
		})
		.collect::<Vec<_>>()
		.join("/")
}

#[cfg(test)]
mod tests {
	use super::*;

	fn set(patterns: &[&str]) -> PatternSet {
		PatternSet::new(patterns).unwrap()
	}

	#[test]
	fn match_all_by_default() {
		let all = PatternSet::default();
		assert!(all.matches("a.md"));
		assert!(all.matches("p/q/r/b.js"));
	}

	#[test]
	fn star_stays_within_a_segment() {
		let js = set(&["p/*.js"]);
		assert!(js.matches("p/b.js"));
		assert!(!js.matches("p/a.md"));
		assert!(!js.matches("p/q/b.js"));
		assert!(!js.matches("b.js"));
	}

	#[test]
	fn double_star_spans_segments() {
		let nested = set(&["p/**/*"]);
		assert!(nested.matches("p/a.md"));
		assert!(nested.matches("p/q/b.js"));
		assert!(!nested.matches("a.md"));
	}

	#[test]
	fn character_classes() {
		let classes = set(&["[ab].md"]);
		assert!(classes.matches("a.md"));
		assert!(!classes.matches("c.md"));
	}

	#[test]
	fn case_sensitive() {
		assert!(!set(&["*.MD"]).matches("a.md"));
	}

	#[test]
	fn any_pattern_matches() {
		let either = set(&["*.md", "*.html"]);
		assert!(either.matches("a.md"));
		assert!(either.matches("d.html"));
		assert!(!either.matches("c.css"));
	}

	#[test]
	fn negation_excludes() {
		let drafts = set(&["**/*.md", "!drafts/**"]);
		assert!(drafts.matches("posts/a.md"));
		assert!(!drafts.matches("drafts/b.md"));
	}

	#[test]
	fn later_patterns_can_include_again() {
		let patterns = set(&["**", "!p/**", "p/keep.md"]);
		assert!(patterns.matches("p/keep.md"));
		assert!(!patterns.matches("p/drop.md"));
	}

	#[test]
	fn only_negations_match_nothing() {
		assert!(!set(&["!*.md"]).matches("a.js"));
	}

	#[test]
	fn keeps_sources_in_order() {
		let patterns = set(&["*.md", "!x.md"]);
		assert_eq!(patterns.patterns().collect::<Vec<_>>(), vec!["*.md", "!x.md"]);
	}

	#[test]
	fn empty_set_is_rejected() {
		assert!(PatternSet::new(Vec::<String>::new()).unwrap_err().is_config());
	}

	#[test]
	fn invalid_glob_is_rejected() {
		assert!(matches!(PatternSet::new(["a/[b"]), Err(Error::Pattern { .. })));
		assert!(matches!(PatternSet::new(["!*.{md,[x}"]), Err(Error::Pattern { .. })));
	}

	#[test]
	fn brace_alternatives() {
		let pages = set(&["*.{md,html}"]);
		assert!(pages.matches("a.md"));
		assert!(pages.matches("d.html"));
		assert!(!pages.matches("c.css"));
		assert!(!pages.matches("p/a.md"));
	}

	#[test]
	fn nested_and_negated_braces() {
		let assets = set(&["{css,js/{vendor,app}}/*", "!**/*.{map,tmp}"]);
		assert!(assets.matches("css/site.css"));
		assert!(assets.matches("js/vendor/x.js"));
		assert!(assets.matches("js/app/y.js"));
		assert!(!assets.matches("js/app/y.js.map"));
		assert!(!assets.matches("js/lib/z.js"));
	}

	#[test]
	fn numeric_brace_ranges() {
		let years = set(&["{2014..2016}/*.md"]);
		assert!(years.matches("2015/a.md"));
		assert!(!years.matches("2017/a.md"));
		assert_eq!(expand_braces("{3..1}"), vec!["3", "2", "1"]);
	}

	#[test]
	fn braces_without_alternatives_are_literal() {
		assert_eq!(expand_braces("{a}.md"), vec!["{a}.md"]);
		assert_eq!(expand_braces("{a,b"), vec!["{a,b"]);
		assert!(set(&["{a}.md"]).matches("{a}.md"));
	}

	#[test]
	fn partial_double_star_acts_like_star() {
		let md = set(&["**.md"]);
		assert!(md.matches("a.md"));
		assert!(!md.matches("p/a.md"));
		assert!(set(&["p/***"]).matches("p/a.md"));
		assert_eq!(collapse_stars("**/a**b/**"), "**/a*b/**");
	}

	#[test]
	fn wildcards_skip_dotfiles() {
		let all = PatternSet::default();
		assert!(!all.matches(".htaccess"));
		assert!(!all.matches("p/.htaccess"));
		assert!(!all.matches(".git/config"));
		assert!(!set(&["*.md"]).matches(".x.md"));
		assert!(set(&["p/.htaccess"]).matches("p/.htaccess"));
		assert!(set(&["**/.*"]).matches("p/.htaccess"));
	}
}
