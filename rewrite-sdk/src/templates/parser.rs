use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
	static ref KEY_PATH_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_]+(?:\.[A-Za-z0-9_]+)*$").unwrap();
}

/// A dotted lookup path such as `path.base` or `site.author.name`.
#[derive(Debug, PartialEq, Clone, Eq)]
pub struct KeyPath {
	pub parts: Vec<String>,
}

impl KeyPath {
	pub fn parse(content: &str) -> Result<Self, TemplateError> {
		if !KEY_PATH_REGEX.is_match(content) {
			return Err(TemplateError::InvalidPlaceholder {
				content: content.to_string(),
			});
		}
		Ok(Self {
			parts: content.split('.').map(str::to_string).collect(),
		})
	}
}

impl fmt::Display for KeyPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.parts.join("."))
	}
}

#[derive(Debug, PartialEq, Clone, Eq)]
pub enum Segment {
	Literal(String),
	Placeholder(KeyPath),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TemplateError {
	#[error("Mismatched delimiters: found '{{' with no closing '}}' at position {position}")]
	MismatchedDelimiters { position: usize },

	#[error("Unexpected '}}' at position {position}")]
	UnexpectedClosingBrace { position: usize },

	#[error("Invalid placeholder '{{{content}}}': expected a dotted key such as {{path.base}}")]
	InvalidPlaceholder { content: String },
}

impl TemplateError {
	pub fn is_mismatched_delimiters(&self) -> bool {
		matches!(self, TemplateError::MismatchedDelimiters { .. } | TemplateError::UnexpectedClosingBrace { .. })
	}

	pub fn is_invalid_placeholder(&self) -> bool {
		matches!(self, TemplateError::InvalidPlaceholder { .. })
	}
}

/// Splits a template into literal text and `{dotted.key}` placeholders.
pub fn parse(s: &str) -> Result<Vec<Segment>, TemplateError> {
	let mut segments = Vec::new();
	let mut input = s;
	let mut offset = 0;

	while !input.is_empty() {
		let Some(delim) = input.find(|c| c == '{' || c == '}') else {
			// No more braces, the rest of the string is a literal
			segments.push(Segment::Literal(input.to_string()));
			break;
		};

		if input[delim..].starts_with('}') {
			return Err(TemplateError::UnexpectedClosingBrace { position: offset + delim });
		}

		if delim > 0 {
			segments.push(Segment::Literal(input[..delim].to_string()));
		}

		let content_start = delim + 1;
		let Some(content_len) = input[content_start..].find('}') else {
			return Err(TemplateError::MismatchedDelimiters { position: offset + delim });
		};
		let content = &input[content_start..content_start + content_len];
		if content.contains('{') {
			return Err(TemplateError::MismatchedDelimiters { position: offset + delim });
		}

		segments.push(Segment::Placeholder(KeyPath::parse(content)?));

		let consumed = content_start + content_len + 1;
		offset += consumed;
		input = &input[consumed..];
	}

	Ok(segments)
}
