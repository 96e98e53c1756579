use chrono::{
	format::{Item, StrftimeItems},
	DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc,
};

use crate::{error::Error, templates::value::Value};

pub const DEFAULT_DATE_FORMAT: &str = "YYYY/MM";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
	Strftime(&'static str),
	OrdinalDay,
}

// Longest tokens first so `YYYY` is not read as two `YY`.
const TOKENS: &[(&str, Token)] = &[
	("YYYY", Token::Strftime("%Y")),
	("YY", Token::Strftime("%y")),
	("MMMM", Token::Strftime("%B")),
	("MMM", Token::Strftime("%b")),
	("MM", Token::Strftime("%m")),
	("M", Token::Strftime("%-m")),
	("DDDD", Token::Strftime("%j")),
	("DDD", Token::Strftime("%-j")),
	("DD", Token::Strftime("%d")),
	("Do", Token::OrdinalDay),
	("D", Token::Strftime("%-d")),
	("dddd", Token::Strftime("%A")),
	("ddd", Token::Strftime("%a")),
	("HH", Token::Strftime("%H")),
	("H", Token::Strftime("%-H")),
	("hh", Token::Strftime("%I")),
	("h", Token::Strftime("%-I")),
	("mm", Token::Strftime("%M")),
	("m", Token::Strftime("%-M")),
	("ss", Token::Strftime("%S")),
	("s", Token::Strftime("%-S")),
	("SSS", Token::Strftime("%3f")),
	("A", Token::Strftime("%p")),
	("a", Token::Strftime("%P")),
	("X", Token::Strftime("%s")),
	("ZZ", Token::Strftime("%z")),
	("Z", Token::Strftime("%:z")),
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
	Strftime(String),
	OrdinalDay,
}

/// A compiled date format written with moment-style tokens (`YYYY/MM`,
/// `YYYY-MM-DD HH:mm`, `MMMM Do`). Text inside `[...]` is copied literally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
	spec: String,
	pieces: Vec<Piece>,
}

impl Default for DateFormat {
	fn default() -> Self {
		// the default format contains only known tokens
		Self::parse(DEFAULT_DATE_FORMAT).unwrap()
	}
}

impl DateFormat {
	pub fn parse(spec: &str) -> Result<Self, Error> {
		let mut pieces = Vec::new();
		let mut strftime = String::with_capacity(spec.len() * 2);
		let mut rest = spec;

		while let Some(c) = rest.chars().next() {
			if c == '[' {
				let Some(end) = rest.find(']') else {
					return Err(Error::Config(format!("unterminated `[` in date format `{spec}`")));
				};
				push_literal(&mut strftime, &rest[1..end]);
				rest = &rest[end + 1..];
				continue;
			}

			match TOKENS.iter().find(|(token, _)| rest.starts_with(token)) {
				Some((token, Token::Strftime(replacement))) => {
					strftime.push_str(replacement);
					rest = &rest[token.len()..];
				}
				Some((token, Token::OrdinalDay)) => {
					flush(&mut pieces, &mut strftime);
					pieces.push(Piece::OrdinalDay);
					rest = &rest[token.len()..];
				}
				None => {
					push_literal(&mut strftime, &rest[..c.len_utf8()]);
					rest = &rest[c.len_utf8()..];
				}
			}
		}
		flush(&mut pieces, &mut strftime);

		let invalid = pieces.iter().any(|piece| match piece {
			Piece::Strftime(format) => StrftimeItems::new(format).any(|item| matches!(item, Item::Error)),
			Piece::OrdinalDay => false,
		});
		if invalid {
			return Err(Error::Config(format!("invalid date format `{spec}`")));
		}

		Ok(Self {
			spec: spec.to_string(),
			pieces,
		})
	}

	pub fn spec(&self) -> &str {
		&self.spec
	}

	/// Formats a date-like value in UTC. Returns `None` if the value cannot be
	/// read as a date.
	pub fn format(&self, value: &Value) -> Option<String> {
		let date = to_datetime(value)?;
		Some(
			self.pieces
				.iter()
				.map(|piece| match piece {
					Piece::Strftime(format) => date.format(format).to_string(),
					Piece::OrdinalDay => ordinal(date.day()),
				})
				.collect(),
		)
	}
}

fn flush(pieces: &mut Vec<Piece>, strftime: &mut String) {
	if !strftime.is_empty() {
		pieces.push(Piece::Strftime(std::mem::take(strftime)));
	}
}

fn ordinal(n: u32) -> String {
	let suffix = match (n % 10, n % 100) {
		(_, 11..=13) => "th",
		(1, _) => "st",
		(2, _) => "nd",
		(3, _) => "rd",
		_ => "th",
	};
	format!("{n}{suffix}")
}

fn push_literal(buf: &mut String, text: &str) {
	buf.push_str(&text.replace('%', "%%"));
}

/// Interprets metadata as a UTC timestamp: native dates, epoch milliseconds,
/// RFC 3339 strings, or naive date(-time) strings taken as UTC.
pub fn to_datetime(value: &Value) -> Option<DateTime<Utc>> {
	match value {
		Value::Date(date) => Some(*date),
		Value::Number(millis) if millis.is_finite() => Utc.timestamp_millis_opt(*millis as i64).single(),
		Value::String(s) => parse_date_str(s.trim()),
		_ => None,
	}
}

fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
	if let Ok(date) = DateTime::parse_from_rfc3339(s) {
		return Some(date.with_timezone(&Utc));
	}

	for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
		if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
			return Some(naive.and_utc());
		}
	}

	NaiveDate::parse_from_str(s, "%Y-%m-%d")
		.ok()
		.and_then(|date| date.and_hms_opt(0, 0, 0))
		.map(|naive| naive.and_utc())
}
