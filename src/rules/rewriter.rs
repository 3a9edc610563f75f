use crate::error::{Result, TransformError};
use regex::Regex;

/// Parsed substitution command (sed-like syntax).
#[derive(Debug, Clone)]
pub struct Substitution {
	/// The pattern to match.
	pub pattern: Regex,

	/// The replacement string.
	pub replacement: String,

	/// Whether to replace all occurrences (global flag).
	pub global: bool,
}

impl Substitution {
	/// Parse a substitution string in sed-like format: "s/pattern/replacement/" or "s/pattern/replacement/g"
	pub fn parse(input: &str) -> Result<Self> {
		let invalid = |reason| TransformError::InvalidSubstitution {
			input: input.to_string(),
			reason,
		};

		let mut chars = input.chars();
		if chars.next() != Some('s') {
			return Err(invalid("substitution must start with 's'"));
		}

		// The character after 's' is the delimiter
		let delimiter = chars.next().ok_or_else(|| invalid("substitution too short"))?;
		let body = &input[1 + delimiter.len_utf8()..];

		let parts = split_by_delimiter(body, delimiter);
		if parts.len() < 2 {
			return Err(invalid("substitution must have pattern and replacement"));
		}

		let pattern_str = &parts[0];
		let replacement = parts[1].clone();
		let flags = parts.get(2).map(String::as_str).unwrap_or("");

		if let Some(flag) = flags.chars().find(|c| *c != 'g') {
			tracing::debug!(input, flag = %flag, "unknown substitution flag");
			return Err(invalid("only the 'g' flag is supported"));
		}

		let pattern = Regex::new(pattern_str).map_err(|source| TransformError::InvalidRegex {
			pattern: pattern_str.to_string(),
			source,
		})?;

		Ok(Substitution {
			pattern,
			replacement,
			global: flags.contains('g'),
		})
	}

	/// Apply this substitution to a string.
	pub fn apply(&self, input: &str) -> String {
		if self.global {
			self.pattern
				.replace_all(input, &self.replacement)
				.to_string()
		} else {
			self.pattern.replace(input, &self.replacement).to_string()
		}
	}

	/// Apply this substitution, returning `None` when nothing was replaced.
	pub fn apply_if_matched(&self, input: &str) -> Option<String> {
		if self.pattern.is_match(input) {
			Some(self.apply(input))
		} else {
			None
		}
	}
}

/// Split a string by a delimiter, respecting backslash escapes.
fn split_by_delimiter(input: &str, delimiter: char) -> Vec<String> {
	let mut parts = Vec::new();
	let mut current = String::new();
	let mut chars = input.chars().peekable();

	while let Some(c) = chars.next() {
		if c == '\\' && chars.peek() == Some(&delimiter) {
			// Escaped delimiter is kept literally
			current.push(delimiter);
			chars.next();
		} else if c == delimiter {
			parts.push(std::mem::take(&mut current));
		} else {
			current.push(c);
		}
	}

	if !current.is_empty() {
		parts.push(current);
	}

	parts
}
