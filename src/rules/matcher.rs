use crate::error::{Result, TransformError};
use crate::rules::rule::Rule;
use globset::{GlobBuilder, GlobMatcher};
use serde::Deserialize;
use std::fmt;

/// A compiled glob pattern, matched against full relative paths.
///
/// `*` and `?` never cross a `/`, so `"index.html"` only targets the root-level
/// file and `"*"` only the files directly at the root. Use `**` to reach
/// into subdirectories.
#[derive(Clone)]
pub struct Pattern {
	source: String,
	matcher: GlobMatcher,
}

impl Pattern {
	/// Compile a glob pattern string.
	pub fn new(pattern: &str) -> Result<Self> {
		let glob = GlobBuilder::new(pattern)
			.literal_separator(true)
			.backslash_escape(true)
			.build()
			.map_err(|source| TransformError::InvalidPattern {
				pattern: pattern.to_string(),
				source,
			})?;

		Ok(Pattern {
			source: pattern.to_string(),
			matcher: glob.compile_matcher(),
		})
	}

	/// The pattern as written in configuration.
	pub fn as_str(&self) -> &str {
		&self.source
	}

	/// Check if a relative path (with `/` separators) matches this pattern.
	pub fn matches(&self, relative_path: &str) -> bool {
		self.matcher.is_match(relative_path)
	}
}

impl fmt::Debug for Pattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Pattern").field(&self.source).finish()
	}
}

/// Compile `pattern` and test it against `relative_path` in one go.
pub fn matches(pattern: &str, relative_path: &str) -> Result<bool> {
	Ok(Pattern::new(pattern)?.matches(relative_path))
}

/// Which path later rules in a cascade are matched against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchBasis {
	/// Every rule is matched against the file's input path.
	#[default]
	Original,

	/// Each rule is matched against the path produced by the renames of the
	/// rules that joined the match set before it.
	Renamed,
}

impl MatchBasis {
	pub fn as_str(&self) -> &'static str {
		match self {
			MatchBasis::Original => "original",
			MatchBasis::Renamed => "renamed",
		}
	}
}

/// The ordered rules that apply to one file.
#[derive(Debug, Clone, Default)]
pub struct MatchSet<'a> {
	rules: Vec<&'a Rule>,
}

impl<'a> MatchSet<'a> {
	/// Build a match set from rules already known to apply, in cascade order.
	pub fn from_rules(rules: Vec<&'a Rule>) -> Self {
		MatchSet { rules }
	}

	pub fn iter(&self) -> impl Iterator<Item = &'a Rule> + '_ {
		self.rules.iter().copied()
	}

	pub fn len(&self) -> usize {
		self.rules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}

	/// Whether any rule in the set carries a content hook.
	pub fn has_transforms(&self) -> bool {
		self.rules.iter().any(|rule| rule.has_transform())
	}

	/// Whether any rule in the set carries a path hook.
	pub fn has_renames(&self) -> bool {
		self.rules.iter().any(|rule| rule.has_rename())
	}
}

/// Collect, in configured order, the rules whose pattern matches the
/// original relative path.
pub fn match_set<'a>(rules: &'a [Rule], relative_path: &str) -> MatchSet<'a> {
	MatchSet::from_rules(
		rules
			.iter()
			.filter(|rule| rule.matches(relative_path))
			.collect(),
	)
}

/// Collect the match set using the path as renamed so far.
///
/// Rename hooks of joining rules are invoked while walking, so this can fail
/// with a hook error.
pub fn match_set_renamed<'a>(rules: &'a [Rule], relative_path: &str) -> Result<MatchSet<'a>> {
	let mut current = relative_path.to_string();
	let mut matched = Vec::new();

	for rule in rules {
		if !rule.matches(&current) {
			continue;
		}
		if let Some(renamed) = rule.apply_rename(&current)? {
			current = renamed;
		}
		matched.push(rule);
	}

	Ok(MatchSet::from_rules(matched))
}

/// Compute the match set for `relative_path` under the given basis.
pub fn compute_match_set<'a>(
	rules: &'a [Rule],
	relative_path: &str,
	basis: MatchBasis,
) -> Result<MatchSet<'a>> {
	match basis {
		MatchBasis::Original => Ok(match_set(rules, relative_path)),
		MatchBasis::Renamed => match_set_renamed(rules, relative_path),
	}
}
