use crate::engine::ExtensionGate;
use crate::error::{HookError, Result, TransformError};
use crate::hooks::HookKind;
use crate::rules::matcher::{MatchBasis, Pattern};
use std::fmt;
use std::sync::Arc;

/// Content hook: `(content, resolved output path) -> new content`, `None` for no change.
pub type TransformFn =
	dyn Fn(&[u8], &str) -> std::result::Result<Option<Vec<u8>>, HookError> + Send + Sync;

/// Path hook: `(current path) -> new path`, `None` for no change.
pub type RenameFn = dyn Fn(&str) -> std::result::Result<Option<String>, HookError> + Send + Sync;

/// A pattern with optional content and path hooks.
///
/// Rules are plain data: cloning one shares its hooks.
#[derive(Clone)]
pub struct Rule {
	pattern: Pattern,
	transform: Option<Arc<TransformFn>>,
	rename: Option<Arc<RenameFn>>,
}

impl Rule {
	/// Create a rule with no hooks. It matches but changes nothing.
	pub fn new(pattern: &str) -> Result<Self> {
		Ok(Rule {
			pattern: Pattern::new(pattern)?,
			transform: None,
			rename: None,
		})
	}

	pub fn with_transform<F>(mut self, transform: F) -> Self
	where
		F: Fn(&[u8], &str) -> std::result::Result<Option<Vec<u8>>, HookError>
			+ Send
			+ Sync
			+ 'static,
	{
		self.transform = Some(Arc::new(transform));
		self
	}

	pub fn with_rename<F>(mut self, rename: F) -> Self
	where
		F: Fn(&str) -> std::result::Result<Option<String>, HookError> + Send + Sync + 'static,
	{
		self.rename = Some(Arc::new(rename));
		self
	}

	pub fn pattern(&self) -> &Pattern {
		&self.pattern
	}

	pub fn has_transform(&self) -> bool {
		self.transform.is_some()
	}

	pub fn has_rename(&self) -> bool {
		self.rename.is_some()
	}

	/// Check if this rule's pattern matches a relative path.
	pub fn matches(&self, relative_path: &str) -> bool {
		self.pattern.matches(relative_path)
	}

	/// Run the rename hook, if any. Hook errors are wrapped, never swallowed.
	pub fn apply_rename(&self, path: &str) -> Result<Option<String>> {
		let Some(rename) = &self.rename else {
			return Ok(None);
		};

		tracing::trace!(pattern = self.pattern.as_str(), path, "rename hook");
		rename(path).map_err(|source| self.hook_failed(HookKind::Rename, path, source))
	}

	/// Run the transform hook, if any.
	pub fn apply_transform(&self, content: &[u8], path: &str) -> Result<Option<Vec<u8>>> {
		let Some(transform) = &self.transform else {
			return Ok(None);
		};

		tracing::trace!(pattern = self.pattern.as_str(), path, "transform hook");
		transform(content, path).map_err(|source| self.hook_failed(HookKind::Transform, path, source))
	}

	fn hook_failed(&self, kind: HookKind, path: &str, source: HookError) -> TransformError {
		TransformError::HookFailed {
			kind,
			pattern: self.pattern.as_str().to_string(),
			path: path.to_string(),
			source,
		}
	}
}

impl fmt::Debug for Rule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Rule")
			.field("pattern", &self.pattern.as_str())
			.field("transform", &self.transform.is_some())
			.field("rename", &self.rename.is_some())
			.finish()
	}
}

/// Ordered rules plus the settings that decide which files they see.
#[derive(Debug, Clone)]
pub struct RuleSet {
	rules: Vec<Rule>,
	gate: ExtensionGate,
	enabled: bool,
	basis: MatchBasis,
}

impl RuleSet {
	/// Rules in cascade order, default extensions, enabled, original-path matching.
	pub fn new(rules: Vec<Rule>) -> Self {
		RuleSet {
			rules,
			gate: ExtensionGate::default(),
			enabled: true,
			basis: MatchBasis::default(),
		}
	}

	pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		self.gate = ExtensionGate::new(extensions);
		self
	}

	/// Set the relevance flag. A disabled rule set passes every file through.
	pub fn enabled(mut self, enabled: bool) -> Self {
		self.enabled = enabled;
		self
	}

	pub fn with_match_basis(mut self, basis: MatchBasis) -> Self {
		self.basis = basis;
		self
	}

	pub fn rules(&self) -> &[Rule] {
		&self.rules
	}

	pub fn gate(&self) -> &ExtensionGate {
		&self.gate
	}

	pub fn is_enabled(&self) -> bool {
		self.enabled
	}

	pub fn match_basis(&self) -> MatchBasis {
		self.basis
	}
}

impl Default for RuleSet {
	fn default() -> Self {
		RuleSet::new(Vec::new())
	}
}
