use crate::engine::resolve::{resolve_content, resolve_path};
use crate::error::{Result, TransformError};
use crate::rules::{MatchSet, RuleSet, compute_match_set};
use crate::tree::{TreeSink, TreeSource, ancestors};
use std::collections::HashSet;
use std::fmt;

/// Where a file goes and what it holds once its rules have run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
	/// Path in the input tree.
	pub source: String,

	/// Path in the output tree.
	pub destination: String,

	/// New content, or `None` to copy the raw bytes untouched.
	pub content: Option<Vec<u8>>,
}

impl ResolvedFile {
	fn passthrough(relative_path: &str) -> Self {
		ResolvedFile {
			source: relative_path.to_string(),
			destination: relative_path.to_string(),
			content: None,
		}
	}

	pub fn is_renamed(&self) -> bool {
		self.source != self.destination
	}

	pub fn is_transformed(&self) -> bool {
		self.content.is_some()
	}

	pub fn is_passthrough(&self) -> bool {
		!self.is_renamed() && !self.is_transformed()
	}
}

/// Destination of a file, resolved without touching its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePlan {
	pub source: String,
	pub destination: String,

	/// Number of rules whose pattern matched; zero for ineligible files.
	pub matched_rules: usize,

	/// Whether any matched rule would rewrite the content.
	pub transforms: bool,
}

/// Counts reported after a full pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
	pub directories: usize,
	pub files: usize,
	pub renamed: usize,
	pub transformed: usize,
	pub unchanged: usize,
}

impl fmt::Display for BuildSummary {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} files ({} transformed, {} renamed, {} unchanged), {} directories",
			self.files,
			self.transformed,
			self.renamed,
			self.unchanged,
			self.directories
		)
	}
}

/// Output paths claimed during a pass, by kind.
///
/// A path is never both a file and a directory, and nothing lives below a file.
#[derive(Debug, Default)]
struct OutputLayout {
	files: HashSet<String>,
	directories: HashSet<String>,
}

impl OutputLayout {
	fn claim_directory(&mut self, path: &str) -> Result<()> {
		if ancestors(path)
			.chain(std::iter::once(path))
			.any(|dir| self.files.contains(dir))
		{
			return Err(collision(path));
		}
		self.directories.insert(path.to_string());
		Ok(())
	}

	fn claim_file(&mut self, path: &str) -> Result<()> {
		if self.files.contains(path)
			|| self.directories.contains(path)
			|| ancestors(path).any(|dir| self.files.contains(dir))
		{
			return Err(collision(path));
		}
		for dir in ancestors(path) {
			self.directories.insert(dir.to_string());
		}
		self.files.insert(path.to_string());
		Ok(())
	}
}

fn collision(path: &str) -> TransformError {
	TransformError::OutputCollision {
		path: path.to_string(),
	}
}

/// Drives the per-file resolution over a whole tree.
#[derive(Debug, Clone, Copy)]
pub struct TreeAssembler<'a> {
	rules: &'a RuleSet,
}

impl<'a> TreeAssembler<'a> {
	pub fn new(rules: &'a RuleSet) -> Self {
		TreeAssembler { rules }
	}

	/// The rules that apply to a file, empty when the file is not eligible.
	pub fn match_set(&self, relative_path: &str) -> Result<MatchSet<'a>> {
		if !self.rules.is_enabled() || !self.rules.gate().is_eligible(relative_path) {
			return Ok(MatchSet::default());
		}

		compute_match_set(self.rules.rules(), relative_path, self.rules.match_basis())
	}

	/// Resolve a file's destination and content.
	///
	/// `load` is only called when a matched rule rewrites content.
	pub fn resolve_file<F>(&self, relative_path: &str, load: F) -> Result<ResolvedFile>
	where
		F: FnOnce() -> Result<Vec<u8>>,
	{
		let matched = self.match_set(relative_path)?;
		if matched.is_empty() {
			tracing::debug!(path = relative_path, "passthrough");
			return Ok(ResolvedFile::passthrough(relative_path));
		}

		let destination = resolve_path(relative_path, &matched)?;
		let content = resolve_content(relative_path, &matched, load)?;

		tracing::debug!(
			path = relative_path,
			destination = %destination,
			rules = matched.len(),
			transformed = content.is_some(),
			"resolved"
		);

		Ok(ResolvedFile {
			source: relative_path.to_string(),
			destination,
			content,
		})
	}

	/// Resolve only the destination of a file. Content is never loaded.
	pub fn plan_file(&self, relative_path: &str) -> Result<FilePlan> {
		let matched = self.match_set(relative_path)?;
		let destination = resolve_path(relative_path, &matched)?;

		Ok(FilePlan {
			source: relative_path.to_string(),
			destination,
			matched_rules: matched.len(),
			transforms: matched.has_transforms(),
		})
	}

	/// Plan every file of a tree, in enumeration order.
	pub fn plan(&self, source: &dyn TreeSource) -> Result<Vec<FilePlan>> {
		source
			.entries()?
			.iter()
			.filter(|entry| !entry.is_directory())
			.map(|entry| self.plan_file(&entry.relative_path))
			.collect()
	}

	/// Hand a resolved file to the sink.
	pub fn emit(
		&self,
		source: &dyn TreeSource,
		sink: &mut dyn TreeSink,
		resolved: &ResolvedFile,
	) -> Result<()> {
		match &resolved.content {
			Some(content) => sink.write_file(&resolved.destination, content),
			None => sink.copy_file(source, &resolved.source, &resolved.destination),
		}
	}

	/// Mirror every directory and resolve and emit every file of `source`.
	///
	/// The first error aborts the pass; the failing file produces no output.
	/// Destinations are checked against every path already written, so a file
	/// landing on a directory, or below another file, is an output collision.
	pub fn run(&self, source: &dyn TreeSource, sink: &mut dyn TreeSink) -> Result<BuildSummary> {
		let mut summary = BuildSummary::default();
		let mut layout = OutputLayout::default();

		for entry in source.entries()? {
			let path = entry.relative_path.as_str();

			if entry.is_directory() {
				layout.claim_directory(path)?;
				sink.create_dir(path)?;
				summary.directories += 1;
				continue;
			}

			let resolved = self.resolve_file(path, || source.read(path))?;
			layout.claim_file(&resolved.destination)?;

			self.emit(source, sink, &resolved)?;

			summary.files += 1;
			if resolved.is_renamed() {
				summary.renamed += 1;
			}
			if resolved.is_transformed() {
				summary.transformed += 1;
			}
			if resolved.is_passthrough() {
				summary.unchanged += 1;
			}
		}

		tracing::info!(
			files = summary.files,
			transformed = summary.transformed,
			renamed = summary.renamed,
			directories = summary.directories,
			"tree assembled"
		);

		Ok(summary)
	}
}
