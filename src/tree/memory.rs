//! In-memory tree keyed by relative path.

use crate::error::{Result, TransformError};
use crate::tree::{EntryKind, TreeEntry, TreeSink, TreeSource, ancestors};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
	Directory,
	File(Vec<u8>),
}

/// A tree held entirely in memory.
///
/// Keys are relative paths without leading or trailing `/`. Every key's
/// parent directories are present as `Directory` nodes, and `BTreeMap`
/// ordering places a directory before everything below it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryTree {
	nodes: BTreeMap<String, Node>,
}

impl MemoryTree {
	pub fn new() -> Self {
		Self::default()
	}

	/// Build a tree from `(path, content)` pairs.
	pub fn from_files<I, P, C>(files: I) -> Result<Self>
	where
		I: IntoIterator<Item = (P, C)>,
		P: AsRef<str>,
		C: AsRef<[u8]>,
	{
		let mut tree = MemoryTree::new();
		for (path, content) in files {
			tree.insert_file(path.as_ref(), content.as_ref())?;
		}
		Ok(tree)
	}

	/// Insert a file, creating implied parent directories.
	///
	/// Fails if `relative_path` is already a directory or lies below a file.
	pub fn insert_file(&mut self, relative_path: &str, content: &[u8]) -> Result<()> {
		if self.nodes.get(relative_path) == Some(&Node::Directory) {
			return Err(kind_conflict(relative_path));
		}
		self.insert_parents(relative_path)?;
		self.nodes
			.insert(relative_path.to_string(), Node::File(content.to_vec()));
		Ok(())
	}

	/// Insert an (empty) directory, creating implied parents.
	pub fn insert_dir(&mut self, relative_path: &str) -> Result<()> {
		if matches!(self.nodes.get(relative_path), Some(Node::File(_))) {
			return Err(kind_conflict(relative_path));
		}
		self.insert_parents(relative_path)?;
		self.nodes
			.entry(relative_path.to_string())
			.or_insert(Node::Directory);
		Ok(())
	}

	fn insert_parents(&mut self, relative_path: &str) -> Result<()> {
		if let Some(file) = ancestors(relative_path)
			.find(|parent| matches!(self.nodes.get(*parent), Some(Node::File(_))))
		{
			return Err(kind_conflict(file));
		}
		for parent in ancestors(relative_path) {
			self.nodes
				.entry(parent.to_string())
				.or_insert(Node::Directory);
		}
		Ok(())
	}

	/// Content of a file, if present.
	pub fn file(&self, relative_path: &str) -> Option<&[u8]> {
		match self.nodes.get(relative_path) {
			Some(Node::File(content)) => Some(content),
			_ => None,
		}
	}

	/// Content of a file as UTF-8 text, if present and valid.
	pub fn file_str(&self, relative_path: &str) -> Option<&str> {
		self.file(relative_path)
			.and_then(|content| std::str::from_utf8(content).ok())
	}

	pub fn contains(&self, relative_path: &str) -> bool {
		self.nodes.contains_key(relative_path)
	}

	/// Every path in sorted order, directories suffixed with `/`.
	pub fn listing(&self) -> Vec<String> {
		let mut listing: Vec<String> = self
			.nodes
			.iter()
			.map(|(path, node)| match node {
				Node::Directory => format!("{path}/"),
				Node::File(_) => path.clone(),
			})
			.collect();
		listing.sort();
		listing
	}

	/// File paths only, in sorted order.
	pub fn files(&self) -> Vec<&str> {
		self.nodes
			.iter()
			.filter(|(_, node)| matches!(node, Node::File(_)))
			.map(|(path, _)| path.as_str())
			.collect()
	}
}

fn kind_conflict(path: &str) -> TransformError {
	TransformError::PathKindConflict {
		path: path.to_string(),
	}
}

impl TreeSource for MemoryTree {
	fn entries(&self) -> Result<Vec<TreeEntry>> {
		Ok(self
			.nodes
			.iter()
			.map(|(path, node)| TreeEntry {
				relative_path: path.clone(),
				kind: match node {
					Node::Directory => EntryKind::Directory,
					Node::File(_) => EntryKind::File,
				},
			})
			.collect())
	}

	fn read(&self, relative_path: &str) -> Result<Vec<u8>> {
		self.file(relative_path)
			.map(<[u8]>::to_vec)
			.ok_or_else(|| TransformError::EntryNotFound {
				path: relative_path.to_string(),
			})
	}
}

impl TreeSink for MemoryTree {
	fn create_dir(&mut self, relative_path: &str) -> Result<()> {
		self.insert_dir(relative_path)
	}

	fn write_file(&mut self, relative_path: &str, content: &[u8]) -> Result<()> {
		self.insert_file(relative_path, content)
	}
}
