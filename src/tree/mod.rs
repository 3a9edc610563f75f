//! Input and output trees for the assembler.
//!
//! This module handles:
//! - The read-only snapshot interface the assembler enumerates
//! - The write interface resolved files are handed to
//! - An in-memory tree and an on-disk tree implementing both

pub mod dir;
pub mod memory;

pub use dir::DirTree;
pub use memory::MemoryTree;

use crate::error::Result;
use std::path::PathBuf;

/// Kind of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
	File,
	Directory,
}

/// One node of an input tree, addressed by its `/`-separated relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
	pub relative_path: String,
	pub kind: EntryKind,
}

impl TreeEntry {
	pub fn file(relative_path: impl Into<String>) -> Self {
		TreeEntry {
			relative_path: relative_path.into(),
			kind: EntryKind::File,
		}
	}

	pub fn directory(relative_path: impl Into<String>) -> Self {
		TreeEntry {
			relative_path: relative_path.into(),
			kind: EntryKind::Directory,
		}
	}

	pub fn is_directory(&self) -> bool {
		self.kind == EntryKind::Directory
	}
}

/// A read-only tree snapshot.
pub trait TreeSource {
	/// Every node except the root, parents before children, in an order that
	/// is stable for the lifetime of the snapshot.
	fn entries(&self) -> Result<Vec<TreeEntry>>;

	/// Raw bytes of a file.
	fn read(&self, relative_path: &str) -> Result<Vec<u8>>;

	/// Location of a file on the host filesystem, when there is one.
	fn host_path(&self, _relative_path: &str) -> Option<PathBuf> {
		None
	}
}

/// A tree that resolved files are written into.
pub trait TreeSink {
	fn create_dir(&mut self, relative_path: &str) -> Result<()>;

	/// Write a file, creating any missing parent directories.
	fn write_file(&mut self, relative_path: &str, content: &[u8]) -> Result<()>;

	/// Copy a file's raw bytes from `source` without interpreting them.
	fn copy_file(&mut self, source: &dyn TreeSource, from: &str, to: &str) -> Result<()> {
		let content = source.read(from)?;
		self.write_file(to, &content)
	}
}

/// Parent directories of a relative path, outermost first.
pub(crate) fn ancestors(relative_path: &str) -> impl Iterator<Item = &str> {
	relative_path
		.match_indices('/')
		.map(move |(idx, _)| &relative_path[..idx])
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_ancestors() {
		let parents: Vec<_> = ancestors("a/b/c.html").collect();
		assert_eq!(parents, vec!["a", "a/b"]);
		assert_eq!(ancestors("index.html").count(), 0);
	}

	#[test]
	fn test_tree_entry_constructors() {
		assert!(TreeEntry::directory("somewhere").is_directory());
		assert!(!TreeEntry::file("index.html").is_directory());
	}
}
