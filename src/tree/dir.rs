//! Tree backed by a directory on the host filesystem.

use crate::error::{Result, TransformError};
use crate::tree::{EntryKind, TreeEntry, TreeSink, TreeSource};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A directory tree rooted at `root`.
///
/// As a source, entries are enumerated depth-first sorted by file name, so
/// the order is stable across runs. Every name must be valid UTF-8. As a sink, writes create missing parent
/// directories.
#[derive(Debug, Clone)]
pub struct DirTree {
	root: PathBuf,
}

impl DirTree {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		DirTree { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Host path of a relative path inside this tree.
	pub fn resolve(&self, relative_path: &str) -> PathBuf {
		relative_path
			.split('/')
			.fold(self.root.clone(), |path, segment| path.join(segment))
	}

	fn create_parent(&self, target: &Path) -> Result<()> {
		if let Some(parent) = target.parent() {
			fs::create_dir_all(parent).map_err(|source| TransformError::TreeIo {
				path: parent.to_path_buf(),
				source,
			})?;
		}
		Ok(())
	}
}

/// Relative path with `/` separators, whatever the host uses.
/// Names that are not valid UTF-8 are an error, never a lossy key.
fn relative_key(root: &Path, path: &Path) -> Result<String> {
	let relative = path.strip_prefix(root).unwrap_or(path);
	let mut segments = Vec::new();

	for component in relative.components() {
		let segment = component
			.as_os_str()
			.to_str()
			.ok_or_else(|| TransformError::NonUtf8Path {
				path: path.to_path_buf(),
			})?;
		segments.push(segment);
	}

	Ok(segments.join("/"))
}

impl TreeSource for DirTree {
	fn entries(&self) -> Result<Vec<TreeEntry>> {
		let mut entries = Vec::new();

		// Symlinks are followed: a linked directory is mirrored as a directory
		// and a linked file is copied as a file.
		let walker = WalkDir::new(&self.root)
			.min_depth(1)
			.follow_links(true)
			.sort_by_file_name();

		for entry in walker {
			let entry = entry.map_err(|source| TransformError::WalkFailed {
				root: self.root.clone(),
				source,
			})?;

			let relative_path = relative_key(&self.root, entry.path())?;
			let kind = if entry.file_type().is_dir() {
				EntryKind::Directory
			} else {
				EntryKind::File
			};

			entries.push(TreeEntry {
				relative_path,
				kind,
			});
		}

		Ok(entries)
	}

	fn read(&self, relative_path: &str) -> Result<Vec<u8>> {
		let path = self.resolve(relative_path);
		fs::read(&path).map_err(|source| TransformError::TreeIo { path, source })
	}

	fn host_path(&self, relative_path: &str) -> Option<PathBuf> {
		Some(self.resolve(relative_path))
	}
}

impl TreeSink for DirTree {
	fn create_dir(&mut self, relative_path: &str) -> Result<()> {
		let path = self.resolve(relative_path);
		fs::create_dir_all(&path).map_err(|source| TransformError::TreeIo { path, source })
	}

	fn write_file(&mut self, relative_path: &str, content: &[u8]) -> Result<()> {
		let path = self.resolve(relative_path);
		self.create_parent(&path)?;
		fs::write(&path, content).map_err(|source| TransformError::TreeIo { path, source })
	}

	fn copy_file(&mut self, source: &dyn TreeSource, from: &str, to: &str) -> Result<()> {
		let Some(from_path) = source.host_path(from) else {
			let content = source.read(from)?;
			return self.write_file(to, &content);
		};

		let to_path = self.resolve(to);
		self.create_parent(&to_path)?;
		fs::copy(&from_path, &to_path).map_err(|source| TransformError::TreeIo {
			path: from_path,
			source,
		})?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tree::MemoryTree;

	#[test]
	fn test_entries_sorted_and_relative() {
		let temp_dir = tempfile::tempdir().unwrap();
		let root = temp_dir.path();
		fs::create_dir_all(root.join("elsewhere")).unwrap();
		fs::write(root.join("elsewhere/index.html"), "b").unwrap();
		fs::write(root.join("index.html"), "a").unwrap();
		fs::create_dir_all(root.join("empty")).unwrap();

		let tree = DirTree::new(root);
		let entries = tree.entries().unwrap();
		assert_eq!(
			entries,
			vec![
				TreeEntry::directory("elsewhere"),
				TreeEntry::file("elsewhere/index.html"),
				TreeEntry::directory("empty"),
				TreeEntry::file("index.html"),
			]
		);
		assert_eq!(tree.read("elsewhere/index.html").unwrap(), b"b");
	}

	#[test]
	fn test_write_creates_parents() {
		let temp_dir = tempfile::tempdir().unwrap();
		let mut tree = DirTree::new(temp_dir.path());

		tree.write_file("somewhere/deep/index.jsp", b"x").unwrap();
		assert_eq!(
			fs::read(temp_dir.path().join("somewhere/deep/index.jsp")).unwrap(),
			b"x"
		);
	}

	#[test]
	fn test_copy_between_dir_trees() {
		let input = tempfile::tempdir().unwrap();
		let output = tempfile::tempdir().unwrap();
		fs::write(input.path().join("logo.png"), [0x89, b'P', b'N', b'G']).unwrap();

		let source = DirTree::new(input.path());
		let mut sink = DirTree::new(output.path());
		sink.copy_file(&source, "logo.png", "img/logo.png").unwrap();

		assert_eq!(
			fs::read(output.path().join("img/logo.png")).unwrap(),
			[0x89, b'P', b'N', b'G']
		);
	}

	#[test]
	fn test_copy_from_memory_tree() {
		let output = tempfile::tempdir().unwrap();
		let source = MemoryTree::from_files([("index.js", "let a;")]).unwrap();

		let mut sink = DirTree::new(output.path());
		sink.copy_file(&source, "index.js", "index.js").unwrap();

		assert_eq!(
			fs::read_to_string(output.path().join("index.js")).unwrap(),
			"let a;"
		);
	}

	#[test]
	fn test_read_missing_file() {
		let temp_dir = tempfile::tempdir().unwrap();
		let tree = DirTree::new(temp_dir.path());
		assert!(matches!(
			tree.read("missing.css"),
			Err(TransformError::TreeIo { .. })
		));
	}

	#[cfg(unix)]
	#[test]
	fn test_non_utf8_name_is_reported() {
		use std::ffi::OsStr;
		use std::os::unix::ffi::OsStrExt;

		let temp_dir = tempfile::tempdir().unwrap();
		let name = OsStr::from_bytes(b"logo\xff.png");
		fs::write(temp_dir.path().join(name), [0x89, b'P', b'N', b'G']).unwrap();

		let tree = DirTree::new(temp_dir.path());
		match tree.entries().unwrap_err() {
			TransformError::NonUtf8Path { path } => {
				assert_eq!(path.file_name(), Some(name));
			}
			other => panic!("Expected NonUtf8Path error, got {other:?}"),
		}
	}

	#[cfg(unix)]
	#[test]
	fn test_symlinked_directory_is_followed() {
		let temp_dir = tempfile::tempdir().unwrap();
		let root = temp_dir.path();
		fs::create_dir_all(root.join("shared")).unwrap();
		fs::write(root.join("shared/a.css"), "a").unwrap();
		std::os::unix::fs::symlink(root.join("shared"), root.join("linked")).unwrap();

		let tree = DirTree::new(root);
		assert_eq!(
			tree.entries().unwrap(),
			vec![
				TreeEntry::directory("linked"),
				TreeEntry::file("linked/a.css"),
				TreeEntry::directory("shared"),
				TreeEntry::file("shared/a.css"),
			]
		);
		assert_eq!(tree.read("linked/a.css").unwrap(), b"a");
	}
}
