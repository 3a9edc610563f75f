//! tree-transforms - rewrite the paths and contents of files in a directory tree
//! with an ordered list of glob-targeted rules.
//!
//! This library provides:
//! - Rules pairing a glob pattern with optional content and path hooks
//! - Cascading path and content resolution over every rule a file matches
//! - A tree assembler that mirrors directories and passes untouched files through
//! - TOML configuration with declarative and command hooks
//!
//! # Example
//!
//! ```
//! use tree_transforms::engine::TreeAssembler;
//! use tree_transforms::rules::{Rule, RuleSet};
//! use tree_transforms::tree::MemoryTree;
//!
//! let input = MemoryTree::from_files([("index.html", "<body>Unchanged</body>\n")])?;
//! let rules = RuleSet::new(vec![
//!     Rule::new("index.html")?
//!         .with_rename(|_| Ok(Some("somewhere/index.jsp".to_string())))
//!         .with_transform(|_, path| Ok(Some(format!("lives at {path}").into_bytes()))),
//! ]);
//!
//! let mut output = MemoryTree::new();
//! TreeAssembler::new(&rules).run(&input, &mut output)?;
//!
//! assert_eq!(output.listing(), vec!["somewhere/", "somewhere/index.jsp"]);
//! assert_eq!(output.file_str("somewhere/index.jsp"), Some("lives at somewhere/index.jsp"));
//! # Ok::<(), tree_transforms::TransformError>(())
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod hooks;
pub mod rules;
pub mod tree;

pub use error::{HookError, Result, TransformError};
