//! Hook command execution for tree-transforms.
//!
//! This module handles:
//! - Transform commands (content on stdin, new content on stdout)
//! - Rename commands (new path on stdout)
//! - Hook environment variable setup

pub mod executor;

pub use executor::{
	HookContext, HookKind, build_hook_env, execute_hook, execute_rename_hook,
	execute_transform_hook,
};
