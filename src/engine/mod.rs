//! The transformation engine.
//!
//! This module handles:
//! - Extension eligibility
//! - Path and content cascades over a file's matched rules
//! - Driving both over a whole tree

pub mod assemble;
pub mod gate;
pub mod resolve;

pub use assemble::{BuildSummary, FilePlan, ResolvedFile, TreeAssembler};
pub use gate::{DEFAULT_EXTENSIONS, ExtensionGate, extension};
pub use resolve::{resolve_content, resolve_path, validate_output_path};
