//! Rules and pattern matching for tree-transforms.
//!
//! This module handles:
//! - Glob matching of relative paths
//! - Rules carrying optional content and path hooks
//! - Compiling declarative config targets into rules
//! - Sed-like substitutions used by declarative hooks

pub mod compile;
pub mod matcher;
pub mod rewriter;
pub mod rule;

pub use compile::{compile_rule, compile_rule_set, compile_rules};
pub use matcher::{
	MatchBasis, MatchSet, Pattern, compute_match_set, match_set, match_set_renamed, matches,
};
pub use rewriter::Substitution;
pub use rule::{RenameFn, Rule, RuleSet, TransformFn};
