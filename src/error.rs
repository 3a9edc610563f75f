use crate::hooks::HookKind;
use std::path::PathBuf;

/// Boxed error returned by a rule hook.
///
/// Closure hooks may fail with any error type; the engine never inspects it and
/// hands it back to the caller inside [`TransformError::HookFailed`].
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Library-level structured errors for tree-transforms.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
	#[error("Config file not found: {path}")]
	ConfigNotFound { path: PathBuf },

	#[error("Failed to read config file: {path}")]
	ConfigReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse config file: {path}")]
	ConfigParseError {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("`targets[{index}]`: all transforms require a `pattern` string")]
	MissingPattern { index: usize },

	#[error("Invalid extension in `extensions`: {extension:?}")]
	InvalidExtension { extension: String },

	#[error("Invalid glob pattern in target: {pattern}")]
	InvalidPattern {
		pattern: String,
		#[source]
		source: globset::Error,
	},

	#[error("Invalid regex pattern in target: {pattern}")]
	InvalidRegex {
		pattern: String,
		#[source]
		source: regex::Error,
	},

	#[error("Invalid substitution {input:?}: {reason}")]
	InvalidSubstitution { input: String, reason: &'static str },

	#[error("Mutually exclusive options: {option1} and {option2}")]
	MutuallyExclusive { option1: String, option2: String },

	#[error("{kind} hook for pattern {pattern:?} failed on {path}")]
	HookFailed {
		kind: HookKind,
		pattern: String,
		path: String,
		#[source]
		source: HookError,
	},

	#[error("Failed to spawn hook command: {command}")]
	HookSpawnFailed {
		command: String,
		#[source]
		source: std::io::Error,
	},

	#[error("I/O error while running hook command: {command}")]
	HookIo {
		command: String,
		#[source]
		source: std::io::Error,
	},

	#[error("Hook command returned non-zero exit code: {command} (exit code: {exit_code})")]
	HookNonZeroExit { command: String, exit_code: i32 },

	#[error("Content of {path} is not valid UTF-8 and cannot be rewritten as text")]
	NonUtf8Content { path: String },

	#[error("Rename produced an invalid output path {path:?}: {reason}")]
	InvalidOutputPath { path: String, reason: &'static str },

	#[error("Output path is claimed by more than one input entry: {path}")]
	OutputCollision { path: String },

	#[error("{path} cannot be both a file and a directory")]
	PathKindConflict { path: String },

	#[error("File name is not valid UTF-8: {}", path.display())]
	NonUtf8Path { path: PathBuf },

	#[error("No such entry in tree: {path}")]
	EntryNotFound { path: String },

	#[error("Tree I/O failed at {path}")]
	TreeIo {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to walk directory tree: {root}")]
	WalkFailed {
		root: PathBuf,
		#[source]
		source: walkdir::Error,
	},
}

/// Result type alias using TransformError.
pub type Result<T> = std::result::Result<T, TransformError>;
