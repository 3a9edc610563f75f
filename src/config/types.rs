use crate::engine::DEFAULT_EXTENSIONS;
use crate::error::TransformError;
use crate::rules::MatchBasis;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Top-level configuration from a `transforms.toml` file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
	/// Rules applied to matching files, in cascade order.
	#[serde(default)]
	pub targets: Vec<Target>,

	/// File extensions eligible for transformation.
	#[serde(default = "default_extensions")]
	pub extensions: Vec<String>,

	/// Also transform development builds, not only production ones.
	#[serde(default)]
	pub transform_in_development: bool,

	/// Path later targets in a cascade are matched against.
	#[serde(default)]
	pub match_against: MatchBasis,
}

fn default_extensions() -> Vec<String> {
	DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
}

impl Default for Config {
	fn default() -> Self {
		Config {
			targets: Vec::new(),
			extensions: default_extensions(),
			transform_in_development: false,
			match_against: MatchBasis::default(),
		}
	}
}

/// A declarative transformation target.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct Target {
	/// Glob pattern matched against the file's relative path. Required.
	pub pattern: Option<String>,

	/// Replace the whole content with this text
	/// (mutually exclusive with content_rewrite and transform_command).
	pub replace_content: Option<String>,

	/// Regex substitution over the content.
	/// Format: "s/pattern/replacement/" or "s/pattern/replacement/g" for global.
	pub content_rewrite: Option<String>,

	/// Shell command receiving the content on stdin; its stdout becomes the new content.
	pub transform_command: Option<String>,

	/// Move the file to this relative path
	/// (mutually exclusive with path_rewrite and rename_command).
	pub rename_to: Option<String>,

	/// Regex substitution over the relative path.
	pub path_rewrite: Option<String>,

	/// Shell command printing the new relative path; empty output keeps the path.
	pub rename_command: Option<String>,
}

impl Target {
	/// Validate that a pattern is present and that at most one hook of each kind is set.
	pub fn validate(&self, index: usize) -> Result<(), TransformError> {
		if self.pattern.as_deref().is_none_or(str::is_empty) {
			return Err(TransformError::MissingPattern { index });
		}

		check_exclusive(&[
			("replace_content", self.replace_content.is_some()),
			("content_rewrite", self.content_rewrite.is_some()),
			("transform_command", self.transform_command.is_some()),
		])?;

		check_exclusive(&[
			("rename_to", self.rename_to.is_some()),
			("path_rewrite", self.path_rewrite.is_some()),
			("rename_command", self.rename_command.is_some()),
		])
	}

	pub fn has_content_hook(&self) -> bool {
		self.replace_content.is_some()
			|| self.content_rewrite.is_some()
			|| self.transform_command.is_some()
	}

	pub fn has_path_hook(&self) -> bool {
		self.rename_to.is_some() || self.path_rewrite.is_some() || self.rename_command.is_some()
	}
}

fn check_exclusive(fields: &[(&str, bool)]) -> Result<(), TransformError> {
	let set_fields: Vec<_> = fields
		.iter()
		.filter(|(_, is_set)| *is_set)
		.map(|(name, _)| *name)
		.collect();

	if set_fields.len() > 1 {
		return Err(TransformError::MutuallyExclusive {
			option1: set_fields[0].to_string(),
			option2: set_fields[1].to_string(),
		});
	}

	Ok(())
}

impl Config {
	/// Validate every target and extension.
	pub fn validate(&self) -> Result<(), TransformError> {
		for (index, target) in self.targets.iter().enumerate() {
			target.validate(index)?;
		}

		for extension in &self.extensions {
			let bare = extension.trim_start_matches('.');
			if bare.is_empty() || bare.contains('/') {
				return Err(TransformError::InvalidExtension {
					extension: extension.clone(),
				});
			}
		}

		Ok(())
	}

	/// Whether targets should run at all for a build in `env`.
	pub fn should_transform(&self, env: BuildEnvironment) -> bool {
		match env {
			BuildEnvironment::Production => true,
			BuildEnvironment::Development => self.transform_in_development,
			BuildEnvironment::Test => false,
		}
	}
}

/// A loaded configuration with its source path for debugging/display.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
	/// The parsed configuration.
	pub config: Config,

	/// The path this config was loaded from.
	pub path: PathBuf,
}

/// The kind of build the tree is produced for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildEnvironment {
	#[default]
	Production,
	Development,
	Test,
}

impl BuildEnvironment {
	pub fn as_str(&self) -> &'static str {
		match self {
			BuildEnvironment::Production => "production",
			BuildEnvironment::Development => "development",
			BuildEnvironment::Test => "test",
		}
	}
}

impl fmt::Display for BuildEnvironment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for BuildEnvironment {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"production" | "prod" => Ok(BuildEnvironment::Production),
			"development" | "dev" => Ok(BuildEnvironment::Development),
			"test" => Ok(BuildEnvironment::Test),
			other => Err(format!(
				"unknown environment {other:?} (expected production, development or test)"
			)),
		}
	}
}
