use crate::config::parser::parse_config_file;
use crate::config::types::LoadedConfig;
use crate::error::Result;
use std::path::Path;

/// File name looked up by [`discover_config`].
pub const CONFIG_FILE_NAME: &str = "transforms.toml";

/// Find and load the nearest config file.
///
/// Starts at `start_dir` and walks up the directory tree; the first
/// `transforms.toml` found wins. Returns `None` when no ancestor has one.
pub fn discover_config(start_dir: &Path) -> Result<Option<LoadedConfig>> {
	for dir in start_dir.ancestors() {
		let config_path = dir.join(CONFIG_FILE_NAME);

		if config_path.is_file() {
			tracing::debug!(path = %config_path.display(), "found config file");
			let config = parse_config_file(&config_path)?;
			return Ok(Some(LoadedConfig {
				config,
				path: config_path,
			}));
		}
	}

	Ok(None)
}

/// Load the config at an explicit path.
pub fn load_config(path: &Path) -> Result<LoadedConfig> {
	let config = parse_config_file(path)?;
	Ok(LoadedConfig {
		config,
		path: path.to_path_buf(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::TransformError;
	use std::fs;

	#[test]
	fn test_discover_in_ancestor() {
		let temp_dir = tempfile::tempdir().unwrap();
		let nested = temp_dir.path().join("app/src");
		fs::create_dir_all(&nested).unwrap();
		fs::write(
			temp_dir.path().join(CONFIG_FILE_NAME),
			"[[targets]]\npattern = \"index.html\"\n",
		)
		.unwrap();

		let loaded = discover_config(&nested).unwrap().unwrap();
		assert_eq!(loaded.path, temp_dir.path().join(CONFIG_FILE_NAME));
		assert_eq!(loaded.config.targets.len(), 1);
	}

	#[test]
	fn test_nearest_config_wins() {
		let temp_dir = tempfile::tempdir().unwrap();
		let nested = temp_dir.path().join("app");
		fs::create_dir_all(&nested).unwrap();
		fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "").unwrap();
		fs::write(nested.join(CONFIG_FILE_NAME), "extensions = [\"md\"]\n").unwrap();

		let loaded = discover_config(&nested).unwrap().unwrap();
		assert_eq!(loaded.config.extensions, vec!["md"]);
	}

	#[test]
	fn test_invalid_config_is_an_error() {
		let temp_dir = tempfile::tempdir().unwrap();
		fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "invalid toml [[[").unwrap();

		assert!(matches!(
			discover_config(temp_dir.path()),
			Err(TransformError::ConfigParseError { .. })
		));
	}

	#[test]
	fn test_load_config_explicit_path() {
		let temp_dir = tempfile::tempdir().unwrap();
		let path = temp_dir.path().join("custom.toml");
		fs::write(&path, "transform-in-development = true\n").unwrap();

		let loaded = load_config(&path).unwrap();
		assert!(loaded.config.transform_in_development);
		assert_eq!(loaded.path, path);
	}
}
