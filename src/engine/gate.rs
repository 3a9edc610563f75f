use std::collections::BTreeSet;

/// Extensions eligible for transformation when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["html", "js", "css"];

/// Decides from its extension whether a file is considered for rule matching at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionGate {
	extensions: BTreeSet<String>,
}

impl ExtensionGate {
	/// Build a gate from extensions, written with or without a leading dot.
	pub fn new<I, S>(extensions: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		ExtensionGate {
			extensions: extensions
				.into_iter()
				.map(|ext| ext.as_ref().trim_start_matches('.').to_string())
				.collect(),
		}
	}

	pub fn extensions(&self) -> impl Iterator<Item = &str> {
		self.extensions.iter().map(String::as_str)
	}

	pub fn is_eligible(&self, relative_path: &str) -> bool {
		extension(relative_path).is_some_and(|ext| self.extensions.contains(ext))
	}
}

impl Default for ExtensionGate {
	fn default() -> Self {
		ExtensionGate::new(DEFAULT_EXTENSIONS)
	}
}

/// Text after the last `.` of the final path segment.
pub fn extension(relative_path: &str) -> Option<&str> {
	let basename = relative_path.rsplit('/').next().unwrap_or(relative_path);
	basename.rsplit_once('.').map(|(_, ext)| ext)
}
