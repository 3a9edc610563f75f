use crate::error::{Result, TransformError};
use crate::rules::MatchSet;

/// Resolve the output path of a file by folding the rename hooks of its
/// matched rules, in order, over its relative path.
///
/// This is a pure function of its inputs and may be called any number of
/// times for the same file: it keeps no state between calls and performs no
/// deduplication of hook invocations.
pub fn resolve_path(relative_path: &str, matched: &MatchSet<'_>) -> Result<String> {
	let mut path = relative_path.to_string();

	for rule in matched.iter() {
		if let Some(renamed) = rule.apply_rename(&path)? {
			path = renamed;
		}
	}

	if path != relative_path {
		validate_output_path(&path)?;
	}

	Ok(path)
}

/// Resolve the output content of a file by folding the transform hooks of
/// its matched rules, in order, over its raw content.
///
/// `load` is only invoked when at least one matched rule has a transform
/// hook; otherwise this returns `None` and the raw content was never read.
/// Every transform receives the fully resolved output path, which is
/// computed here independently of the caller.
pub fn resolve_content<F>(
	relative_path: &str,
	matched: &MatchSet<'_>,
	load: F,
) -> Result<Option<Vec<u8>>>
where
	F: FnOnce() -> Result<Vec<u8>>,
{
	if !matched.has_transforms() {
		return Ok(None);
	}

	let final_path = resolve_path(relative_path, matched)?;
	let mut content = load()?;

	for rule in matched.iter() {
		if let Some(next) = rule.apply_transform(&content, &final_path)? {
			content = next;
		}
	}

	Ok(Some(content))
}

/// Reject renamed paths that would escape or malform the output tree.
pub fn validate_output_path(path: &str) -> Result<()> {
	let invalid = |reason| {
		Err(TransformError::InvalidOutputPath {
			path: path.to_string(),
			reason,
		})
	};

	if path.is_empty() {
		return invalid("path is empty");
	}
	if path.starts_with('/') || path.contains('\\') {
		return invalid("path must be relative and use '/' separators");
	}
	for segment in path.split('/') {
		match segment {
			"" => return invalid("path contains an empty segment"),
			"." | ".." => return invalid("path contains a '.' or '..' segment"),
			_ => {}
		}
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::rules::{Rule, match_set};
	use std::sync::Arc;
	use std::sync::atomic::{AtomicUsize, Ordering};

	fn rename_to(pattern: &str, to: &'static str) -> Rule {
		Rule::new(pattern)
			.unwrap()
			.with_rename(move |_| Ok(Some(to.to_string())))
	}

	#[test]
	fn test_resolve_path_without_renames() {
		let rules = vec![Rule::new("index.html").unwrap()];
		let matched = match_set(&rules, "index.html");
		assert_eq!(resolve_path("index.html", &matched).unwrap(), "index.html");
	}

	#[test]
	fn test_resolve_path_cascades_in_order() {
		let rules = vec![
			rename_to("index.html", "index.jsp"),
			Rule::new("index.html").unwrap().with_rename(|path| {
				assert_eq!(path, "index.jsp");
				Ok(Some("index.php".to_string()))
			}),
		];
		let matched = match_set(&rules, "index.html");
		assert_eq!(resolve_path("index.html", &matched).unwrap(), "index.php");
	}

	#[test]
	fn test_resolve_path_none_means_no_change() {
		let rules = vec![
			rename_to("index.html", "somewhere/index.jsp"),
			Rule::new("index.html").unwrap().with_rename(|_| Ok(None)),
		];
		let matched = match_set(&rules, "index.html");
		assert_eq!(
			resolve_path("index.html", &matched).unwrap(),
			"somewhere/index.jsp"
		);
	}

	#[test]
	fn test_resolve_path_is_repeatable() {
		let calls = Arc::new(AtomicUsize::new(0));
		let counter = Arc::clone(&calls);
		let rules = vec![Rule::new("*.html").unwrap().with_rename(move |path| {
			counter.fetch_add(1, Ordering::SeqCst);
			Ok(Some(path.replace(".html", ".jsp")))
		})];
		let matched = match_set(&rules, "index.html");

		let first = resolve_path("index.html", &matched).unwrap();
		let second = resolve_path("index.html", &matched).unwrap();
		assert_eq!(first, "index.jsp");
		assert_eq!(first, second);
		// No internal caching: every call reaches the hook
		assert_eq!(calls.load(Ordering::SeqCst), 2);
	}

	#[test]
	fn test_resolve_path_rejects_escaping_paths() {
		for bad in ["", "/etc/passwd", "../up.html", "a//b.html", "a/./b.html", "a\\b.html"] {
			let rules = vec![rename_to("index.html", bad)];
			let matched = match_set(&rules, "index.html");
			assert!(
				matches!(
					resolve_path("index.html", &matched),
					Err(TransformError::InvalidOutputPath { .. })
				),
				"{bad:?} should be rejected"
			);
		}
	}

	#[test]
	fn test_resolve_content_is_lazy() {
		let rules = vec![rename_to("index.html", "index.jsp")];
		let matched = match_set(&rules, "index.html");

		let content = resolve_content("index.html", &matched, || {
			panic!("content must not be loaded without transform hooks")
		})
		.unwrap();
		assert!(content.is_none());
	}

	#[test]
	fn test_resolve_content_cascades_in_order() {
		let rules = vec![
			Rule::new("index.html")
				.unwrap()
				.with_transform(|_, _| Ok(Some(b"expected intermediate content".to_vec()))),
			Rule::new("index.html").unwrap().with_transform(|content, _| {
				assert_eq!(content, b"expected intermediate content");
				Ok(Some(b"expected final content".to_vec()))
			}),
		];
		let matched = match_set(&rules, "index.html");

		let content =
			resolve_content("index.html", &matched, || Ok(b"<body>Unchanged</body>\n".to_vec()))
				.unwrap();
		assert_eq!(content.unwrap(), b"expected final content");
	}

	#[test]
	fn test_resolve_content_sees_final_path() {
		let rules = vec![
			Rule::new("index.html")
				.unwrap()
				.with_transform(|_, path| Ok(Some(path.as_bytes().to_vec()))),
			rename_to("index.html", "somewhere/index.jsp"),
		];
		let matched = match_set(&rules, "index.html");

		// The transform runs before the rename in cascade order but still sees
		// where the file will end up.
		let content = resolve_content("index.html", &matched, || Ok(Vec::new())).unwrap();
		assert_eq!(content.unwrap(), b"somewhere/index.jsp");
	}

	#[test]
	fn test_resolve_content_none_keeps_raw() {
		let rules = vec![Rule::new("index.html").unwrap().with_transform(|content, path| {
			assert_eq!(content, b"<body>Unchanged</body>\n");
			assert_eq!(path, "index.html");
			Ok(None)
		})];
		let matched = match_set(&rules, "index.html");

		let content =
			resolve_content("index.html", &matched, || Ok(b"<body>Unchanged</body>\n".to_vec()))
				.unwrap();
		assert_eq!(content.unwrap(), b"<body>Unchanged</body>\n");
	}

	#[test]
	fn test_resolve_content_propagates_hook_error() {
		let rules = vec![
			Rule::new("index.html")
				.unwrap()
				.with_transform(|_, _| Err("transform exploded".into())),
		];
		let matched = match_set(&rules, "index.html");

		let err = resolve_content("index.html", &matched, || Ok(Vec::new())).unwrap_err();
		assert!(matches!(err, TransformError::HookFailed { .. }));
	}

	#[test]
	fn test_validate_output_path_accepts_nested() {
		assert!(validate_output_path("somewhere/index.jsp").is_ok());
		assert!(validate_output_path(".well-known/app.js").is_ok());
	}
}
