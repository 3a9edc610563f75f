use crate::config::types::{BuildEnvironment, Config, Target};
use crate::error::{Result, TransformError};
use crate::hooks::{HookContext, HookKind, execute_rename_hook, execute_transform_hook};
use crate::rules::rewriter::Substitution;
use crate::rules::rule::{Rule, RuleSet};

/// Compile one declarative target into a rule with closure hooks.
pub fn compile_rule(target: &Target, index: usize) -> Result<Rule> {
	target.validate(index)?;
	let pattern = target
		.pattern
		.clone()
		.ok_or(TransformError::MissingPattern { index })?;
	let mut rule = Rule::new(&pattern)?;

	if let Some(text) = &target.replace_content {
		let bytes = text.clone().into_bytes();
		rule = rule.with_transform(move |_, _| Ok(Some(bytes.clone())));
	} else if let Some(rewrite) = &target.content_rewrite {
		let sub = Substitution::parse(rewrite)?;
		rule = rule.with_transform(move |content, path| {
			let text = std::str::from_utf8(content).map_err(|_| {
				TransformError::NonUtf8Content {
					path: path.to_string(),
				}
			})?;
			Ok(sub.apply_if_matched(text).map(String::into_bytes))
		});
	} else if let Some(command) = &target.transform_command {
		let command = command.clone();
		let pattern = pattern.clone();
		rule = rule.with_transform(move |content, path| {
			let ctx = HookContext {
				path,
				pattern: &pattern,
				kind: HookKind::Transform,
			};
			Ok(Some(execute_transform_hook(&command, &ctx, content)?))
		});
	}

	if let Some(to) = &target.rename_to {
		let to = to.clone();
		rule = rule.with_rename(move |_| Ok(Some(to.clone())));
	} else if let Some(rewrite) = &target.path_rewrite {
		let sub = Substitution::parse(rewrite)?;
		rule = rule.with_rename(move |path| Ok(sub.apply_if_matched(path)));
	} else if let Some(command) = &target.rename_command {
		let command = command.clone();
		rule = rule.with_rename(move |path| {
			let ctx = HookContext {
				path,
				pattern: &pattern,
				kind: HookKind::Rename,
			};
			Ok(execute_rename_hook(&command, &ctx)?)
		});
	}

	Ok(rule)
}

/// Compile all targets of a config, keeping their order.
pub fn compile_rules(config: &Config) -> Result<Vec<Rule>> {
	config
		.targets
		.iter()
		.enumerate()
		.map(|(index, target)| compile_rule(target, index))
		.collect()
}

/// Compile a config into the rule set used for a build in `env`.
pub fn compile_rule_set(config: &Config, env: BuildEnvironment) -> Result<RuleSet> {
	let enabled = config.should_transform(env);
	if !enabled {
		tracing::info!(environment = %env, "transforms disabled for this environment");
	}

	Ok(RuleSet::new(compile_rules(config)?)
		.with_extensions(&config.extensions)
		.enabled(enabled)
		.with_match_basis(config.match_against))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::parse_config_str;
	use crate::engine::resolve_path;
	use crate::rules::{MatchBasis, match_set};
	use std::path::Path;

	fn target(pattern: &str) -> Target {
		Target {
			pattern: Some(pattern.to_string()),
			..Default::default()
		}
	}

	#[test]
	fn test_compile_replace_content() {
		let rule = compile_rule(
			&Target {
				replace_content: Some("single-transform success".to_string()),
				..target("index.html")
			},
			0,
		)
		.unwrap();

		assert!(rule.has_transform());
		assert!(!rule.has_rename());
		assert_eq!(
			rule.apply_transform(b"<body>Unchanged</body>\n", "index.html")
				.unwrap(),
			Some(b"single-transform success".to_vec())
		);
	}

	#[test]
	fn test_compile_content_rewrite() {
		let rule = compile_rule(
			&Target {
				content_rewrite: Some("s/Unchanged/Changed/".to_string()),
				..target("index.html")
			},
			0,
		)
		.unwrap();

		assert_eq!(
			rule.apply_transform(b"<body>Unchanged</body>\n", "index.html")
				.unwrap(),
			Some(b"<body>Changed</body>\n".to_vec())
		);
		// No match means no change
		assert_eq!(rule.apply_transform(b"<p></p>", "index.html").unwrap(), None);
	}

	#[test]
	fn test_content_rewrite_rejects_binary() {
		let rule = compile_rule(
			&Target {
				content_rewrite: Some("s/a/b/".to_string()),
				..target("*")
			},
			0,
		)
		.unwrap();

		let err = rule.apply_transform(&[0xff, 0xfe], "blob.js").unwrap_err();
		assert!(matches!(err, TransformError::HookFailed { .. }));
	}

	#[test]
	fn test_compile_rename_to_and_path_rewrite() {
		let rename = compile_rule(
			&Target {
				rename_to: Some("somewhere/index.jsp".to_string()),
				..target("index.html")
			},
			0,
		)
		.unwrap();
		assert_eq!(
			rename.apply_rename("index.html").unwrap(),
			Some("somewhere/index.jsp".to_string())
		);

		let rewrite = compile_rule(
			&Target {
				path_rewrite: Some(r"s/\.jsp$/.php/".to_string()),
				..target("index.html")
			},
			1,
		)
		.unwrap();
		assert_eq!(
			rewrite.apply_rename("index.jsp").unwrap(),
			Some("index.php".to_string())
		);
		assert_eq!(rewrite.apply_rename("index.html").unwrap(), None);
	}

	#[cfg(unix)]
	#[test]
	fn test_compile_command_hooks() {
		let rule = compile_rule(
			&Target {
				transform_command: Some("tr a-z A-Z".to_string()),
				rename_command: Some("echo renamed.html".to_string()),
				..target("*.html")
			},
			0,
		)
		.unwrap();

		assert_eq!(
			rule.apply_transform(b"abc", "index.html").unwrap(),
			Some(b"ABC".to_vec())
		);
		assert_eq!(
			rule.apply_rename("index.html").unwrap(),
			Some("renamed.html".to_string())
		);
	}

	#[cfg(unix)]
	#[test]
	fn test_rename_command_sees_cascaded_path() {
		let rules = vec![
			compile_rule(
				&Target {
					rename_to: Some("somewhere/index.jsp".to_string()),
					..target("index.html")
				},
				0,
			)
			.unwrap(),
			compile_rule(
				&Target {
					rename_command: Some(
						"printf 'v2/%s' \"$TREE_TRANSFORMS_PATH\"".to_string(),
					),
					..target("index.html")
				},
				1,
			)
			.unwrap(),
		];

		let matched = match_set(&rules, "index.html");
		assert_eq!(
			resolve_path("index.html", &matched).unwrap(),
			"v2/somewhere/index.jsp"
		);
	}

	#[test]
	fn test_compile_invalid_pattern() {
		assert!(matches!(
			compile_rule(&target("[oops"), 0),
			Err(TransformError::InvalidPattern { .. })
		));
	}

	#[test]
	fn test_compile_invalid_substitution() {
		assert!(
			compile_rule(
				&Target {
					path_rewrite: Some("not-a-substitution".to_string()),
					..target("*")
				},
				0,
			)
			.is_err()
		);
	}

	#[test]
	fn test_compile_rule_set_from_config() {
		let config = parse_config_str(
			r#"
extensions = ["md"]
match-against = "renamed"

[[targets]]
pattern = "index.md"
rename_to = "index.markdown"

[[targets]]
pattern = "*"
replace_content = "X"
"#,
			Path::new("transforms.toml"),
		)
		.unwrap();

		let production = compile_rule_set(&config, BuildEnvironment::Production).unwrap();
		assert!(production.is_enabled());
		assert_eq!(production.rules().len(), 2);
		assert_eq!(production.rules()[0].pattern().as_str(), "index.md");
		assert_eq!(production.match_basis(), MatchBasis::Renamed);
		assert!(production.gate().is_eligible("index.md"));
		assert!(!production.gate().is_eligible("index.html"));

		let development = compile_rule_set(&config, BuildEnvironment::Development).unwrap();
		assert!(!development.is_enabled());
	}
}
