/// Template written by `tree-transforms init`.
pub fn generate_init_template() -> &'static str {
	r#"# tree-transforms configuration
#
# Files whose extension is listed below are matched against every target's
# glob pattern, in order. Every matching target is applied in turn; files
# matching nothing are copied unchanged.

extensions = ["html", "js", "css"]

# Targets only run for production builds unless this is set.
transform-in-development = false

# Match later targets against the "original" input path, or the path as
# "renamed" by earlier targets.
match-against = "original"

# [[targets]]
# pattern = "index.html"
#
# At most one content hook:
# replace_content = "<!-- maintenance -->"
# content_rewrite = "s/__VERSION__/1.0.0/g"
# transform_command = "sed -e 's/foo/bar/'"
#
# At most one path hook:
# rename_to = "somewhere/index.jsp"
# path_rewrite = "s/\\.html$/.jsp/"
# rename_command = "printf '%s' \"$TREE_TRANSFORMS_PATH\" | sed -e 's/^/v2\\//'"
"#
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::parse_config_str;
	use std::path::Path;

	#[test]
	fn test_template_parses() {
		let config = parse_config_str(generate_init_template(), Path::new("transforms.toml"))
			.unwrap();
		assert!(config.targets.is_empty());
		assert_eq!(config.extensions, vec!["html", "js", "css"]);
	}
}
