use crate::error::{Result, TransformError};
use std::collections::HashMap;
use std::fmt;
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

/// Which side of a rule a hook belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
	Transform,
	Rename,
}

impl HookKind {
	/// Get the string representation for TREE_TRANSFORMS_HOOK_TYPE env var.
	pub fn as_str(&self) -> &'static str {
		match self {
			HookKind::Transform => "transform",
			HookKind::Rename => "rename",
		}
	}
}

impl fmt::Display for HookKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Context for hook command execution.
#[derive(Debug)]
pub struct HookContext<'a> {
	/// Path handed to the hook. Renames get the path as renamed by the earlier
	/// rules of the cascade; transforms get the fully resolved output path.
	pub path: &'a str,

	/// Pattern of the rule the hook belongs to.
	pub pattern: &'a str,

	/// Type of hook.
	pub kind: HookKind,
}

/// Build environment variables for hook execution.
pub fn build_hook_env(ctx: &HookContext) -> HashMap<String, String> {
	let mut env = HashMap::new();

	env.insert("TREE_TRANSFORMS_PATH".to_string(), ctx.path.to_string());
	env.insert(
		"TREE_TRANSFORMS_HOOK_TYPE".to_string(),
		ctx.kind.as_str().to_string(),
	);
	env.insert(
		"TREE_TRANSFORMS_PATTERN".to_string(),
		ctx.pattern.to_string(),
	);

	let basename = ctx.path.rsplit('/').next().unwrap_or(ctx.path);
	if let Some((_, extension)) = basename.rsplit_once('.') {
		env.insert(
			"TREE_TRANSFORMS_EXTENSION".to_string(),
			extension.to_string(),
		);
	}

	env
}

/// Run a hook command through `sh -c`, feeding `input` on stdin.
///
/// Returns the captured stdout. A non-zero exit is an error; stderr is
/// inherited so hook diagnostics reach the user.
pub fn execute_hook(command: &str, ctx: &HookContext, input: &[u8]) -> Result<Vec<u8>> {
	let env = build_hook_env(ctx);

	let mut cmd = Command::new("sh");
	cmd.arg("-c")
		.arg(command)
		.stdin(Stdio::piped())
		.stdout(Stdio::piped())
		.stderr(Stdio::inherit())
		.envs(&env);

	tracing::trace!(command, path = ctx.path, kind = %ctx.kind, "running hook command");

	let mut child = cmd.spawn().map_err(|source| TransformError::HookSpawnFailed {
		command: command.to_string(),
		source,
	})?;

	let stdin = child.stdin.take();
	let output = std::thread::scope(|scope| {
		let writer = stdin.map(|mut pipe| scope.spawn(move || pipe.write_all(input)));
		let output = child.wait_with_output()?;

		if let Some(writer) = writer {
			match writer.join() {
				Ok(Ok(())) => {}
				// The hook is free to exit without reading all of its input.
				Ok(Err(err)) if err.kind() == ErrorKind::BrokenPipe => {}
				Ok(Err(err)) => return Err(err),
				Err(_) => return Err(std::io::Error::other("stdin writer panicked")),
			}
		}

		Ok(output)
	})
	.map_err(|source| TransformError::HookIo {
		command: command.to_string(),
		source,
	})?;

	if !output.status.success() {
		return Err(TransformError::HookNonZeroExit {
			command: command.to_string(),
			exit_code: output.status.code().unwrap_or(-1),
		});
	}

	Ok(output.stdout)
}

/// Execute a transform command. Its stdout replaces the content.
pub fn execute_transform_hook(command: &str, ctx: &HookContext, content: &[u8]) -> Result<Vec<u8>> {
	execute_hook(command, ctx, content)
}

/// Execute a rename command. Returns the trimmed stdout, or `None` when the
/// command printed nothing.
pub fn execute_rename_hook(command: &str, ctx: &HookContext) -> Result<Option<String>> {
	let stdout = execute_hook(command, ctx, &[])?;
	let stdout = String::from_utf8(stdout).map_err(|_| TransformError::NonUtf8Content {
		path: ctx.path.to_string(),
	})?;

	let trimmed = stdout.trim();
	if trimmed.is_empty() {
		Ok(None)
	} else {
		Ok(Some(trimmed.to_string()))
	}
}
