use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use tree_transforms::config::{
	BuildEnvironment, CONFIG_FILE_NAME, Config, LoadedConfig, discover_config,
	generate_init_template, load_config,
};
use tree_transforms::engine::TreeAssembler;
use tree_transforms::rules::compile_rule_set;
use tree_transforms::tree::DirTree;

#[derive(Parser)]
#[command(name = "tree-transforms")]
#[command(
	author,
	version,
	about = "Rewrite file paths and contents in a directory tree with glob-targeted rules"
)]
#[command(arg_required_else_help = true)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Increase log verbosity (-v info, -vv debug, -vvv trace)
	#[arg(short, long, action = clap::ArgAction::Count, global = true)]
	verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
	/// Transform INPUT into OUTPUT
	Build {
		/// Directory to read
		input: PathBuf,

		/// Directory to write
		output: PathBuf,

		#[command(flatten)]
		settings: BuildSettings,

		/// Clear OUTPUT first if it is not empty
		#[arg(long)]
		force: bool,
	},
	/// Show where every file of INPUT would be written, without writing anything
	Plan {
		/// Directory to read
		input: PathBuf,

		#[command(flatten)]
		settings: BuildSettings,
	},
	/// Create a template transforms.toml in the current directory
	Init {
		/// Overwrite an existing transforms.toml
		#[arg(long)]
		force: bool,
	},
	/// Configuration management commands
	Config {
		#[command(subcommand)]
		action: ConfigAction,

		/// Config file to use instead of discovering transforms.toml
		#[arg(short, long, global = true, value_name = "FILE")]
		config: Option<PathBuf>,
	},
}

#[derive(Args)]
struct BuildSettings {
	/// Config file to use instead of discovering transforms.toml
	#[arg(short, long, value_name = "FILE")]
	config: Option<PathBuf>,

	/// Build environment: production, development or test
	#[arg(short, long, default_value = "production")]
	environment: BuildEnvironment,
}

#[derive(Subcommand)]
enum ConfigAction {
	/// Display the effective configuration
	Show,
	/// Check the config file for errors without running anything
	Validate,
}

fn main() -> ExitCode {
	let cli = Cli::parse();
	init_logging(cli.verbose);

	match run(cli.command) {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn init_logging(verbose: u8) {
	let default_level = match verbose {
		0 => "warn",
		1 => "info",
		2 => "debug",
		_ => "trace",
	};
	let filter = EnvFilter::try_from_env("TREE_TRANSFORMS_LOG")
		.unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}

fn run(command: Commands) -> Result<ExitCode> {
	match command {
		Commands::Build {
			input,
			output,
			settings,
			force,
		} => handle_build(&input, &output, &settings, force),
		Commands::Plan { input, settings } => handle_plan(&input, &settings),
		Commands::Init { force } => handle_init(force),
		Commands::Config { action, config } => match action {
			ConfigAction::Show => handle_config_show(config.as_deref()),
			ConfigAction::Validate => handle_config_validate(config.as_deref()),
		},
	}
}

/// Load the explicit config, or the nearest transforms.toml, or fall back to
/// an empty config that passes everything through.
fn resolve_config(explicit: Option<&Path>) -> Result<Option<LoadedConfig>> {
	if let Some(path) = explicit {
		let loaded = load_config(path)
			.with_context(|| format!("Failed to load configuration from {}", path.display()))?;
		return Ok(Some(loaded));
	}

	let cwd = std::env::current_dir().context("Failed to get current directory")?;
	discover_config(&cwd).context("Failed to load configuration")
}

fn effective_config(explicit: Option<&Path>) -> Result<Config> {
	match resolve_config(explicit)? {
		Some(loaded) => {
			tracing::info!(path = %loaded.path.display(), "using configuration");
			Ok(loaded.config)
		}
		None => {
			tracing::warn!("no {CONFIG_FILE_NAME} found, every file will be copied unchanged");
			Ok(Config::default())
		}
	}
}

fn handle_build(
	input: &Path,
	output: &Path,
	settings: &BuildSettings,
	force: bool,
) -> Result<ExitCode> {
	if !input.is_dir() {
		anyhow::bail!("Input directory not found: {}", input.display());
	}

	let config = effective_config(settings.config.as_deref())?;
	let rules = compile_rule_set(&config, settings.environment)
		.context("Failed to compile transform targets")?;

	prepare_output(input, output, force)?;

	let source = DirTree::new(input);
	let mut sink = DirTree::new(output);
	let summary = TreeAssembler::new(&rules)
		.run(&source, &mut sink)
		.with_context(|| format!("Failed to transform {}", input.display()))?;

	println!("Wrote {} to {}", summary, output.display());
	Ok(ExitCode::SUCCESS)
}

fn prepare_output(input: &Path, output: &Path, force: bool) -> Result<()> {
	let input = input
		.canonicalize()
		.with_context(|| format!("Failed to resolve {}", input.display()))?;
	let resolved = resolve_nonexistent(output)
		.with_context(|| format!("Failed to resolve {}", output.display()))?;
	if resolved.starts_with(&input) || input.starts_with(&resolved) {
		anyhow::bail!("Input and output directories must not contain each other");
	}

	if output.exists() {
		let mut entries = std::fs::read_dir(output)
			.with_context(|| format!("Failed to read {}", output.display()))?;
		if entries.next().is_some() {
			if !force {
				anyhow::bail!(
					"Output directory {} is not empty. Use --force to overwrite.",
					output.display()
				);
			}
			std::fs::remove_dir_all(output)
				.with_context(|| format!("Failed to clear {}", output.display()))?;
		}
	}

	std::fs::create_dir_all(output)
		.with_context(|| format!("Failed to create {}", output.display()))
}

/// Canonicalize the deepest existing ancestor of `path` and re-append the rest.
fn resolve_nonexistent(path: &Path) -> std::io::Result<PathBuf> {
	let absolute = std::path::absolute(path)?;
	for ancestor in absolute.ancestors() {
		if ancestor.exists() {
			let rest = absolute.strip_prefix(ancestor).unwrap_or(Path::new(""));
			return Ok(ancestor.canonicalize()?.join(rest));
		}
	}
	Ok(absolute)
}

fn handle_plan(input: &Path, settings: &BuildSettings) -> Result<ExitCode> {
	if !input.is_dir() {
		anyhow::bail!("Input directory not found: {}", input.display());
	}

	let config = effective_config(settings.config.as_deref())?;
	let rules = compile_rule_set(&config, settings.environment)
		.context("Failed to compile transform targets")?;

	let source = DirTree::new(input);
	let plans = TreeAssembler::new(&rules)
		.plan(&source)
		.with_context(|| format!("Failed to plan {}", input.display()))?;

	for plan in &plans {
		let marker = if plan.transforms { " (transformed)" } else { "" };
		if plan.source == plan.destination {
			println!("{}{}", plan.source, marker);
		} else {
			println!("{} -> {}{}", plan.source, plan.destination, marker);
		}
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_init(force: bool) -> Result<ExitCode> {
	let config_path = PathBuf::from(CONFIG_FILE_NAME);

	if config_path.exists() && !force {
		anyhow::bail!("{CONFIG_FILE_NAME} already exists. Use --force to overwrite.");
	}

	std::fs::write(&config_path, generate_init_template())
		.with_context(|| format!("Failed to write {}", config_path.display()))?;

	println!("Created {CONFIG_FILE_NAME}");
	Ok(ExitCode::SUCCESS)
}

fn handle_config_show(explicit: Option<&Path>) -> Result<ExitCode> {
	let Some(loaded) = resolve_config(explicit)? else {
		println!("No configuration file found.");
		return Ok(ExitCode::SUCCESS);
	};
	let config = &loaded.config;

	println!("# Source: {}", loaded.path.display());
	println!("# extensions: {}", config.extensions.join(", "));
	println!(
		"# transform-in-development: {}",
		config.transform_in_development
	);
	println!("# match-against: {}", config.match_against.as_str());
	println!("# targets: {}", config.targets.len());
	println!();

	for (i, target) in config.targets.iter().enumerate() {
		println!("  Target {}:", i + 1);
		let fields = [
			("pattern", &target.pattern),
			("replace_content", &target.replace_content),
			("content_rewrite", &target.content_rewrite),
			("transform_command", &target.transform_command),
			("rename_to", &target.rename_to),
			("path_rewrite", &target.path_rewrite),
			("rename_command", &target.rename_command),
		];
		for (name, value) in fields {
			if let Some(value) = value {
				println!("    {name}: {value}");
			}
		}
		println!();
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_config_validate(explicit: Option<&Path>) -> Result<ExitCode> {
	let loaded = match resolve_config(explicit) {
		Ok(Some(loaded)) => loaded,
		Ok(None) => {
			println!("No configuration file found.");
			return Ok(ExitCode::SUCCESS);
		}
		Err(e) => {
			eprintln!("Configuration error: {e:#}");
			return Ok(ExitCode::FAILURE);
		}
	};

	// Compiling catches bad globs and substitutions that parse cleanly
	if let Err(e) = compile_rule_set(&loaded.config, BuildEnvironment::Production) {
		eprintln!("Configuration error: {e}");
		return Ok(ExitCode::FAILURE);
	}

	println!(
		"Configuration is valid: {} ({} targets)",
		loaded.path.display(),
		loaded.config.targets.len()
	);
	Ok(ExitCode::SUCCESS)
}
