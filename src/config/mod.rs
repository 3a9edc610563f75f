//! Configuration loading and parsing for tree-transforms.
//!
//! This module handles:
//! - TOML config file parsing and validation
//! - Nearest-ancestor config discovery
//! - Environment gating of the whole rule set

pub mod discover;
pub mod parser;
pub mod template;
pub mod types;

pub use discover::{CONFIG_FILE_NAME, discover_config, load_config};
pub use parser::{parse_config_file, parse_config_str};
pub use template::generate_init_template;
pub use types::{BuildEnvironment, Config, LoadedConfig, Target};
