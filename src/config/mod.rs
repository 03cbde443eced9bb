//! Configuration file support for ecprops.
//!
//! This module provides:
//! - Loading configuration from `ecprops.toml`
//! - Config file discovery (search upward from current directory)
//! - Merging CLI args, config file, and defaults
//! - Template generation with `--init`

mod file;
mod init;
mod merge;
mod toml_schema;

pub use file::{find_config_file, find_file_upward, load_config, LoadError, CONFIG_FILENAME};
pub use init::{generate_init_file, generate_init_file_in, ECPROPS_TOML_TEMPLATE};
pub use merge::{merge_output_format, merge_resolver_options, CliResolverOptions};
pub use toml_schema::{EcpropsToml, OutputSection, ResolverSection};
