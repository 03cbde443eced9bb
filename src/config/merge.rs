//! Configuration merging logic
//!
//! Priority: CLI args > ecprops.toml > defaults

use std::path::PathBuf;

use crate::output::OutputFormat;
use crate::resolver::ResolverOptions;

use super::toml_schema::{OutputSection, ResolverSection};

/// CLI options that can override config file settings.
///
/// Uses `Option<T>` to distinguish "not specified" from "explicitly set".
#[derive(Debug, Default)]
pub struct CliResolverOptions {
    pub filename: Option<String>,
    pub max_depth: Option<usize>,
    pub stop_at: Option<PathBuf>,
    /// If Some(true), derive tab_width / indent_size defaults
    pub derive_defaults: Option<bool>,
    pub format: Option<OutputFormat>,
}

/// Merge resolver settings from CLI, TOML, and defaults.
///
/// Priority: CLI > TOML > defaults
pub fn merge_resolver_options(
    cli: &CliResolverOptions,
    toml: Option<&ResolverSection>,
) -> ResolverOptions {
    let defaults = ResolverOptions::default();

    ResolverOptions {
        filename: cli
            .filename
            .clone()
            .or_else(|| toml.and_then(|t| t.filename.clone()))
            .unwrap_or(defaults.filename),
        max_depth: cli
            .max_depth
            .or_else(|| toml.and_then(|t| t.max_depth))
            .or(defaults.max_depth),
        stop_dir: cli
            .stop_at
            .clone()
            .or_else(|| toml.and_then(|t| t.stop_at.clone()))
            .or(defaults.stop_dir),
        derive_defaults: cli
            .derive_defaults
            .or_else(|| toml.and_then(|t| t.derive_defaults))
            .unwrap_or(defaults.derive_defaults),
    }
}

/// Pick the output format. Priority: CLI > TOML > plain
pub fn merge_output_format(cli: &CliResolverOptions, toml: Option<&OutputSection>) -> OutputFormat {
    cli.format
        .or_else(|| toml.and_then(|t| t.format))
        .unwrap_or_default()
}
