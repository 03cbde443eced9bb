//! Resolve EditorConfig properties.
//!
//! [`get_properties`] finds every `.editorconfig` file between a file and the
//! filesystem root (stopping at one marked `root = true`), keeps the sections
//! whose globs match the file, and merges them with nearer files winning.
//!
//! ```no_run
//! let props = ecprops::get_properties("src/main.rs")?;
//! if let Some(style) = props.indent_style() {
//!     println!("indent with {style}");
//! }
//! # Ok::<(), ecprops::ConfigError>(())
//! ```

pub mod cache;
pub mod colors;
pub mod config;
mod error;
pub mod glob;
pub mod ini;
pub mod normalize;
mod output;
pub mod properties;
pub mod resolver;
pub mod walker;

pub use cache::ConfigCache;
pub use colors::{should_use_colors, Colors};
pub use config::{
    find_config_file, generate_init_file, load_config, merge_output_format,
    merge_resolver_options, CliResolverOptions, EcpropsToml, LoadError, ECPROPS_TOML_TEMPLATE,
};
pub use error::ConfigError;
pub use normalize::{normalize, validate, PropertyWarning};
pub use output::{Config, OutputContext, OutputFormat, Report, RunResult};
pub use properties::{
    Charset, EndOfLine, IndentSize, IndentStyle, MaxLineLength, PropertyMap,
};
pub use resolver::{get_properties, Resolver, ResolverOptions, DEFAULT_FILENAME};
pub use walker::walk_paths;

use indexmap::IndexMap;
use std::io;
use std::path::Path;

/// Main entry point: resolve and print every file in the given paths
pub fn run(paths: &[String], config: &Config, ctx: &OutputContext) -> io::Result<RunResult> {
    let mut result = RunResult::default();
    let resolver = Resolver::with_cache(config.resolver.clone());

    let mut files = vec![];
    for path in walk_paths(paths) {
        match path {
            Ok(path) => files.push(path),
            Err(e) => {
                result.files_failed += 1;
                output::print_error(&e, ctx);
            }
        }
    }

    let with_header = files.len() > 1;
    let mut json = IndexMap::new();

    for path in &files {
        let Some(report) = resolve_file(path, &resolver, config, &mut result, ctx) else {
            continue;
        };

        match config.format {
            OutputFormat::Plain => output::print_report(path, &report, with_header, ctx),
            OutputFormat::Json => {
                json.insert(path.display().to_string(), report);
            }
        }
    }

    if config.format == OutputFormat::Json {
        output::print_json(&json)?;
    }

    output::print_summary(&result, ctx);

    Ok(result)
}

fn resolve_file(
    path: &Path,
    resolver: &Resolver,
    config: &Config,
    result: &mut RunResult,
    ctx: &OutputContext,
) -> Option<Report> {
    let report = if config.list_files {
        resolver.config_files(path).map(Report::ConfigFiles)
    } else {
        resolver.properties(path).map(Report::Properties)
    };

    match report {
        Ok(report) => {
            result.files_resolved += 1;
            if let Report::Properties(properties) = &report {
                let warnings = validate(properties);
                result.warnings += warnings.len();
                output::print_warnings(path, &warnings, ctx);
            }
            Some(report)
        }
        Err(e) => {
            result.files_failed += 1;
            output::print_error(&e, ctx);
            None
        }
    }
}
