use crate::colors::Colors;
use crate::normalize::PropertyWarning;
use crate::properties::PropertyMap;
use crate::resolver::ResolverOptions;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `key=value` lines
    #[default]
    Plain,
    /// One JSON object keyed by path
    Json,
}

pub struct Config {
    pub resolver: ResolverOptions,
    pub format: OutputFormat,
    /// Print applicable config files instead of properties
    pub list_files: bool,
}

pub struct OutputContext {
    pub colors: Colors,
    pub quiet: bool,
}

impl OutputContext {
    pub fn new(use_colors: bool, quiet: bool) -> Self {
        Self {
            colors: Colors::new(use_colors),
            quiet,
        }
    }
}

#[derive(Debug, Default)]
pub struct RunResult {
    pub files_resolved: usize,
    pub files_failed: usize,
    pub warnings: usize,
}

impl RunResult {
    pub fn has_errors(&self) -> bool {
        self.files_failed > 0
    }
}

/// What was resolved for one file.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Report {
    Properties(PropertyMap),
    ConfigFiles(Vec<PathBuf>),
}

pub fn print_report(path: &Path, report: &Report, with_header: bool, ctx: &OutputContext) {
    if with_header {
        println!(
            "{}[{}]{}",
            ctx.colors.header,
            path.display(),
            ctx.colors.reset()
        );
    }

    match report {
        Report::Properties(properties) => {
            for (name, value) in properties.iter() {
                println!("{}{name}{}={value}", ctx.colors.key, ctx.colors.reset());
            }
        }
        Report::ConfigFiles(files) => {
            for file in files {
                println!("{}", file.display());
            }
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)
}

pub fn print_warnings(path: &Path, warnings: &[PropertyWarning], ctx: &OutputContext) {
    if ctx.quiet {
        return;
    }
    for warning in warnings {
        eprintln!(
            "{}Warning:{} {}: {warning}",
            ctx.colors.warning,
            ctx.colors.reset(),
            path.display()
        );
    }
}

pub fn print_error(err: &dyn std::fmt::Display, ctx: &OutputContext) {
    eprintln!("{}Error:{} {err}", ctx.colors.error, ctx.colors.reset());
}

pub fn print_summary(result: &RunResult, ctx: &OutputContext) {
    if ctx.quiet || !result.has_errors() {
        return;
    }
    eprintln!(
        "{}{} of {} files failed to resolve{}",
        ctx.colors.error,
        result.files_failed,
        result.files_failed + result.files_resolved,
        ctx.colors.reset()
    );
}
