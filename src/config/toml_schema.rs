//! TOML schema definitions for ecprops.toml

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::output::OutputFormat;

/// Root structure for ecprops.toml
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct EcpropsToml {
    /// Config file search settings
    #[serde(default)]
    pub resolver: ResolverSection,

    /// Output settings
    #[serde(default)]
    pub output: OutputSection,
}

/// `[resolver]` section in ecprops.toml
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ResolverSection {
    /// Config file name to look for (default: .editorconfig)
    pub filename: Option<String>,

    /// Number of directories searched upward (None = up to the filesystem root)
    pub max_depth: Option<usize>,

    /// Last directory searched; relative paths are relative to ecprops.toml
    pub stop_at: Option<PathBuf>,

    /// Derive tab_width / indent_size from each other (default: false)
    pub derive_defaults: Option<bool>,
}

/// `[output]` section in ecprops.toml
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    /// plain or json (default: plain)
    pub format: Option<OutputFormat>,
}
