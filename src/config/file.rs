//! Config file discovery and loading

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::toml_schema::EcpropsToml;

/// Name of the tool's own configuration file.
pub const CONFIG_FILENAME: &str = "ecprops.toml";

/// Error type for configuration loading
#[derive(Debug, Error)]
pub enum LoadError {
    /// IO error reading the file
    #[error("failed to read config file: {0}")]
    Io(#[from] io::Error),
    /// TOML parsing error
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Search upward from `start_dir` for a file with the given name.
///
/// If `stop_at_git_root` is true, stops searching when a `.git` directory is found.
/// Returns `None` if the file is not found.
pub fn find_file_upward(
    start_dir: &Path,
    filename: &str,
    stop_at_git_root: bool,
) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let file_path = current.join(filename);
        if file_path.is_file() {
            return Some(file_path);
        }

        if stop_at_git_root && current.join(".git").exists() {
            return None;
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Find ecprops.toml by searching upward from the given directory.
///
/// Stops at the first `ecprops.toml` found, or at the git repository root
/// (directory containing `.git`), whichever comes first.
pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    find_file_upward(start_dir, CONFIG_FILENAME, true)
}

/// Load and parse ecprops.toml from the given path.
///
/// A relative `stop_at` is resolved against the directory holding the file.
pub fn load_config(path: &Path) -> Result<EcpropsToml, LoadError> {
    let content = fs::read_to_string(path)?;
    let mut config: EcpropsToml = toml::from_str(&content)?;

    if let (Some(stop_at), Some(dir)) = (config.resolver.stop_at.as_mut(), path.parent()) {
        if stop_at.is_relative() {
            *stop_at = dir.join(&*stop_at);
        }
    }

    Ok(config)
}
