//! Template generation for `--init` command

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::file::CONFIG_FILENAME;

/// Template ecprops.toml with documentation
pub const ECPROPS_TOML_TEMPLATE: &str = r#"# ecprops.toml - Configuration for the ecprops EditorConfig resolver
#
# ecprops prints the EditorConfig properties that apply to each file:
# it looks for .editorconfig files from the file's directory upward,
# stopping at a file with `root = true`, and merges the sections whose
# globs match. Nearer files override farther ones.
#
# Every setting below is optional; command-line flags take precedence.

[resolver]
# Name of the per-directory config file.
# Default: ".editorconfig"
# filename = ".editorconfig"

# Number of directories searched, starting with the file's own directory.
# Comment out to search up to the filesystem root.
# max_depth = 10

# Never search above this directory (inclusive).
# Relative paths are relative to this file.
# stop_at = "."

# Fill in tab_width from a numeric indent_size, and indent_size = tab
# from indent_style = tab, as the reference EditorConfig cores do.
# Default: false
# derive_defaults = false

[output]
# "plain" prints key=value lines, "json" prints an object per file.
# Default: "plain"
# format = "plain"
"#;

/// Generate ecprops.toml in the specified directory (or current directory if None).
///
/// Returns an error if ecprops.toml already exists.
pub fn generate_init_file_in(dir: Option<&Path>) -> io::Result<PathBuf> {
    let path = dir.map_or_else(|| PathBuf::from(CONFIG_FILENAME), |d| d.join(CONFIG_FILENAME));

    if path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{CONFIG_FILENAME} already exists"),
        ));
    }

    fs::write(&path, ECPROPS_TOML_TEMPLATE)?;
    Ok(path)
}

/// Generate ecprops.toml in the current directory.
///
/// Returns an error if ecprops.toml already exists.
pub fn generate_init_file() -> io::Result<PathBuf> {
    generate_init_file_in(None)
}
