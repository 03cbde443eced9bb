use std::io;
use std::path::PathBuf;
use std::str::Utf8Error;

use thiserror::Error;

/// Failure to resolve the properties of a file.
///
/// Missing `.editorconfig` files and unusable lines inside them are not
/// errors; these variants only cover failures that make the result unreliable.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The target path does not exist or cannot be made absolute.
    #[error("cannot resolve {}: {source}", path.display())]
    Path {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The target path exists but is not a file.
    #[error("{} is not a file", path.display())]
    NotAFile { path: PathBuf },

    /// A config file exists but could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A config file is not valid UTF-8.
    #[error("{} is not valid UTF-8: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: Utf8Error,
    },
}

impl ConfigError {
    /// The path the error is about: the target file or a config file.
    pub fn path(&self) -> &std::path::Path {
        match self {
            ConfigError::Path { path, .. }
            | ConfigError::NotAFile { path }
            | ConfigError::Io { path, .. }
            | ConfigError::Parse { path, .. } => path,
        }
    }
}
