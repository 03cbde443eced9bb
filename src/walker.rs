use ignore::WalkBuilder;
use std::io;
use std::path::{Path, PathBuf};

/// Expand paths into files.
///
/// Directories are walked recursively, skipping hidden entries and respecting
/// gitignore. Anything else is passed through untouched so the resolver can
/// report on it.
pub fn walk_paths(paths: &[String]) -> impl Iterator<Item = io::Result<PathBuf>> {
    let mut all_files = vec![];

    for path in paths {
        if !Path::new(path).is_dir() {
            all_files.push(Ok(PathBuf::from(path)));
            continue;
        }

        let walker = WalkBuilder::new(path)
            .hidden(true) // Skip hidden files, .editorconfig included
            .git_ignore(true) // Respect .gitignore
            .git_global(true)
            .git_exclude(true)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_some_and(|ft| ft.is_file()) {
                        all_files.push(Ok(entry.into_path()));
                    }
                }
                Err(e) => {
                    all_files.push(Err(io::Error::other(e.to_string())));
                }
            }
        }
    }

    all_files.into_iter()
}
