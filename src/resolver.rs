//! Finding, matching and merging `.editorconfig` files for a target file.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::cache::ConfigCache;
use crate::error::ConfigError;
use crate::glob::Glob;
use crate::ini::{self, ConfigFile, Section};
use crate::normalize::normalize_with;
use crate::properties::PropertyMap;

/// File name looked for in every directory.
pub const DEFAULT_FILENAME: &str = ".editorconfig";

/// How far and for what the resolver searches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Config file name, `.editorconfig` by default
    pub filename: String,
    /// Number of directories searched, starting with the target's own
    pub max_depth: Option<usize>,
    /// Last directory searched (inclusive)
    pub stop_dir: Option<PathBuf>,
    /// Derive `tab_width`/`indent_size` from each other, see [`normalize_with`]
    pub derive_defaults: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            filename: DEFAULT_FILENAME.to_string(),
            max_depth: None,
            stop_dir: None,
            derive_defaults: false,
        }
    }
}

/// A parsed config file with its section globs compiled.
#[derive(Debug)]
pub(crate) struct LoadedConfig {
    file: ConfigFile,
    /// Parallel to `file.sections`; `None` for globs that failed to compile
    globs: Vec<Option<Glob>>,
}

impl LoadedConfig {
    fn new(path: &Path, file: ConfigFile) -> Self {
        for skipped in &file.skipped {
            debug!(path = %path.display(), line = skipped.line, reason = %skipped.reason, "ignored line");
        }

        let globs = file
            .sections
            .iter()
            .map(|section| match Glob::new(&section.glob) {
                Ok(glob) => Some(glob),
                Err(err) => {
                    debug!(
                        path = %path.display(),
                        line = section.line,
                        glob = %section.glob,
                        %err,
                        "section glob matches nothing"
                    );
                    None
                }
            })
            .collect();

        Self { file, globs }
    }

    /// Sections whose glob matches `relative`, in file order.
    fn matching<'a>(&'a self, relative: &'a str) -> impl Iterator<Item = &'a Section> + 'a {
        self.file
            .sections
            .iter()
            .zip(&self.globs)
            .filter(move |&(section, glob)| {
                let hit = glob.as_ref().is_some_and(|g| g.is_match(relative));
                trace!(glob = %section.glob, path = relative, hit, "match section");
                hit
            })
            .map(|(section, _)| section)
    }
}

/// A config file that applies to the target, with the directory it lives in.
struct Applicable {
    dir: PathBuf,
    config: Arc<LoadedConfig>,
}

/// Resolves EditorConfig properties.
///
/// Resolution is stateless unless the resolver was built with
/// [`Resolver::with_cache`], in which case parsed config files are reused
/// until they change on disk. Either way a resolver can be shared between
/// threads.
#[derive(Debug, Default)]
pub struct Resolver {
    options: ResolverOptions,
    cache: Option<ConfigCache>,
}

impl Resolver {
    pub fn new(options: ResolverOptions) -> Self {
        Self {
            options,
            cache: None,
        }
    }

    pub fn with_cache(options: ResolverOptions) -> Self {
        Self {
            options,
            cache: Some(ConfigCache::new()),
        }
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    pub fn cache(&self) -> Option<&ConfigCache> {
        self.cache.as_ref()
    }

    /// Resolve the properties that apply to the file at `path`.
    ///
    /// Config files are merged farthest first, so nearer files and later
    /// sections override earlier ones.
    pub fn properties(&self, path: impl AsRef<Path>) -> Result<PropertyMap, ConfigError> {
        let target = target_path(path.as_ref())?;
        let chain = self.applicable(&target)?;

        let mut merged = PropertyMap::new();
        for Applicable { dir, config } in chain.iter().rev() {
            let relative = relative_path(&target, dir);
            for section in config.matching(&relative) {
                merged.extend_from(&section.properties);
            }
        }

        Ok(normalize_with(merged, self.options.derive_defaults))
    }

    /// The config files that take part in resolving `path`, nearest first.
    pub fn config_files(&self, path: impl AsRef<Path>) -> Result<Vec<PathBuf>, ConfigError> {
        let target = target_path(path.as_ref())?;
        Ok(self
            .applicable(&target)?
            .into_iter()
            .map(|a| a.dir.join(&self.options.filename))
            .collect())
    }

    /// Load config files from the target's directory upward, nearest first,
    /// stopping after a root file.
    fn applicable(&self, target: &Path) -> Result<Vec<Applicable>, ConfigError> {
        let stop_dir = match &self.options.stop_dir {
            Some(dir) => Some(absolute(dir)?),
            None => None,
        };

        let mut chain = Vec::new();
        let Some(start) = target.parent() else {
            return Ok(chain);
        };

        for (depth, dir) in start.ancestors().enumerate() {
            if self.options.max_depth.is_some_and(|max| depth >= max) {
                break;
            }

            let file = dir.join(&self.options.filename);
            if let Some(config) = self.load(&file)? {
                let root = config.file.root;
                debug!(path = %file.display(), root, "found config file");
                chain.push(Applicable {
                    dir: dir.to_path_buf(),
                    config,
                });
                if root {
                    break;
                }
            }

            if stop_dir.as_deref() == Some(dir) {
                break;
            }
        }

        Ok(chain)
    }

    fn load(&self, file: &Path) -> Result<Option<Arc<LoadedConfig>>, ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: file.to_path_buf(),
            source,
        };

        let metadata = match fs::metadata(file) {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => return Ok(None),
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(io_error(err)),
        };

        if let Some(hit) = self.cache.as_ref().and_then(|c| c.get(file, &metadata)) {
            return Ok(Some(hit));
        }

        let bytes = match fs::read(file) {
            Ok(bytes) => bytes,
            // removed between the metadata call and now
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(io_error(err)),
        };
        let text = std::str::from_utf8(&bytes).map_err(|source| ConfigError::Parse {
            path: file.to_path_buf(),
            source,
        })?;

        let config = Arc::new(LoadedConfig::new(file, ini::parse(text)));
        if let Some(cache) = &self.cache {
            cache.insert(file, &metadata, Arc::clone(&config));
        }
        Ok(Some(config))
    }
}

/// Resolve the properties for `path` with default options and no cache.
pub fn get_properties(path: impl AsRef<Path>) -> Result<PropertyMap, ConfigError> {
    Resolver::default().properties(path)
}

fn absolute(path: &Path) -> Result<PathBuf, ConfigError> {
    std::path::absolute(path)
        .map(|p| clean(&p))
        .map_err(|source| ConfigError::Path {
            path: path.to_path_buf(),
            source,
        })
}

/// Absolute, lexically cleaned path of an existing file.
fn target_path(path: &Path) -> Result<PathBuf, ConfigError> {
    let target = absolute(path)?;
    let metadata = fs::metadata(&target).map_err(|source| ConfigError::Path {
        path: target.clone(),
        source,
    })?;

    if metadata.is_file() {
        Ok(target)
    } else {
        Err(ConfigError::NotAFile { path: target })
    }
}

/// Drop `.` and resolve `..` without touching the filesystem.
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// `target` relative to its ancestor `dir`, joined with `/`.
fn relative_path(target: &Path, dir: &Path) -> String {
    let relative = target.strip_prefix(dir).unwrap_or(target);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Options that never look above the temp dir.
    fn isolated(dir: &TempDir) -> ResolverOptions {
        ResolverOptions {
            stop_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        }
    }

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn entries(map: &PropertyMap) -> Vec<(&str, &str)> {
        map.iter().collect()
    }

    #[test]
    fn test_no_config_returns_empty_map() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a/b/c.py");
        write(&file, "");

        let props = Resolver::new(isolated(&dir)).properties(&file).unwrap();
        assert!(props.is_empty());
    }

    #[test]
    fn test_project_scenario() {
        let dir = TempDir::new().unwrap();
        let proj = dir.path().join("proj");
        write(
            &proj.join(".editorconfig"),
            "root = true\n[*.py]\nindent_style = space\nindent_size = 4\n",
        );
        let file = proj.join("src/a.py");
        write(&file, "");

        let props = get_properties(&file).unwrap();
        assert_eq!(
            entries(&props),
            vec![("indent_style", "space"), ("indent_size", "4")]
        );

        write(&proj.join("src/.editorconfig"), "[*.py]\nindent_size = 2\n");
        let props = get_properties(&file).unwrap();
        assert_eq!(
            entries(&props),
            vec![("indent_style", "space"), ("indent_size", "2")]
        );
    }

    #[test]
    fn test_basename_glob_matches_at_depth() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join(".editorconfig"), "root = true\n[*.py]\nx = 1\n");
        let file = dir.path().join("a/b/c/d.py");
        write(&file, "");

        let props = get_properties(&file).unwrap();
        assert_eq!(props.get("x"), Some("1"));
    }

    #[test]
    fn test_slash_glob_matches_relative_to_config_dir() {
        let dir = TempDir::new().unwrap();
        write(
            &dir.path().join(".editorconfig"),
            "root = true\n[src/*.py]\nx = 1\n[/top.py]\ny = 2\n",
        );
        let direct = dir.path().join("src/a.py");
        let nested = dir.path().join("src/sub/a.py");
        let top = dir.path().join("top.py");
        let deep_top = dir.path().join("src/top.py");
        for f in [&direct, &nested, &top, &deep_top] {
            write(f, "");
        }

        assert_eq!(get_properties(&direct).unwrap().get("x"), Some("1"));
        assert!(get_properties(&nested).unwrap().is_empty());
        assert_eq!(get_properties(&top).unwrap().get("y"), Some("2"));
        assert_eq!(get_properties(&deep_top).unwrap().get("y"), None);
    }

    #[test]
    fn test_nearer_file_wins_and_order_is_farthest_first() {
        let dir = TempDir::new().unwrap();
        write(
            &dir.path().join(".editorconfig"),
            "[*]\ncharset = utf-8\nindent_size = 8\n",
        );
        write(
            &dir.path().join("sub/.editorconfig"),
            "[*]\nindent_size = 2\nend_of_line = lf\n",
        );
        let file = dir.path().join("sub/f.txt");
        write(&file, "");

        let props = Resolver::new(isolated(&dir)).properties(&file).unwrap();
        assert_eq!(
            entries(&props),
            vec![
                ("charset", "utf-8"),
                ("indent_size", "2"),
                ("end_of_line", "lf")
            ]
        );
    }

    #[test]
    fn test_root_halts_traversal() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join(".editorconfig"), "[*.py]\nindent_size = 8\n");
        write(
            &dir.path().join("proj/.editorconfig"),
            "root = true\n[*.txt]\nindent_size = 3\n",
        );
        let file = dir.path().join("proj/src/a.py");
        write(&file, "");

        let resolver = Resolver::new(isolated(&dir));
        assert!(resolver.properties(&file).unwrap().is_empty());
        assert_eq!(
            resolver.config_files(&file).unwrap(),
            vec![dir.path().join("proj/.editorconfig")]
        );
    }

    #[test]
    fn test_malformed_glob_section_skipped() {
        let dir = TempDir::new().unwrap();
        write(
            &dir.path().join(".editorconfig"),
            "root = true\n[[*.py]\nindent_size = 8\n[*.py]\nindent_style = tab\n",
        );
        let file = dir.path().join("a.py");
        write(&file, "");

        let props = get_properties(&file).unwrap();
        assert_eq!(entries(&props), vec![("indent_style", "tab")]);
    }

    #[test]
    fn test_unterminated_header_skipped() {
        let dir = TempDir::new().unwrap();
        write(
            &dir.path().join(".editorconfig"),
            "root = true\n[*.py\nindent_size = 8\n[*.py]\nindent_style = tab\n",
        );
        let file = dir.path().join("a.py");
        write(&file, "");

        let props = get_properties(&file).unwrap();
        assert_eq!(entries(&props), vec![("indent_style", "tab")]);
    }

    #[test]
    fn test_same_file_last_section_wins() {
        let dir = TempDir::new().unwrap();
        write(
            &dir.path().join(".editorconfig"),
            "root = true\n[*.py]\nindent_size = 4\n[*]\nindent_size = 2\n",
        );
        let file = dir.path().join("a.py");
        write(&file, "");

        let props = get_properties(&file).unwrap();
        assert_eq!(props.get("indent_size"), Some("2"));
    }

    #[test]
    fn test_values_are_normalized_after_merge() {
        let dir = TempDir::new().unwrap();
        write(
            &dir.path().join(".editorconfig"),
            "root = true\n[*]\nIndent_Style = SPACE\nindent_size = tab\ntab_width = 4\nX = Keep\n",
        );
        let file = dir.path().join("a.c");
        write(&file, "");

        let props = get_properties(&file).unwrap();
        assert_eq!(
            entries(&props),
            vec![
                ("indent_style", "space"),
                ("indent_size", "4"),
                ("tab_width", "4"),
                ("x", "Keep")
            ]
        );
    }

    #[test]
    fn test_derive_defaults_option() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join(".editorconfig"), "root = true\n[*]\nindent_size = 2\n");
        let file = dir.path().join("a.c");
        write(&file, "");

        let resolver = Resolver::new(ResolverOptions {
            derive_defaults: true,
            ..Default::default()
        });
        assert_eq!(resolver.properties(&file).unwrap().get("tab_width"), Some("2"));
    }

    #[test]
    fn test_max_depth_limits_search() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join(".editorconfig"), "root = true\n[*]\nx = 1\n");
        let file = dir.path().join("a/b.txt");
        write(&file, "");

        let shallow = Resolver::new(ResolverOptions {
            max_depth: Some(1),
            ..Default::default()
        });
        assert!(shallow.properties(&file).unwrap().is_empty());

        let deep = Resolver::new(ResolverOptions {
            max_depth: Some(2),
            ..Default::default()
        });
        assert_eq!(deep.properties(&file).unwrap().get("x"), Some("1"));
    }

    #[test]
    fn test_stop_dir_is_inclusive() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join(".editorconfig"), "[*]\nx = outer\n");
        write(&dir.path().join("proj/.editorconfig"), "[*]\ny = inner\n");
        let file = dir.path().join("proj/src/f.txt");
        write(&file, "");

        let resolver = Resolver::new(ResolverOptions {
            stop_dir: Some(dir.path().join("proj")),
            ..Default::default()
        });
        let props = resolver.properties(&file).unwrap();
        assert_eq!(entries(&props), vec![("y", "inner")]);
    }

    #[test]
    fn test_custom_filename() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join(".editorconfig"), "root = true\n[*]\nx = default\n");
        write(&dir.path().join("my.ini"), "root = true\n[*]\nx = custom\n");
        let file = dir.path().join("f.txt");
        write(&file, "");

        let resolver = Resolver::new(ResolverOptions {
            filename: "my.ini".to_string(),
            ..Default::default()
        });
        assert_eq!(resolver.properties(&file).unwrap().get("x"), Some("custom"));
    }

    #[test]
    fn test_dot_segments_in_target_path() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join(".editorconfig"), "root = true\n[sub/*.txt]\nx = 1\n");
        let file = dir.path().join("sub/f.txt");
        write(&file, "");
        fs::create_dir_all(dir.path().join("other")).unwrap();

        let odd = dir.path().join("other/../sub/./f.txt");
        assert_eq!(get_properties(odd).unwrap().get("x"), Some("1"));
    }

    #[test]
    fn test_missing_target_is_path_error() {
        let dir = TempDir::new().unwrap();
        let err = get_properties(dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, ConfigError::Path { .. }));
        assert!(get_properties("").is_err());
    }

    #[test]
    fn test_directory_target_is_rejected() {
        let dir = TempDir::new().unwrap();
        let err = get_properties(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::NotAFile { .. }));
    }

    #[test]
    fn test_invalid_utf8_config_is_parse_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".editorconfig"), b"[*]\nx = \xff\xfe\n").unwrap();
        let file = dir.path().join("f.txt");
        write(&file, "");

        let err = Resolver::new(isolated(&dir)).properties(&file).unwrap_err();
        match err {
            ConfigError::Parse { path, .. } => {
                assert_eq!(path, dir.path().join(".editorconfig"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_config_is_io_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let config = dir.path().join(".editorconfig");
        write(&config, "root = true\n[*]\nx = 1\n");
        fs::set_permissions(&config, fs::Permissions::from_mode(0o000)).unwrap();
        let file = dir.path().join("f.txt");
        write(&file, "");

        // permission bits do not stop root
        if fs::read(&config).is_ok() {
            return;
        }

        let err = Resolver::new(isolated(&dir)).properties(&file).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert_eq!(err.path(), config);

        fs::set_permissions(&config, fs::Permissions::from_mode(0o644)).unwrap();
    }

    #[test]
    fn test_deeply_nested_glob_does_not_abort_resolution() {
        let dir = TempDir::new().unwrap();
        let header = format!("{}a{}", "{".repeat(1000), "}".repeat(1000));
        write(
            &dir.path().join(".editorconfig"),
            &format!("root = true\n[{header}]\nx = 1\n[*]\ny = 2\n"),
        );
        let file = dir.path().join("a");
        write(&file, "");

        // default 2 MiB stack, like any thread a host might resolve on
        let props = std::thread::spawn(move || get_properties(&file))
            .join()
            .unwrap()
            .unwrap();
        assert_eq!(entries(&props), vec![("y", "2")]);
    }

    #[test]
    fn test_bom_and_crlf_config() {
        let dir = TempDir::new().unwrap();
        write(
            &dir.path().join(".editorconfig"),
            "\u{feff}root = true\r\n[*]\r\nend_of_line = CRLF\r\n",
        );
        let file = dir.path().join("f.txt");
        write(&file, "");

        assert_eq!(
            get_properties(&file).unwrap().get("end_of_line"),
            Some("crlf")
        );
    }

    #[test]
    fn test_config_directory_named_like_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("sub/.editorconfig")).unwrap();
        write(&dir.path().join(".editorconfig"), "root = true\n[*]\nx = 1\n");
        let file = dir.path().join("sub/f.txt");
        write(&file, "");

        assert_eq!(get_properties(&file).unwrap().get("x"), Some("1"));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let dir = TempDir::new().unwrap();
        write(
            &dir.path().join(".editorconfig"),
            "root = true\n[*]\nindent_style = tab\n[*.{md,txt}]\ntrim_trailing_whitespace = false\n",
        );
        let file = dir.path().join("notes.md");
        write(&file, "");

        let first = get_properties(&file).unwrap();
        let second = get_properties(&file).unwrap();
        assert_eq!(first, second);

        let cached = Resolver::with_cache(ResolverOptions::default());
        assert_eq!(cached.properties(&file).unwrap(), first);
        assert_eq!(cached.properties(&file).unwrap(), first);
    }

    #[test]
    fn test_cache_reuses_and_invalidates() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join(".editorconfig");
        write(&config, "root = true\n[*]\nindent_size = 2\n");
        let file = dir.path().join("f.txt");
        write(&file, "");

        let resolver = Resolver::with_cache(ResolverOptions::default());
        assert_eq!(resolver.options(), &ResolverOptions::default());
        assert_eq!(resolver.cache().map(ConfigCache::is_empty), Some(true));
        assert_eq!(resolver.properties(&file).unwrap().get("indent_size"), Some("2"));
        assert_eq!(resolver.cache().map(ConfigCache::len), Some(1));

        // different length, so the entry is stale even with coarse mtimes
        write(&config, "root = true\n[*]\nindent_size = 12\n");
        assert_eq!(
            resolver.properties(&file).unwrap().get("indent_size"),
            Some("12")
        );
        assert_eq!(resolver.cache().map(ConfigCache::len), Some(1));

        if let Some(cache) = resolver.cache() {
            cache.clear();
        }
        assert_eq!(resolver.cache().map(ConfigCache::is_empty), Some(true));
        assert_eq!(
            resolver.properties(&file).unwrap().get("indent_size"),
            Some("12")
        );
    }

    #[test]
    fn test_shared_resolver_across_threads() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join(".editorconfig"), "root = true\n[*.rs]\nindent_size = 4\n");
        let files: Vec<_> = (0..8)
            .map(|n| {
                let file = dir.path().join(format!("m{n}/lib.rs"));
                write(&file, "");
                file
            })
            .collect();

        let resolver = Resolver::with_cache(ResolverOptions::default());
        std::thread::scope(|scope| {
            for file in &files {
                let resolver = &resolver;
                scope.spawn(move || {
                    for _ in 0..10 {
                        let props = resolver.properties(file).unwrap();
                        assert_eq!(props.get("indent_size"), Some("4"));
                    }
                });
            }
        });
    }

    #[cfg(unix)]
    #[test]
    fn test_clean_path() {
        assert_eq!(clean(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(clean(Path::new("/../a")), PathBuf::from("/a"));
    }

    #[cfg(unix)]
    #[test]
    fn test_relative_path_uses_forward_slashes() {
        let target = Path::new("/proj/src/deep/a.py");
        assert_eq!(relative_path(target, Path::new("/proj")), "src/deep/a.py");
        assert_eq!(relative_path(target, Path::new("/proj/src/deep")), "a.py");
    }
}
