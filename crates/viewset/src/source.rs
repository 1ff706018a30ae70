//! Read-only file collections that view templates are loaded from.
//!
//! A [`FileSource`] lists file names (always `/`-separated and relative to the
//! source root) and reads their content. Pattern lookup is provided on top of
//! the listing, so every source resolves globs the same way:
//!
//! - `*`, `?` and `[...]` match within a single path segment (`*` never crosses `/`)
//! - matches are returned in lexical order, like a sorted directory listing
//!
//! Two sources ship with the crate:
//!
//! | Source | Use |
//! |--------|-----|
//! | [`DirSource`] | Templates on disk, re-read on every access (works with auto-reload) |
//! | [`MemorySource`] | Templates held in memory (embedded content, tests) |

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use glob::{MatchOptions, Pattern};

use crate::error::ViewError;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A read-only, named collection of template files.
pub trait FileSource: Send + Sync {
    /// Lists every file name in the source.
    fn names(&self) -> Result<Vec<String>, ViewError>;

    /// Reads the content of the named file.
    fn read(&self, name: &str) -> Result<String, ViewError>;

    /// Returns the names matching a glob pattern, sorted.
    ///
    /// An empty result is not an error here; callers decide whether zero
    /// matches is acceptable. Invalid pattern syntax fails with
    /// [`ViewError::Pattern`].
    fn glob(&self, pattern: &str) -> Result<Vec<String>, ViewError> {
        let compiled = Pattern::new(pattern).map_err(|e| ViewError::Pattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

        let mut matches: Vec<String> = self
            .names()?
            .into_iter()
            .filter(|name| compiled.matches_with(name, MATCH_OPTIONS))
            .collect();
        matches.sort();
        Ok(matches)
    }
}

/// Templates read from a directory on disk.
///
/// Nothing is cached: listing walks the directory and reads go straight to
/// the filesystem, so edits are visible to the next compilation.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    /// Creates a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory this source reads from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, ViewError> {
        let relative = Path::new(name);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(ViewError::Read {
                name: name.to_string(),
                message: "path escapes the template root".to_string(),
            });
        }
        Ok(self.root.join(relative))
    }
}

impl FileSource for DirSource {
    fn names(&self) -> Result<Vec<String>, ViewError> {
        let mut names = Vec::new();
        walk_dir(&self.root, &self.root, &mut names).map_err(|e| ViewError::Read {
            name: self.root.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(names)
    }

    fn read(&self, name: &str) -> Result<String, ViewError> {
        let path = self.resolve(name)?;
        std::fs::read_to_string(&path).map_err(|e| ViewError::Read {
            name: name.to_string(),
            message: e.to_string(),
        })
    }
}

/// Recursively collects file names relative to `root`, `/`-separated.
///
/// Symlinked directories are followed.
fn walk_dir(root: &Path, dir: &Path, names: &mut Vec<String>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            walk_dir(root, &path, names)?;
            continue;
        }
        if let Ok(relative) = path.strip_prefix(root) {
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            names.push(name);
        }
    }
    Ok(())
}

/// Templates held in memory.
///
/// Content can be replaced after the source is shared, which makes it handy
/// for exercising reload behavior without touching the disk.
#[derive(Debug, Default)]
pub struct MemorySource {
    files: RwLock<BTreeMap<String, String>>,
}

impl MemorySource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source from `(name, content)` pairs.
    ///
    /// ```rust
    /// use viewset::{FileSource, MemorySource};
    ///
    /// let source = MemorySource::from_entries(&[
    ///     ("layout.html", "<main>{% include page_template %}</main>"),
    ///     ("pages/index.html", "hello"),
    /// ]);
    /// assert_eq!(source.glob("pages/*.html").unwrap(), vec!["pages/index.html"]);
    /// ```
    pub fn from_entries(entries: &[(&str, &str)]) -> Self {
        let files = entries
            .iter()
            .map(|(name, content)| (name.to_string(), content.to_string()))
            .collect();
        Self {
            files: RwLock::new(files),
        }
    }

    /// Adds or replaces a file.
    pub fn insert(&self, name: impl Into<String>, content: impl Into<String>) {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), content.into());
    }

    /// Removes a file, returning its content if it existed.
    pub fn remove(&self, name: &str) -> Option<String> {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
    }
}

impl FileSource for MemorySource {
    fn names(&self) -> Result<Vec<String>, ViewError> {
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        Ok(files.keys().cloned().collect())
    }

    fn read(&self, name: &str) -> Result<String, ViewError> {
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        files.get(name).cloned().ok_or_else(|| ViewError::Read {
            name: name.to_string(),
            message: "file does not exist".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sample() -> MemorySource {
        MemorySource::from_entries(&[
            ("layout.html", "L"),
            ("pages/b.html", "B"),
            ("pages/a.html", "A"),
            ("pages/nested/c.html", "C"),
            ("includes/header.html", "H"),
        ])
    }

    #[test]
    fn test_glob_sorted_matches() {
        let source = sample();
        let matches = source.glob("pages/*.html").unwrap();
        assert_eq!(matches, vec!["pages/a.html", "pages/b.html"]);
    }

    #[test]
    fn test_glob_star_does_not_cross_separator() {
        let source = sample();
        assert!(!source
            .glob("pages/*.html")
            .unwrap()
            .contains(&"pages/nested/c.html".to_string()));
        assert!(source.glob("*.html").unwrap() == vec!["layout.html"]);
    }

    #[test]
    fn test_glob_literal_name() {
        let source = sample();
        assert_eq!(source.glob("layout.html").unwrap(), vec!["layout.html"]);
    }

    #[test]
    fn test_glob_no_matches_is_empty() {
        let source = sample();
        assert!(source.glob("missing/*.html").unwrap().is_empty());
    }

    #[test]
    fn test_glob_invalid_pattern() {
        let source = sample();
        let err = source.glob("pages/[.html").unwrap_err();
        assert!(matches!(err, ViewError::Pattern { .. }));
    }

    #[test]
    fn test_memory_insert_and_remove() {
        let source = MemorySource::new();
        source.insert("a.html", "one");
        assert_eq!(source.read("a.html").unwrap(), "one");
        source.insert("a.html", "two");
        assert_eq!(source.read("a.html").unwrap(), "two");
        assert_eq!(source.remove("a.html").as_deref(), Some("two"));
        assert!(source.read("a.html").is_err());
    }

    #[test]
    fn test_dir_source_lists_relative_names() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("pages")).unwrap();
        fs::write(temp.path().join("layout.html"), "L").unwrap();
        fs::write(temp.path().join("pages/index.html"), "I").unwrap();

        let source = DirSource::new(temp.path());
        let mut names = source.names().unwrap();
        names.sort();
        assert_eq!(names, vec!["layout.html", "pages/index.html"]);
        assert_eq!(source.glob("pages/*.html").unwrap(), vec!["pages/index.html"]);
        assert_eq!(source.read("pages/index.html").unwrap(), "I");
    }

    #[cfg(unix)]
    #[test]
    fn test_dir_source_follows_symlinked_dirs() {
        let shared = TempDir::new().unwrap();
        fs::write(shared.path().join("header.html"), "H").unwrap();

        let temp = TempDir::new().unwrap();
        std::os::unix::fs::symlink(shared.path(), temp.path().join("includes")).unwrap();

        let source = DirSource::new(temp.path());
        assert_eq!(source.names().unwrap(), vec!["includes/header.html"]);
        assert_eq!(
            source.glob("includes/*.html").unwrap(),
            vec!["includes/header.html"]
        );
        assert_eq!(source.read("includes/header.html").unwrap(), "H");
    }

    #[test]
    fn test_dir_source_rejects_parent_paths() {
        let temp = TempDir::new().unwrap();
        let source = DirSource::new(temp.path());
        let err = source.read("../secret.html").unwrap_err();
        assert!(matches!(err, ViewError::Read { .. }));
    }

    #[test]
    fn test_dir_source_missing_root() {
        let source = DirSource::new("/definitely/not/a/template/dir");
        assert!(source.names().is_err());
    }
}
