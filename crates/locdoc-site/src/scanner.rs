//! Markdown discovery by filesystem walking.
//!
//! The scanner only lists files; it never reads their content. Paths are
//! reported relative to the source directory with forward slashes
//! (`zh/guide/README.md`) so they compare equal to sidebar references on
//! every platform.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

/// Extensions treated as documentation pages.
const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Error raised while scanning the documentation tree.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Source directory does not exist.
    #[error("documentation directory not found: {}", .0.display())]
    NotFound(PathBuf),
    /// Source path exists but is not a directory.
    #[error("documentation path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    /// A directory or entry could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// Offending path (the source directory when unknown).
        path: PathBuf,
        /// Underlying walk error.
        #[source]
        source: ignore::Error,
    },
}

/// Lists markdown files below a source directory.
#[derive(Debug, Clone)]
pub struct Scanner {
    source_dir: PathBuf,
}

impl Scanner {
    /// Create a scanner rooted at `source_dir`.
    #[must_use]
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
        }
    }

    /// Root directory being scanned.
    #[must_use]
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Lazily walk the tree.
    ///
    /// Every call starts a fresh walk. Hidden files and directories are
    /// skipped; ignore files are not consulted. A missing or unreadable
    /// directory yields an error item rather than being skipped.
    pub fn files(&self) -> Files<'_> {
        let pending = if !self.source_dir.exists() {
            Some(ScanError::NotFound(self.source_dir.clone()))
        } else if !self.source_dir.is_dir() {
            Some(ScanError::NotADirectory(self.source_dir.clone()))
        } else {
            None
        };

        let walk = pending.is_none().then(|| {
            ignore::WalkBuilder::new(&self.source_dir)
                .hidden(true)
                .ignore(false)
                .git_ignore(false)
                .git_global(false)
                .git_exclude(false)
                .parents(false)
                .sort_by_file_name(|a, b| a.cmp(b))
                .build()
        });

        Files {
            source_dir: &self.source_dir,
            walk,
            pending,
        }
    }

    /// Walk the whole tree and collect the result.
    ///
    /// # Errors
    ///
    /// Stops at the first unreadable directory.
    pub fn scan(&self) -> Result<DiscoveredFiles, ScanError> {
        let files = self.files().collect::<Result<DiscoveredFiles, _>>()?;
        tracing::debug!(
            source_dir = %self.source_dir.display(),
            file_count = files.len(),
            "Documentation tree scanned"
        );
        Ok(files)
    }
}

/// Iterator returned by [`Scanner::files`].
pub struct Files<'a> {
    source_dir: &'a Path,
    walk: Option<ignore::Walk>,
    pending: Option<ScanError>,
}

impl Iterator for Files<'_> {
    type Item = Result<String, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.pending.take() {
            return Some(Err(err));
        }
        let walk = self.walk.as_mut()?;
        loop {
            let entry = match walk.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    let path = error_path(&err).unwrap_or_else(|| self.source_dir.to_path_buf());
                    return Some(Err(ScanError::Io { path, source: err }));
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) || !is_markdown(entry.path()) {
                continue;
            }
            if let Ok(rel) = entry.path().strip_prefix(self.source_dir) {
                return Some(Ok(to_slash(rel)));
            }
        }
    }
}

/// Immutable set of discovered files, relative to the source directory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiscoveredFiles {
    files: BTreeSet<String>,
}

impl DiscoveredFiles {
    /// Whether a relative path (forward slashes) was discovered.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains(path)
    }

    /// Number of files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no file was discovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Files in lexical order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for DiscoveredFiles {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().map(Into::into).collect(),
        }
    }
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| MARKDOWN_EXTENSIONS.iter().any(|m| e.eq_ignore_ascii_case(m)))
}

/// Join path components with `/`.
fn to_slash(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Innermost path attached to a walk error.
fn error_path(err: &ignore::Error) -> Option<PathBuf> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.clone()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        ignore::Error::Loop { child, .. } => Some(child.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn create_test_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    fn scan(dir: &Path) -> Vec<String> {
        Scanner::new(dir).scan().unwrap().iter().map(str::to_owned).collect()
    }

    #[test]
    fn test_scan_finds_md_files_recursively() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("README.md"), "# Home").unwrap();
        let guide = temp_dir.path().join("zh/guide");
        fs::create_dir_all(&guide).unwrap();
        fs::write(guide.join("README.md"), "# 概述").unwrap();
        fs::write(guide.join("egg.md"), "# Egg").unwrap();
        fs::write(guide.join("notes.markdown"), "# Notes").unwrap();

        assert_eq!(
            scan(temp_dir.path()),
            vec![
                "README.md",
                "zh/guide/README.md",
                "zh/guide/egg.md",
                "zh/guide/notes.markdown",
            ]
        );
    }

    #[test]
    fn test_scan_skips_non_markdown() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("logo.svg"), "<svg/>").unwrap();
        fs::write(temp_dir.path().join("config.js"), "").unwrap();
        fs::write(temp_dir.path().join("guide.md"), "# Guide").unwrap();

        assert_eq!(scan(temp_dir.path()), vec!["guide.md"]);
    }

    #[test]
    fn test_scan_skips_hidden_files() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join(".hidden.md"), "# Hidden").unwrap();
        let vuepress = temp_dir.path().join(".vuepress");
        fs::create_dir(&vuepress).unwrap();
        fs::write(vuepress.join("theme.md"), "# Theme").unwrap();
        fs::write(temp_dir.path().join("visible.md"), "# Visible").unwrap();

        assert_eq!(scan(temp_dir.path()), vec!["visible.md"]);
    }

    #[test]
    fn test_scan_does_not_apply_gitignore() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join(".gitignore"), "draft.md\n").unwrap();
        fs::write(temp_dir.path().join("draft.md"), "# Draft").unwrap();

        assert_eq!(scan(temp_dir.path()), vec!["draft.md"]);
    }

    #[test]
    fn test_scan_empty_dir() {
        let temp_dir = create_test_dir();
        let files = Scanner::new(temp_dir.path()).scan().unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_scan_missing_dir_is_error() {
        let err = Scanner::new("/nonexistent/docs").scan().unwrap_err();
        assert!(matches!(err, ScanError::NotFound(ref p) if p == Path::new("/nonexistent/docs")));
    }

    #[test]
    fn test_scan_file_instead_of_dir() {
        let temp_dir = create_test_dir();
        let file = temp_dir.path().join("docs");
        fs::write(&file, "").unwrap();
        let err = Scanner::new(&file).scan().unwrap_err();
        assert!(matches!(err, ScanError::NotADirectory(_)));
    }

    #[test]
    fn test_files_is_restartable() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("a.md"), "").unwrap();
        fs::write(temp_dir.path().join("b.md"), "").unwrap();

        let scanner = Scanner::new(temp_dir.path());
        let first: Vec<_> = scanner.files().take(1).map(Result::unwrap).collect();
        let second: Vec<_> = scanner.files().map(Result::unwrap).collect();

        assert_eq!(first, vec!["a.md"]);
        assert_eq!(second, vec!["a.md", "b.md"]);
    }

    #[test]
    fn test_discovered_files_from_iter() {
        let files: DiscoveredFiles = ["egg.md", "guide/README.md"].into_iter().collect();
        assert!(files.contains("egg.md"));
        assert!(files.contains("guide/README.md"));
        assert!(!files.contains("guide"));
        assert_eq!(files.len(), 2);
    }
}
