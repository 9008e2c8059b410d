//! Glob-based removal of files from the work set.
//!
//! Patterns follow fnmatch rules: `*` and `?` also match `/`, and `[...]`
//! is a character class. A file is dropped when any pattern matches its
//! absolute path.

use crate::error::{Error, Result};
use crate::CheckTarget;
use glob::Pattern;
use std::fs;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct ExclusionFilter {
    patterns: Vec<Pattern>,
}

impl ExclusionFilter {
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                Pattern::new(p).map_err(|source| Error::Pattern {
                    pattern: p.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    /// Read one pattern per line, anchoring relative ones at `cwd`.
    ///
    /// Blank lines and `#` comments are skipped.
    pub fn from_file(path: &Path, cwd: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::io("Failed to read exclusion file", path, e))?;

        Self::new(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(|line| absolute_pattern(line, cwd)),
        )
    }

    pub fn extend(&mut self, other: ExclusionFilter) {
        self.patterns.extend(other.patterns);
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        let path = path.to_string_lossy();
        self.patterns.iter().any(|p| p.matches(&path))
    }

    pub fn filter(&self, files: Vec<CheckTarget>) -> Vec<CheckTarget> {
        if self.patterns.is_empty() {
            return files;
        }

        files
            .into_iter()
            .filter(|target| {
                let excluded = self.is_excluded(&target.path);
                if excluded {
                    tracing::debug!(file = %target.path.display(), "excluded");
                }
                !excluded
            })
            .collect()
    }
}

/// Patterns that are absolute or open with a wildcard are used verbatim.
pub fn absolute_pattern(pattern: &str, cwd: &Path) -> String {
    if pattern.starts_with(['*', '?', '[']) || Path::new(pattern).is_absolute() {
        pattern.to_string()
    } else {
        absolute_path(Path::new(pattern), cwd)
            .to_string_lossy()
            .into_owned()
    }
}

/// Join `path` onto `cwd` when relative and fold `.`/`..` lexically.
pub fn absolute_path(path: &Path, cwd: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };

    let mut clean = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                clean.pop();
            }
            other => clean.push(other),
        }
    }
    clean
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn targets(paths: &[&str]) -> Vec<CheckTarget> {
        paths.iter().map(|p| CheckTarget::new(*p)).collect()
    }

    fn paths(targets: &[CheckTarget]) -> Vec<&Path> {
        targets.iter().map(|t| t.path.as_path()).collect()
    }

    #[test]
    fn test_vendor_pattern() {
        let filter = ExclusionFilter::new(["*/vendor/*"]).unwrap();
        let kept = filter.filter(targets(&["/repo/vendor/x.py", "/repo/src/y.py"]));
        assert_eq!(paths(&kept), vec![Path::new("/repo/src/y.py")]);
    }

    #[test]
    fn test_no_patterns_is_identity() {
        let filter = ExclusionFilter::default();
        let files = targets(&["/a/b.py", "/c/d.rs"]);
        assert_eq!(filter.filter(files.clone()), files);
    }

    #[test]
    fn test_union_of_patterns_is_order_independent() {
        let files = targets(&["/r/a.md", "/r/b.py", "/r/c.rs", "/r/d.txt"]);
        let forward = ExclusionFilter::new(["*.md", "/r/[bc].*"]).unwrap();
        let backward = ExclusionFilter::new(["/r/[bc].*", "*.md"]).unwrap();

        assert_eq!(forward.filter(files.clone()), backward.filter(files.clone()));
        assert_eq!(paths(&forward.filter(files)), vec![Path::new("/r/d.txt")]);
    }

    #[test]
    fn test_question_mark_and_classes() {
        let filter = ExclusionFilter::new(["/r/file?.[ch]"]).unwrap();
        assert!(filter.is_excluded(Path::new("/r/file1.c")));
        assert!(filter.is_excluded(Path::new("/r/fileX.h")));
        assert!(!filter.is_excluded(Path::new("/r/file10.c")));
        assert!(!filter.is_excluded(Path::new("/r/file1.rs")));
    }

    #[test]
    fn test_pattern_file_is_anchored_at_cwd() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# generated code").unwrap();
        writeln!(file, "docs/*.txt").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  ./build/../gen/*  ").unwrap();
        writeln!(file, "*/vendor/*").unwrap();

        let filter = ExclusionFilter::from_file(file.path(), Path::new("/repo")).unwrap();
        assert_eq!(filter.len(), 3);
        assert!(filter.is_excluded(Path::new("/repo/docs/a.txt")));
        assert!(filter.is_excluded(Path::new("/repo/gen/x.rs")));
        assert!(filter.is_excluded(Path::new("/repo/vendor/lib.py")));
        assert!(!filter.is_excluded(Path::new("/elsewhere/docs/a.txt")));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = ExclusionFilter::new(["[unclosed"]).unwrap_err();
        assert!(matches!(err, Error::Pattern { .. }));
    }

    #[test]
    fn test_missing_pattern_file() {
        let err =
            ExclusionFilter::from_file(Path::new("/nonexistent/excludes"), Path::new("/")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_absolute_path() {
        let cwd = Path::new("/repo/sub");
        assert_eq!(absolute_path(Path::new("a.py"), cwd), PathBuf::from("/repo/sub/a.py"));
        assert_eq!(absolute_path(Path::new("../b.py"), cwd), PathBuf::from("/repo/b.py"));
        assert_eq!(absolute_path(Path::new("/x/./y"), cwd), PathBuf::from("/x/y"));
    }
}
