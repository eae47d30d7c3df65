//! # File Collector Module
//!
//! Expands the paths given on the command line into the list of files to
//! check: directories are walked recursively, VCS and build directories are
//! skipped, and exclude patterns are applied.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use super::file_io::FileIO;
use crate::verbose_log;

/// Directories that never contain files worth checking.
pub const IGNORED_DIRS: [&str; 5] = [".m2", ".svn", ".hg", ".git", "target"];

/// One exclude pattern.
#[derive(Debug, Clone)]
pub enum ExcludeMatcher {
  /// Excludes any path containing the text.
  Substring(String),
  /// Excludes paths matching a glob pattern.
  Glob(glob::Pattern),
}

impl ExcludeMatcher {
  /// Parses a pattern. Patterns with wildcard characters are globs, anything
  /// else is matched as a substring of the path.
  pub fn parse(pattern: &str) -> Result<Self> {
    if pattern.contains(['*', '?', '[']) {
      let glob = glob::Pattern::new(pattern).with_context(|| format!("Invalid exclude pattern: {}", pattern))?;
      Ok(Self::Glob(glob))
    } else {
      Ok(Self::Substring(pattern.to_string()))
    }
  }

  pub fn matches(&self, path: &str) -> bool {
    match self {
      Self::Substring(text) => path.contains(text.as_str()),
      Self::Glob(glob) => glob.matches(path),
    }
  }

  pub fn as_str(&self) -> &str {
    match self {
      Self::Substring(text) => text,
      Self::Glob(glob) => glob.as_str(),
    }
  }
}

/// Files found by a collection pass.
#[derive(Debug, Default)]
pub struct Collection {
  /// Files to check, in traversal order.
  pub files: Vec<PathBuf>,
  /// Paths given by the user that don't exist.
  pub missing: Vec<PathBuf>,
}

/// File collector for directory traversal and exclusion.
#[derive(Debug, Clone, Default)]
pub struct FileCollector {
  excludes: Vec<ExcludeMatcher>,
  include_hidden: bool,
}

impl FileCollector {
  /// Creates a collector.
  ///
  /// # Parameters
  ///
  /// * `excludes` - Exclude patterns; an entry starting with `@` names a file holding one pattern per line
  /// * `include_hidden` - Whether to descend into hidden files and directories
  pub fn new(excludes: &[String], include_hidden: bool) -> Result<Self> {
    let mut matchers = Vec::with_capacity(excludes.len());
    for pattern in excludes {
      if let Some(list) = pattern.strip_prefix('@') {
        for line in FileIO::read_exclude_list(Path::new(list))? {
          matchers.push(ExcludeMatcher::parse(&line)?);
        }
      } else if !pattern.is_empty() {
        matchers.push(ExcludeMatcher::parse(pattern)?);
      }
    }
    debug!("Using {} exclude patterns", matchers.len());
    Ok(Self {
      excludes: matchers,
      include_hidden,
    })
  }

  /// Returns the exclude pattern matching `path`, if any.
  pub fn excluded_by(&self, path: &Path) -> Option<&ExcludeMatcher> {
    let display = path.to_string_lossy();
    self.excludes.iter().find(|matcher| matcher.matches(&display))
  }

  /// Walks every root and collects the files to check.
  pub fn collect(&self, roots: &[PathBuf]) -> Collection {
    let mut collection = Collection::default();
    let start_time = std::time::Instant::now();

    for root in roots {
      if !root.exists() {
        collection.missing.push(root.clone());
        continue;
      }
      debug!("Scanning: {}", root.display());
      let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| self.keep_entry(entry));
      for entry in walker {
        let entry = match entry {
          Ok(entry) => entry,
          Err(err) => {
            eprintln!("Error reading {}: {}", err.path().unwrap_or(root).display(), err);
            continue;
          }
        };
        if entry.file_type().is_file() && self.keep_file(&entry) {
          collection.files.push(entry.into_path());
        }
      }
    }

    debug!(
      "Found {} files in {}ms",
      collection.files.len(),
      start_time.elapsed().as_millis()
    );
    collection
  }

  /// Directory-level filter: hidden entries and ignored directories. Roots
  /// named explicitly are never treated as hidden.
  fn keep_entry(&self, entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    if entry.depth() > 0 && !self.include_hidden && is_hidden(&name) {
      verbose_log!("Hidden file skipped: {}", entry.path().display());
      return false;
    }
    if entry.file_type().is_dir() && IGNORED_DIRS.contains(&name.as_ref()) {
      verbose_log!("Ignored directory skipped: {}", entry.path().display());
      return false;
    }
    true
  }

  /// File-level filter: empty files and exclude patterns.
  fn keep_file(&self, entry: &DirEntry) -> bool {
    let path = entry.path();
    if entry.metadata().map(|meta| meta.len() == 0).unwrap_or(false) {
      verbose_log!("Empty file, skipped: {}", path.display());
      return false;
    }
    if let Some(matcher) = self.excluded_by(path) {
      verbose_log!("Excluded by pattern \"{}\": {}", matcher.as_str(), path.display());
      return false;
    }
    true
  }
}

fn is_hidden(name: &str) -> bool {
  name.starts_with('.') && name != "." && name != ".."
}

#[cfg(test)]
mod tests {
  use tempfile::tempdir;

  use super::*;

  fn write(root: &Path, rel: &str, content: &str) -> Result<()> {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
  }

  fn names(collection: &Collection, root: &Path) -> Vec<String> {
    collection
      .files
      .iter()
      .map(|path| path.strip_prefix(root).unwrap_or(path).to_string_lossy().replace('\\', "/"))
      .collect()
  }

  #[test]
  fn test_skips_ignored_hidden_and_empty() -> Result<()> {
    let dir = tempdir()?;
    let root = dir.path();
    write(root, "src/A.java", "class A {}\n")?;
    write(root, "target/B.java", "class B {}\n")?;
    write(root, ".hidden/C.java", "class C {}\n")?;
    write(root, "src/.D.java", "class D {}\n")?;
    write(root, "src/Empty.java", "")?;

    let collection = FileCollector::new(&[], false)?.collect(&[root.to_path_buf()]);
    assert_eq!(names(&collection, root), vec!["src/A.java"]);

    let collection = FileCollector::new(&[], true)?.collect(&[root.to_path_buf()]);
    assert_eq!(
      names(&collection, root),
      vec![".hidden/C.java", "src/.D.java", "src/A.java"]
    );
    Ok(())
  }

  #[test]
  fn test_substring_and_glob_excludes() -> Result<()> {
    let dir = tempdir()?;
    let root = dir.path();
    write(root, "src/A.java", "a\n")?;
    write(root, "src/generated/B.java", "b\n")?;
    write(root, "src/C.xml", "c\n")?;

    let collector = FileCollector::new(&["/generated/".to_string(), "*.xml".to_string()], false)?;
    let collection = collector.collect(&[root.to_path_buf()]);
    assert_eq!(names(&collection, root), vec!["src/A.java"]);
    Ok(())
  }

  #[test]
  fn test_exclude_list_file() -> Result<()> {
    let dir = tempdir()?;
    let root = dir.path();
    write(root, "src/A.java", "a\n")?;
    write(root, "src/B.java", "b\n")?;
    let list = dir.path().join("excludes.txt");
    std::fs::write(&list, "# skip B\nB.java\n")?;

    let collector = FileCollector::new(&[format!("@{}", list.display())], false)?;
    let collection = collector.collect(&[root.join("src")]);
    assert_eq!(names(&collection, root), vec!["src/A.java"]);
    Ok(())
  }

  #[test]
  fn test_missing_root_is_reported() -> Result<()> {
    let dir = tempdir()?;
    let missing = dir.path().join("nope");
    let collection = FileCollector::new(&[], false)?.collect(std::slice::from_ref(&missing));
    assert!(collection.files.is_empty());
    assert_eq!(collection.missing, vec![missing]);
    Ok(())
  }
}
