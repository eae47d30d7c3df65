//! # Diff Module
//!
//! Renders the change a repair makes to a file as a unified diff, printed to
//! stderr and/or appended to a diff file.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};
use similar::{ChangeTag, TextDiff};

/// Number of unchanged lines shown around each change.
const CONTEXT_LINES: usize = 3;

/// Manages diff creation and rendering for repaired headers.
#[derive(Debug, Default)]
pub struct DiffManager {
  /// Whether to print diffs to stderr
  pub show_diff: bool,

  /// File that every diff is appended to
  pub save_diff_path: Option<PathBuf>,

  /// Serializes output from concurrently processed files.
  lock: Mutex<()>,
}

impl DiffManager {
  /// Creates a new DiffManager.
  ///
  /// # Parameters
  ///
  /// * `show_diff` - Whether to print diffs to stderr
  /// * `save_diff_path` - File to append diffs to
  pub fn new(show_diff: bool, save_diff_path: Option<PathBuf>) -> Self {
    Self {
      show_diff,
      save_diff_path,
      lock: Mutex::new(()),
    }
  }

  /// Is any diff output requested?
  pub const fn is_enabled(&self) -> bool {
    self.show_diff || self.save_diff_path.is_some()
  }

  /// Displays and/or saves the diff between the original and repaired content.
  ///
  /// # Parameters
  ///
  /// * `path` - Path to the file being repaired
  /// * `original` - Original file content
  /// * `repaired` - Repaired file content
  pub fn display_diff(&self, path: &Path, original: &str, repaired: &str) -> Result<()> {
    if !self.is_enabled() {
      return Ok(());
    }
    let rendered = render_unified(path, original, repaired);
    let _guard = self.lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

    if self.show_diff {
      for line in rendered.lines() {
        eprintln!("{}", colorize(line));
      }
    }

    if let Some(ref diff_path) = self.save_diff_path {
      let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(diff_path)
        .with_context(|| format!("Failed to open diff file: {}", diff_path.display()))?;
      file
        .write_all(rendered.as_bytes())
        .with_context(|| format!("Failed to write diff file: {}", diff_path.display()))?;
    }

    Ok(())
  }
}

/// Renders a unified diff of one file. Carriage returns are dropped so CRLF
/// files don't produce noisy output.
pub fn render_unified(path: &Path, original: &str, repaired: &str) -> String {
  let original = original.replace('\r', "");
  let repaired = repaired.replace('\r', "");
  let diff = TextDiff::from_lines(&original, &repaired);
  let name = path.display().to_string();

  let mut out = String::new();
  out.push_str(&format!("--- {name}\n+++ {name}\n"));
  for group in diff.grouped_ops(CONTEXT_LINES) {
    let (Some(first), Some(last)) = (group.first(), group.last()) else {
      continue;
    };
    let old = first.old_range().start..last.old_range().end;
    let new = first.new_range().start..last.new_range().end;
    out.push_str(&format!(
      "@@ -{},{} +{},{} @@\n",
      old.start + 1,
      old.len(),
      new.start + 1,
      new.len()
    ));
    for op in &group {
      for change in diff.iter_changes(op) {
        let sign = match change.tag() {
          ChangeTag::Delete => '-',
          ChangeTag::Insert => '+',
          ChangeTag::Equal => ' ',
        };
        out.push(sign);
        out.push_str(change.value());
        if change.missing_newline() {
          out.push('\n');
        }
      }
    }
  }
  out
}

fn colorize(line: &str) -> String {
  if line.starts_with("+++") || line.starts_with("---") {
    line.if_supports_color(Stream::Stderr, |s| s.bold()).to_string()
  } else if line.starts_with('+') {
    line.if_supports_color(Stream::Stderr, |s| s.green()).to_string()
  } else if line.starts_with('-') {
    line.if_supports_color(Stream::Stderr, |s| s.red()).to_string()
  } else if line.starts_with("@@") {
    line.if_supports_color(Stream::Stderr, |s| s.cyan()).to_string()
  } else {
    line.to_string()
  }
}
