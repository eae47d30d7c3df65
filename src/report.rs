//! # Report Module
//!
//! Keeps the run-wide tally of findings and generates the optional JSON report
//! of per-file results.
//!
//! The tally is shared by every file task, so all of its counters are atomics.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::classify::{Classification, NoYear};
use crate::templates::LegacyKind;

/// Information about a checked file for reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
  /// Path to the file
  #[serde(with = "path_serialization")]
  pub path: PathBuf,
  /// Name of the comment format used for the file
  pub format: String,
  /// Overall state of the file
  pub status: FileStatus,
  /// The finding reported for the file, e.g. `No copyright`
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub finding: Option<String>,
  /// Repair performed on the file, if any
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub action: Option<FileAction>,
  /// Warnings about lines after the header
  #[serde(skip_serializing_if = "Vec::is_empty", default)]
  pub warnings: Vec<String>,
}

impl FileReport {
  pub fn new(path: impl Into<PathBuf>, format: &str, status: FileStatus) -> Self {
    Self {
      path: path.into(),
      format: format.to_string(),
      status,
      finding: None,
      action: None,
      warnings: Vec::new(),
    }
  }
}

/// Overall state of a checked file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileStatus {
  /// The header is acceptable
  Ok,
  /// The header has a problem
  Flagged,
  /// The date couldn't be checked because the history is unknown
  UnknownDate,
  /// Explicitly excluded by a do-not-alter marker
  Excluded,
  /// Not checked (format group disabled, outside version control, unreadable)
  Skipped,
}

/// Possible repairs made to a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileAction {
  /// A complete header was written
  Replaced,
  /// Only the year of the existing header changed
  DateUpdated,
  /// The repaired copy was left in `<file>.new`
  Staged,
  /// The repair failed
  Failed { reason: String },
}

/// Helper module for serializing/deserializing PathBuf
mod path_serialization {
  use std::path::PathBuf;

  use serde::{Deserialize, Deserializer, Serializer};

  pub fn serialize<S>(path: &std::path::Path, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.serialize_str(&path.to_string_lossy())
  }

  pub fn deserialize<'de, D>(deserializer: D) -> Result<PathBuf, D::Error>
  where
    D: Deserializer<'de>,
  {
    let s = String::deserialize(deserializer)?;
    Ok(PathBuf::from(s))
  }
}

/// Run-wide counters, shared by all file tasks.
#[derive(Debug, Default)]
pub struct Tally {
  files_checked: AtomicUsize,
  errors: AtomicUsize,
  missing: AtomicUsize,
  empty: AtomicUsize,
  legacy: [AtomicUsize; LegacyKind::ALL.len()],
  wrong: AtomicUsize,
  no_year: AtomicUsize,
  wrong_date: AtomicUsize,
  repaired: AtomicUsize,
  repair_failed: AtomicUsize,
  saw_unknown: AtomicBool,
}

impl Tally {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn record_checked(&self) {
    self.files_checked.fetch_add(1, Ordering::Relaxed);
  }

  /// Counts a classification. Acceptable headers count nothing.
  pub fn record_classification(&self, classification: &Classification) {
    let counter = match classification {
      Classification::Missing => &self.missing,
      Classification::Empty => &self.empty,
      Classification::WrongKnown(kind) => &self.legacy[*kind as usize],
      Classification::WrongUnknown => &self.wrong,
      Classification::GoodNoYear(NoYear::Absent) => &self.no_year,
      Classification::Good(_) | Classification::GoodNoYear(NoYear::NoticeFree) => return,
    };
    counter.fetch_add(1, Ordering::Relaxed);
    self.errors.fetch_add(1, Ordering::Relaxed);
  }

  pub fn record_wrong_date(&self) {
    self.wrong_date.fetch_add(1, Ordering::Relaxed);
    self.errors.fetch_add(1, Ordering::Relaxed);
  }

  pub fn record_repaired(&self) {
    self.repaired.fetch_add(1, Ordering::Relaxed);
  }

  /// A failed repair is an error of its own.
  pub fn record_repair_failure(&self) {
    self.repair_failed.fetch_add(1, Ordering::Relaxed);
    self.errors.fetch_add(1, Ordering::Relaxed);
  }

  /// Notes a file with unknown history. Returns `true` only for the first
  /// such file of the run, so the warning is printed once.
  pub fn mark_unknown_date(&self) -> bool {
    self
      .saw_unknown
      .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
      .is_ok()
  }

  pub fn errors(&self) -> usize {
    self.errors.load(Ordering::Relaxed)
  }

  /// Takes a snapshot of the counters.
  pub fn summary(&self, processing_time: Duration) -> ProcessingSummary {
    let load = |counter: &AtomicUsize| counter.load(Ordering::Relaxed);
    ProcessingSummary {
      files_checked: load(&self.files_checked),
      errors: load(&self.errors),
      missing: load(&self.missing),
      empty: load(&self.empty),
      legacy: LegacyKind::ALL
        .iter()
        .map(|&kind| LegacyCount {
          kind,
          label: kind.summary_label(),
          count: load(&self.legacy[kind as usize]),
        })
        .collect(),
      wrong: load(&self.wrong),
      no_year: load(&self.no_year),
      wrong_date: load(&self.wrong_date),
      repaired: load(&self.repaired),
      repair_failed: load(&self.repair_failed),
      unknown_dates: self.saw_unknown.load(Ordering::Acquire),
      processing_time,
      processing_time_secs: processing_time.as_secs_f64(),
      timestamp: Some(Local::now().timestamp()),
    }
  }
}

/// Number of files with one kind of legacy header
#[derive(Debug, Clone, Serialize)]
pub struct LegacyCount {
  pub kind: LegacyKind,
  pub label: &'static str,
  pub count: usize,
}

/// Summary of the run
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingSummary {
  /// Number of files whose header was examined
  pub files_checked: usize,
  /// Total number of errors; the process exit status
  pub errors: usize,
  pub missing: usize,
  pub empty: usize,
  /// Counts per legacy kind, in matching order
  pub legacy: Vec<LegacyCount>,
  pub wrong: usize,
  pub no_year: usize,
  pub wrong_date: usize,
  pub repaired: usize,
  pub repair_failed: usize,
  /// Whether any file had unknown history
  pub unknown_dates: bool,
  /// Total processing time
  #[serde(skip_serializing)]
  pub processing_time: Duration,
  /// Processing time in seconds for serialization
  #[serde(rename = "processing_time_seconds")]
  pub processing_time_secs: f64,
  /// Timestamp when the summary was taken
  #[serde(skip_serializing_if = "Option::is_none")]
  pub timestamp: Option<i64>,
}

/// Writes the JSON report
pub struct ReportGenerator<'a> {
  /// Path where the report will be saved
  output_path: &'a Path,
  /// Paths in the report are made relative to this directory
  workspace_root: Option<&'a Path>,
}

impl<'a> ReportGenerator<'a> {
  pub const fn new(output_path: &'a Path, workspace_root: Option<&'a Path>) -> Self {
    Self {
      output_path,
      workspace_root,
    }
  }

  /// Generate a report from a collection of file reports
  ///
  /// # Parameters
  ///
  /// * `files` - List of file reports to include
  /// * `summary` - Summary of the run
  pub fn generate(&self, files: &[FileReport], summary: &ProcessingSummary) -> Result<()> {
    let content = self.render_json(files, summary)?;
    fs::write(self.output_path, content)
      .with_context(|| format!("Failed to write report to {}", self.output_path.display()))
  }

  /// Render JSON report content
  pub fn render_json(&self, files: &[FileReport], summary: &ProcessingSummary) -> Result<String> {
    use serde_json::{Value, json, to_string_pretty, to_value};

    let mut sorted: Vec<&FileReport> = files.iter().collect();
    sorted.sort_by(|a, b| a.path.cmp(&b.path));

    let mut files_array = Vec::with_capacity(sorted.len());
    for file in sorted {
      let mut value = to_value(file).context("Failed to serialize file report")?;
      if let (Some(root), Value::Object(map)) = (self.workspace_root, &mut value) {
        let relative = relative_to(&file.path, root);
        map.insert("path".to_string(), Value::String(relative.to_string_lossy().to_string()));
      }
      files_array.push(value);
    }

    let report = json!({
        "summary": to_value(summary).context("Failed to serialize summary")?,
        "files": files_array
    });

    Ok(to_string_pretty(&report)?)
  }
}

/// Expresses `path` relative to `root` when possible.
pub fn relative_to(path: &Path, root: &Path) -> PathBuf {
  let absolute = if path.is_absolute() {
    path.to_path_buf()
  } else {
    std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
  };
  pathdiff::diff_paths(&absolute, root).unwrap_or(absolute)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::copyright::YearExpr;

  #[test]
  fn test_tally_counts_findings_as_errors() {
    let tally = Tally::new();
    tally.record_classification(&Classification::Missing);
    tally.record_classification(&Classification::WrongKnown(LegacyKind::OldCddl));
    tally.record_classification(&Classification::Good(YearExpr::new("2020")));
    tally.record_classification(&Classification::GoodNoYear(NoYear::NoticeFree));
    tally.record_wrong_date();
    tally.record_repair_failure();

    let summary = tally.summary(Duration::from_millis(5));
    assert_eq!(summary.errors, 4);
    assert_eq!(summary.missing, 1);
    assert_eq!(summary.wrong_date, 1);
    assert_eq!(summary.repair_failed, 1);
    let old_cddl = summary.legacy.iter().find(|count| count.kind == LegacyKind::OldCddl);
    assert_eq!(old_cddl.map(|count| count.count), Some(1));
  }

  #[test]
  fn test_unknown_date_is_marked_once() {
    let tally = Tally::new();
    assert!(tally.mark_unknown_date());
    assert!(!tally.mark_unknown_date());
    assert!(tally.summary(Duration::ZERO).unknown_dates);
    assert_eq!(tally.errors(), 0);
  }

  #[test]
  fn test_file_report_serialization() -> Result<()> {
    let mut report = FileReport::new("src/A.java", "java", FileStatus::Flagged);
    report.finding = Some("No copyright".to_string());
    report.action = Some(FileAction::Failed {
      reason: "NO CONTENT, repair failed".to_string(),
    });

    let json = serde_json::to_string(&report)?;
    assert!(json.contains(r#""status":"flagged""#));
    assert!(json.contains(r#""failed":{"reason":"NO CONTENT, repair failed"}"#));
    assert!(!json.contains("warnings"));

    let back: FileReport = serde_json::from_str(&json)?;
    assert_eq!(back, report);
    Ok(())
  }

  #[test]
  fn test_render_json_uses_relative_paths() -> Result<()> {
    let root = std::env::temp_dir();
    let files = vec![FileReport::new(root.join("b/B.java"), "java", FileStatus::Ok)];
    let summary = Tally::new().summary(Duration::ZERO);
    let json = ReportGenerator::new(Path::new("unused.json"), Some(&root)).render_json(&files, &summary)?;

    let value: serde_json::Value = serde_json::from_str(&json)?;
    let path = value["files"][0]["path"].as_str().unwrap_or_default().replace('\\', "/");
    assert_eq!(path, "b/B.java");
    assert_eq!(value["summary"]["errors"], 0);
    Ok(())
  }
}
