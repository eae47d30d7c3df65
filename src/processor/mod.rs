//! # Processor Module
//!
//! Runs the per-file pipeline over every collected file: select a comment
//! format, extract the leading comment, classify it, check its year against
//! the SCM, and repair it when asked to.
//!
//! The module is organized into several submodules:
//! - [`file_io`] - ISO-8859-1 file reading and staged writing
//! - [`file_collector`] - Directory traversal and exclude patterns
//!
//! Files are checked concurrently. Every per-file failure is handled inside
//! the file's own task, so one bad file never aborts the run.

mod file_collector;
mod file_io;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use anyhow::Result;
pub use file_collector::{Collection, ExcludeMatcher, FileCollector, IGNORED_DIRS};
pub use file_io::{FileIO, REPAIRED_SUFFIX, decode_latin1, encode_latin1};
use futures::stream::{self, StreamExt};
use tracing::{debug, trace, warn};

use crate::classify::{Classification, Classifier};
use crate::copyright::{CopyrightLine, YearExpr};
use crate::date_check::{DateValidator, DateVerdict, ScmSnapshot};
use crate::diff::DiffManager;
use crate::formats::{CommentFormat, FormatGroups, FormatRegistry, split_lines};
use crate::logging::is_quiet;
use crate::output::{self, RepairOutcome, UNKNOWN_DATE_WARNING};
use crate::repair::{RepairOptions, RepairPlan, Repairer};
use crate::report::{FileAction, FileReport, FileStatus, ProcessingSummary, Tally};
use crate::scm::ScmBackend;
use crate::templates::TemplateCatalog;
use crate::verbose_log;

/// Marker of headers that must be left exactly as they are.
pub const DO_NOT_ALTER: &str = "DO NOT ALTER OR REMOVE COPYRIGHT NOTICES OR THIS HEADER.";

/// Switches controlling what a run checks and repairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
  /// Repair files with findings
  pub repair: bool,
  /// With `repair`, leave the repaired content in `<file>.new`
  pub dry_run: bool,
  /// Skip the year check
  pub ignore_year: bool,
  /// Don't accept alternate templates and re-render stale headers in full
  pub normalize: bool,
  /// Skip files that aren't under version control
  pub scm_only: bool,
  /// Warn about copyright lines after the header
  pub warnings: bool,
  /// Skip files carrying the do-not-alter marker
  pub explicit_exclude: bool,
  /// Which format groups to check
  pub groups: FormatGroups,
}

/// Configuration for creating a Processor instance.
pub struct ProcessorConfig {
  pub catalog: Arc<TemplateCatalog>,
  pub scm: Arc<dyn ScmBackend>,
  /// Four-digit year used for modified and untracked files
  pub current_year: String,
  pub options: RunOptions,
  pub repair_options: RepairOptions,

  // Traversal
  pub excludes: Vec<String>,
  pub include_hidden: bool,

  // Optional components
  pub diff_manager: Option<DiffManager>,
  /// Number of files in flight at once; defaults to the number of CPUs
  pub concurrency: Option<usize>,
}

impl ProcessorConfig {
  /// Creates a new ProcessorConfig with required fields and defaults.
  ///
  /// Use struct update syntax to override specific fields:
  /// ```ignore
  /// ProcessorConfig {
  ///     options: RunOptions { repair: true, ..RunOptions::default() },
  ///     ..ProcessorConfig::new(catalog, scm, "2024")
  /// }
  /// ```
  pub fn new(catalog: Arc<TemplateCatalog>, scm: Arc<dyn ScmBackend>, current_year: impl Into<String>) -> Self {
    Self {
      catalog,
      scm,
      current_year: current_year.into(),
      options: RunOptions {
        warnings: true,
        ..RunOptions::default()
      },
      repair_options: RepairOptions::default(),
      excludes: Vec::new(),
      include_hidden: false,
      diff_manager: None,
      concurrency: None,
    }
  }
}

/// Checks and repairs copyright headers.
pub struct Processor {
  formats: FormatRegistry,
  classifier: Classifier,
  validator: DateValidator,
  repairer: Repairer,
  collector: FileCollector,
  options: RunOptions,
  diff_manager: DiffManager,
  licensor: String,
  concurrency: usize,

  /// Run-wide counters
  tally: Tally,

  /// Per-file results, in completion order
  file_reports: Mutex<Vec<FileReport>>,
}

impl Processor {
  /// Creates a new processor.
  ///
  /// # Errors
  ///
  /// Returns an error if an exclude pattern is invalid or an `@file` exclude
  /// list can't be read.
  pub fn new(config: ProcessorConfig) -> Result<Self> {
    let collector = FileCollector::new(&config.excludes, config.include_hidden)?;
    let licensor = config.catalog.licensor().to_string();

    Ok(Self {
      formats: FormatRegistry::new(),
      classifier: Classifier::new(Arc::clone(&config.catalog), config.options.normalize),
      validator: DateValidator::new(config.scm, config.current_year),
      repairer: Repairer::new(config.catalog, config.repair_options),
      collector,
      options: config.options,
      diff_manager: config.diff_manager.unwrap_or_default(),
      licensor,
      concurrency: config.concurrency.unwrap_or_else(num_cpus::get).max(1),
      tally: Tally::new(),
      file_reports: Mutex::new(Vec::new()),
    })
  }

  pub const fn tally(&self) -> &Tally {
    &self.tally
  }

  /// Returns a copy of the per-file results collected so far.
  pub fn file_reports(&self) -> Vec<FileReport> {
    self.file_reports.lock().unwrap_or_else(PoisonError::into_inner).clone()
  }

  /// Checks every file under the given roots.
  ///
  /// # Returns
  ///
  /// The summary of the run. Its `errors` count is the process exit status.
  pub async fn process(&self, roots: &[PathBuf]) -> ProcessingSummary {
    let start_time = Instant::now();

    let collection = self.collector.collect(roots);
    for missing in &collection.missing {
      output::print_nonexistent(missing);
    }
    debug!(
      "Checking {} files with {} in flight",
      collection.files.len(),
      self.concurrency
    );

    let reports: Vec<FileReport> = stream::iter(collection.files)
      .map(|path| async move { self.check_file(&path).await })
      .buffer_unordered(self.concurrency)
      .filter_map(|report| async move { report })
      .collect()
      .await;

    self
      .file_reports
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .extend(reports);

    self.tally.summary(start_time.elapsed())
  }

  /// Checks (and possibly repairs) one file.
  ///
  /// # Returns
  ///
  /// The file's report, or `None` when the file was skipped before its header
  /// was looked at.
  pub async fn check_file(&self, path: &Path) -> Option<FileReport> {
    let mut snapshot = None;
    if self.options.scm_only {
      let scm = self.validator.snapshot(path).await;
      if scm.is_untracked() {
        verbose_log!("Not under version control, skipped: {}", path.display());
        return None;
      }
      snapshot = Some(scm);
    }

    let content = match FileIO::read_latin1(path).await {
      Ok(content) => content,
      Err(err) => {
        eprintln!("{:#}", err);
        return Some(FileReport::new(path, "unknown", FileStatus::Skipped));
      }
    };

    let file_name = path.file_name().map(|name| name.to_string_lossy()).unwrap_or_default();
    let format = self.formats.select(&file_name, &content);
    if !self.options.groups.enabled(format.group()) {
      trace!("Skipping {} ({} files not selected)", path.display(), format.name());
      return None;
    }
    debug!("File {} is a {} file", path.display(), format.name());
    self.tally.record_checked();

    let lines = split_lines(&content);
    let extracted = format.extract(&lines);
    if let Some(text) = &extracted.text {
      debug!("Comment for {}:\n---\n{}---", path.display(), text);
    }

    let mut report = FileReport::new(path, format.name(), FileStatus::Ok);
    if self.options.warnings && !is_quiet() {
      let trailing = lines.get(extracted.consumed..).unwrap_or_default();
      report.warnings = self.trailing_warnings(trailing);
      for warning in &report.warnings {
        output::print_warning(path, warning);
      }
    }

    if self.options.explicit_exclude && content.contains(DO_NOT_ALTER) {
      output::print_finding(path, &format!("EXCLUDED FROM REPAIR: contains: {DO_NOT_ALTER}"));
      report.status = FileStatus::Excluded;
      return Some(report);
    }

    let classification = self.classifier.classify(extracted.text.as_deref(), format.match_mode());
    trace!("{}: {}", path.display(), classification);
    self.tally.record_classification(&classification);
    if let Some(finding) = classification.finding() {
      output::print_finding(path, &finding);
      report.status = FileStatus::Flagged;
      report.finding = Some(finding);
    }

    let plan = match &classification {
      Classification::Missing | Classification::Empty => Some(RepairPlan::ReplaceFull {
        target_year: self.validator.current_year().to_string(),
        existing: None,
      }),
      Classification::WrongKnown(_) | Classification::WrongUnknown => Some(RepairPlan::ReplaceFull {
        target_year: self.validator.current_year().to_string(),
        existing: extracted.text.clone(),
      }),
      Classification::Good(year) => {
        if self.options.ignore_year {
          verbose_log!("Ignoring year check: {}", path.display());
          None
        } else {
          self.check_date(path, year, snapshot, extracted.text.as_deref(), &mut report).await
        }
      }
      Classification::GoodNoYear(_) => None,
    };

    if report.status == FileStatus::Ok {
      verbose_log!("No errors: {}", path.display());
    }

    if let Some(plan) = plan
      && self.options.repair
    {
      self.repair(path, format, &content, &plan, &mut report).await;
    }

    Some(report)
  }

  /// Compares the header's year with the SCM and returns the repair to make,
  /// if any.
  async fn check_date(
    &self,
    path: &Path,
    year: &YearExpr,
    snapshot: Option<ScmSnapshot>,
    comment: Option<&str>,
    report: &mut FileReport,
  ) -> Option<RepairPlan> {
    match self.validator.check(path, year, snapshot).await {
      DateVerdict::Current => None,
      DateVerdict::Unknown => {
        if self.tally.mark_unknown_date() {
          output::print_run_warning(UNKNOWN_DATE_WARNING);
        }
        verbose_log!("Unknown date: {}", path.display());
        report.status = FileStatus::UnknownDate;
        None
      }
      DateVerdict::Mismatch { found, expected } => {
        let finding = format!("Copyright year is wrong; is {found}, should be {expected}");
        output::print_finding(path, &finding);
        self.tally.record_wrong_date();
        report.status = FileStatus::Flagged;
        report.finding = Some(finding);

        Some(if self.options.normalize {
          RepairPlan::ReplaceFull {
            target_year: expected,
            existing: comment.map(str::to_string),
          }
        } else {
          RepairPlan::UpdateDateOnly { target_year: expected }
        })
      }
    }
  }

  /// Applies a repair plan and writes the result.
  async fn repair(
    &self,
    path: &Path,
    format: &dyn CommentFormat,
    content: &str,
    plan: &RepairPlan,
    report: &mut FileReport,
  ) {
    if !format.repairable() {
      verbose_log!("{} files can't be repaired: {}", format.name(), path.display());
      return;
    }

    let repaired = match self.repairer.apply(format, content, plan) {
      Ok(repaired) => repaired,
      Err(err) => {
        self.fail_repair(path, &err.to_string(), report);
        return;
      }
    };

    if let Err(err) = self.diff_manager.display_diff(path, content, &repaired) {
      warn!("Could not render diff for {}: {:#}", path.display(), err);
    }

    match FileIO::write_repaired(path, &repaired, self.options.dry_run).await {
      Ok(written) => {
        self.tally.record_repaired();
        let (action, outcome) = if self.options.dry_run {
          (FileAction::Staged, RepairOutcome::Staged(&written))
        } else if matches!(plan, RepairPlan::UpdateDateOnly { .. }) {
          (FileAction::DateUpdated, RepairOutcome::DateUpdated)
        } else {
          (FileAction::Replaced, RepairOutcome::Replaced)
        };
        output::print_repair(path, outcome);
        report.action = Some(action);
      }
      Err(err) => self.fail_repair(path, &format!("{:#}", err), report),
    }
  }

  fn fail_repair(&self, path: &Path, reason: &str, report: &mut FileReport) {
    output::print_repair(path, RepairOutcome::Failed(reason));
    self.tally.record_repair_failure();
    report.action = Some(FileAction::Failed {
      reason: reason.to_string(),
    });
  }

  /// Warnings about the lines that follow the header: copyright lines for
  /// another licensor, and do-not-alter markers.
  fn trailing_warnings(&self, lines: &[&str]) -> Vec<String> {
    let mut warnings = Vec::new();
    for line in lines {
      if CopyrightLine::find(line).is_some() && !line.contains(self.licensor.as_str()) {
        warnings.push(format!("extra copyright: {line}"));
      }
      if line.contains(DO_NOT_ALTER) {
        warnings.push(format!("contains: {line}"));
      }
    }
    warnings
  }
}
