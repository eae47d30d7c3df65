//! # Output Module
//!
//! All user-facing output of a run: one line per file per finding, warnings,
//! and the end-of-run summary. Per-file lines are suppressed in quiet mode,
//! the summary is not.
//!
//! Lines keep the `<file>: <finding>` shape so the output stays greppable;
//! colors are only added when the terminal supports them.

use std::path::Path;

use owo_colors::{OwoColorize, Stream};

use crate::logging::{is_quiet, is_verbose};
use crate::report::ProcessingSummary;

/// Symbols used in output
pub mod symbols {
  /// Successful repair
  pub const SUCCESS: &str = "\u{2713}"; // ✓
  /// Failed repair
  pub const FAILURE: &str = "\u{2717}"; // ✗
  /// Year updated
  pub const UPDATED: &str = "\u{21bb}"; // ↻
}

/// Message printed once per run when some file's history is unknown.
pub const UNKNOWN_DATE_WARNING: &str = "Some file(s) with unknown date (shallow clone?)";

/// Print a finding for one file, e.g. `src/A.java: No copyright`.
pub fn print_finding(path: &Path, finding: &str) {
  if is_quiet() {
    return;
  }
  println!(
    "{}: {}",
    path.display(),
    finding.if_supports_color(Stream::Stdout, |s| s.red())
  );
}

/// Print a warning about a line after the header.
pub fn print_warning(path: &Path, message: &str) {
  if is_quiet() {
    return;
  }
  println!(
    "{}: {}",
    path.display(),
    format!("WARNING: {message}").if_supports_color(Stream::Stdout, |s| s.yellow())
  );
}

/// Print a run-level warning that isn't tied to one file.
pub fn print_run_warning(message: &str) {
  if is_quiet() {
    return;
  }
  println!("{}", message.if_supports_color(Stream::Stdout, |s| s.yellow()));
}

/// Print that a path given on the command line doesn't exist.
pub fn print_nonexistent(path: &Path) {
  println!("{}: doesn't exist", path.display());
}

/// Print the outcome of a repair. Only shown in verbose mode, except failures.
pub fn print_repair(path: &Path, outcome: RepairOutcome<'_>) {
  match outcome {
    RepairOutcome::Replaced | RepairOutcome::DateUpdated if !is_verbose() => {}
    RepairOutcome::Replaced => println!(
      "  {} {} (header replaced)",
      symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
      path.display()
    ),
    RepairOutcome::DateUpdated => println!(
      "  {} {} (year updated)",
      symbols::UPDATED.if_supports_color(Stream::Stdout, |s| s.yellow()),
      path.display()
    ),
    RepairOutcome::Staged(staged) if is_verbose() => println!(
      "  {} {} (repaired copy in {})",
      symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
      path.display(),
      staged.display()
    ),
    RepairOutcome::Staged(_) => {}
    RepairOutcome::Failed(reason) => {
      if !is_quiet() {
        println!(
          "{}: {} {}",
          path.display(),
          symbols::FAILURE.if_supports_color(Stream::Stdout, |s| s.red()),
          reason.if_supports_color(Stream::Stdout, |s| s.red())
        );
      }
    }
  }
}

/// What happened to a file that was repaired.
#[derive(Debug, Clone, Copy)]
pub enum RepairOutcome<'a> {
  Replaced,
  DateUpdated,
  /// Dry run: the repaired content is in the given file.
  Staged(&'a Path),
  Failed(&'a str),
}

/// Renders the summary lines. Categories with no files are left out; the
/// date line is left out entirely when years weren't checked.
pub fn summary_lines(summary: &ProcessingSummary, ignore_year: bool) -> Vec<(String, usize)> {
  let mut lines = Vec::new();
  let mut push = |label: &str, count: usize| {
    if count > 0 {
      lines.push((label.to_string(), count));
    }
  };

  push("No Copyright:", summary.missing);
  push("Empty Copyright:", summary.empty);
  for legacy in &summary.legacy {
    push(&format!("{}:", legacy.label), legacy.count);
  }
  push("Wrong Copyright:", summary.wrong);
  push("No Copyright Year:", summary.no_year);
  if !ignore_year {
    push("Wrong Copyright Date:", summary.wrong_date);
  }
  push("Repair Failed:", summary.repair_failed);
  lines
}

/// Print the end-of-run tally.
///
/// Format: one `Label:<tab>count` line per category, or `No errors`.
/// In verbose mode, also shows timing.
pub fn print_summary(summary: &ProcessingSummary, ignore_year: bool) {
  if summary.errors == 0 {
    println!("{}", "No errors".if_supports_color(Stream::Stdout, |s| s.green()));
  } else {
    if !is_quiet() {
      println!();
    }
    for (label, count) in summary_lines(summary, ignore_year) {
      let tabs = if label.len() < 16 { "\t\t" } else { "\t" };
      println!(
        "{}{}{}",
        label,
        tabs,
        count.if_supports_color(Stream::Stdout, |s| s.red())
      );
    }
  }

  if is_verbose() {
    println!(
      "Checked {} files, repaired {} ({:.2}s)",
      summary.files_checked,
      summary.repaired,
      summary.processing_time.as_secs_f64()
    );
  }
}
