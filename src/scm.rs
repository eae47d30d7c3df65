//! # SCM Module
//!
//! Asks a version control system whether a file has local modifications and
//! in which year it was last changed. Each backend shells out to its command
//! line client and parses the first line of interest; every failure degrades
//! to [`LastChanged::Unknown`] instead of an error.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use clap::ValueEnum;
use futures::future::BoxFuture;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, trace};

/// Default bound on a single SCM command.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// When a file was last changed according to the SCM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LastChanged {
  /// The four-digit year of the last change.
  Year(String),
  /// The file is not under version control.
  Untracked,
  /// History is unavailable (shallow clone, command failure or timeout).
  Unknown,
}

/// Narrow view of a version control system.
pub trait ScmBackend: Send + Sync {
  /// Does the file have uncommitted modifications (or is it newly added)?
  fn is_modified<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, bool>;

  /// When was the file last changed?
  fn last_changed<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, LastChanged>;
}

/// Supported version control systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScmKind {
  #[default]
  Git,
  #[value(alias = "mercurial")]
  #[serde(alias = "mercurial")]
  Hg,
  #[value(alias = "subversion")]
  #[serde(alias = "subversion")]
  Svn,
}

impl ScmKind {
  const fn program(self) -> &'static str {
    match self {
      Self::Git => "git",
      Self::Hg => "hg",
      Self::Svn => "svn",
    }
  }

  const fn status_args(self) -> &'static [&'static str] {
    match self {
      Self::Git => &["status", "-s", "--"],
      Self::Hg => &["status"],
      Self::Svn => &["status"],
    }
  }

  const fn history_args(self) -> &'static [&'static str] {
    match self {
      Self::Git => &["log", "-n", "1", "--decorate", "--date=local", "--"],
      Self::Hg => &["log", "--limit", "1", "--template", "{date|shortdate}"],
      Self::Svn => &["info"],
    }
  }

  /// Does this error output mean the file is simply not under version control?
  fn is_untracked_error(self, stderr: &str) -> bool {
    match self {
      Self::Git => stderr.contains("not a git repository"),
      Self::Hg => stderr.contains("no repository found"),
      Self::Svn => {
        ["W155010", "E155007", "E155010", "not a working copy", "not under version control"]
          .iter()
          .any(|marker| stderr.contains(marker))
      }
    }
  }
}

/// Result of running one SCM command.
enum CommandOutcome {
  Output(String),
  Untracked,
  Failed,
}

/// A backend that runs the SCM's command line client.
#[derive(Debug, Clone)]
pub struct CommandBackend {
  kind: ScmKind,
  timeout: Duration,
  current_year: String,
}

impl CommandBackend {
  /// Creates a backend. `current_year` is reported for files that Subversion
  /// has scheduled for addition.
  pub fn new(kind: ScmKind, timeout: Duration, current_year: impl Into<String>) -> Self {
    Self {
      kind,
      timeout,
      current_year: current_year.into(),
    }
  }

  pub const fn kind(&self) -> ScmKind {
    self.kind
  }

  /// Runs a command for one file from inside the file's directory.
  async fn run(&self, args: &[&str], path: &Path) -> CommandOutcome {
    let dir = path.parent().filter(|dir| !dir.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let target = path.file_name().map_or(path.as_os_str(), |name| name);

    let mut command = Command::new(self.kind.program());
    command
      .args(args)
      .arg(target)
      .current_dir(dir)
      .stdin(Stdio::null())
      .kill_on_drop(true);
    trace!("Running {} {:?} {:?} in {}", self.kind.program(), args, target, dir.display());

    let output = match tokio::time::timeout(self.timeout, command.output()).await {
      Ok(Ok(output)) => output,
      Ok(Err(err)) => {
        debug!("Failed to run {}: {}", self.kind.program(), err);
        return CommandOutcome::Failed;
      }
      Err(_) => {
        debug!(
          "{} timed out after {}s for {}",
          self.kind.program(),
          self.timeout.as_secs(),
          path.display()
        );
        return CommandOutcome::Failed;
      }
    };

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if output.status.success() {
      return CommandOutcome::Output(stdout);
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    if self.kind.is_untracked_error(&stderr) || self.kind.is_untracked_error(&stdout) {
      CommandOutcome::Untracked
    } else {
      debug!("{} exited with {}: {}", self.kind.program(), output.status, stderr.trim());
      CommandOutcome::Failed
    }
  }
}

impl ScmBackend for CommandBackend {
  fn is_modified<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, bool> {
    Box::pin(async move {
      match self.run(self.kind.status_args(), path).await {
        CommandOutcome::Output(output) => parse_status(&output),
        CommandOutcome::Untracked | CommandOutcome::Failed => false,
      }
    })
  }

  fn last_changed<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, LastChanged> {
    Box::pin(async move {
      match self.run(self.kind.history_args(), path).await {
        CommandOutcome::Output(output) => match self.kind {
          ScmKind::Git => parse_git_log(&output),
          ScmKind::Hg => parse_hg_log(&output),
          ScmKind::Svn => parse_svn_info(&output, &self.current_year),
        },
        CommandOutcome::Untracked => LastChanged::Untracked,
        CommandOutcome::Failed => LastChanged::Unknown,
      }
    })
  }
}

fn is_year(text: &str) -> bool {
  text.len() == 4 && text.bytes().all(|b| b.is_ascii_digit())
}

/// Parses `git log -n 1 --decorate --date=local` output. A grafted commit
/// means history was cut short, so its date can't be trusted.
pub fn parse_git_log(output: &str) -> LastChanged {
  if output.lines().next().is_some_and(|line| line.trim_end().ends_with("(grafted)")) {
    return LastChanged::Unknown;
  }
  match output.lines().rfind(|line| line.starts_with("Date:")) {
    Some(line) => match line.split_whitespace().last() {
      Some(year) if is_year(year) => LastChanged::Year(year.to_string()),
      _ => LastChanged::Unknown,
    },
    None => LastChanged::Untracked,
  }
}

/// Parses `hg log --template {date|shortdate}` output (`2006-09-04`).
pub fn parse_hg_log(output: &str) -> LastChanged {
  output
    .lines()
    .rfind(|line| line.len() == 10 && line.starts_with(|c: char| c.is_ascii_digit()))
    .and_then(|line| line.get(..4))
    .map_or(LastChanged::Untracked, |year| LastChanged::Year(year.to_string()))
}

/// Parses `svn info` output. A file scheduled for addition was changed this
/// year.
pub fn parse_svn_info(output: &str, current_year: &str) -> LastChanged {
  const LAST_CHANGED_DATE: &str = "Last Changed Date: ";
  let mut result = LastChanged::Untracked;
  for line in output.lines() {
    if line == "Schedule: add" {
      result = LastChanged::Year(current_year.to_string());
    }
    if let Some(year) = line.strip_prefix(LAST_CHANGED_DATE).and_then(|rest| rest.get(..4)) {
      result = LastChanged::Year(year.to_string());
    }
  }
  result
}

/// Parses short status output: a line starting with `M` or `A` means the
/// file is modified or newly added.
pub fn parse_status(output: &str) -> bool {
  output.lines().map(str::trim).any(|line| line.starts_with('M') || line.starts_with('A'))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_git_log() {
    let output = "commit 0123abcd (HEAD -> main)\nAuthor: A <a@b>\nDate:   Mon Sep 4 10:00:00 2006\n\n    msg\n";
    assert_eq!(parse_git_log(output), LastChanged::Year("2006".to_string()));
    assert_eq!(parse_git_log(""), LastChanged::Untracked);
    assert_eq!(
      parse_git_log("commit 0123abcd (grafted)\nDate:   Mon Sep 4 10:00:00 2006\n"),
      LastChanged::Unknown
    );
  }

  #[test]
  fn test_parse_hg_log() {
    assert_eq!(parse_hg_log("2011-03-01\n"), LastChanged::Year("2011".to_string()));
    assert_eq!(parse_hg_log(""), LastChanged::Untracked);
  }

  #[test]
  fn test_parse_svn_info() {
    let info = "Path: x\nLast Changed Date: 2009-05-06 10:00:00 +0000 (Wed, 06 May 2009)\n";
    assert_eq!(parse_svn_info(info, "2021"), LastChanged::Year("2009".to_string()));
    assert_eq!(
      parse_svn_info("Path: x\nSchedule: add\n", "2021"),
      LastChanged::Year("2021".to_string())
    );
    assert_eq!(parse_svn_info("", "2021"), LastChanged::Untracked);
  }

  #[test]
  fn test_parse_status() {
    assert!(parse_status(" M src/lib.rs\n"));
    assert!(parse_status("A  new.txt\n"));
    assert!(!parse_status("?? untracked.txt\n"));
    assert!(!parse_status(""));
  }

  #[test]
  fn test_untracked_error_markers() {
    assert!(ScmKind::Git.is_untracked_error("fatal: not a git repository (or any parent)"));
    assert!(ScmKind::Svn.is_untracked_error("svn: warning: W155010: The node 'x' was not found."));
    assert!(!ScmKind::Hg.is_untracked_error("abort: something else"));
  }
}
