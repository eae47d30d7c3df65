#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use anyhow::{Context, Result};
use copyright_check::processor::{Processor, ProcessorConfig, RunOptions};
use copyright_check::repair::RepairOptions;
use copyright_check::scm::{LastChanged, ScmBackend};
use copyright_check::templates::TemplateCatalog;
use futures::future::BoxFuture;

/// Year the fixtures treat as "now".
pub const THIS_YEAR: &str = "2021";

const EPL_TEMPLATE: &str = include_str!("../../resources/copyright-templates/epl-copyright.txt");
const SUN_TEMPLATE: &str = include_str!("../../resources/copyright-templates/sun-cddl+gpl+ce-copyright.txt");

/// The bundled correct header, as a Java comment carrying `year`.
pub fn epl_header(year: &str) -> String {
  EPL_TEMPLATE.replace("YYYY", year)
}

/// The legacy Sun CDDL+GPL+CE header, as a Java comment carrying `year`.
pub fn sun_header(year: &str) -> String {
  SUN_TEMPLATE.replace("YYYY", year)
}

/// Writes `content` to `name` under `dir`, creating parent directories.
pub fn write_file(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
  let path = dir.join(name);
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
  Ok(path)
}

/// An SCM that gives the same answer for every file.
pub struct FixedScm {
  pub modified: bool,
  pub last_changed: LastChanged,
}

impl FixedScm {
  pub fn last_changed_in(year: &str) -> Arc<Self> {
    Arc::new(Self {
      modified: false,
      last_changed: LastChanged::Year(year.to_string()),
    })
  }

  pub fn with(last_changed: LastChanged) -> Arc<Self> {
    Arc::new(Self {
      modified: false,
      last_changed,
    })
  }
}

impl ScmBackend for FixedScm {
  fn is_modified<'a>(&'a self, _path: &'a Path) -> BoxFuture<'a, bool> {
    Box::pin(async move { self.modified })
  }

  fn last_changed<'a>(&'a self, _path: &'a Path) -> BoxFuture<'a, LastChanged> {
    Box::pin(async move { self.last_changed.clone() })
  }
}

/// Builds a processor over the bundled templates.
pub fn processor(scm: Arc<dyn ScmBackend>, options: RunOptions, repair_options: RepairOptions) -> Result<Processor> {
  processor_with(scm, options, repair_options, Vec::new())
}

/// Builds a processor over the bundled templates with exclude patterns.
pub fn processor_with(
  scm: Arc<dyn ScmBackend>,
  options: RunOptions,
  repair_options: RepairOptions,
  excludes: Vec<String>,
) -> Result<Processor> {
  Processor::new(ProcessorConfig {
    options,
    repair_options,
    excludes,
    concurrency: Some(2),
    ..ProcessorConfig::new(Arc::new(TemplateCatalog::bundled()?), scm, THIS_YEAR)
  })
}

/// Checks if git is available on the system.
pub fn is_git_available() -> bool {
  Command::new("git").arg("--version").status().is_ok()
}

/// Runs a git command in the given directory, returning an error with stderr on
/// failure.
pub fn run_git(dir: &Path, args: &[&str]) -> Result<()> {
  run_git_with_env(dir, args, &[])
}

fn run_git_with_env(dir: &Path, args: &[&str], env: &[(&str, &str)]) -> Result<()> {
  let output = Command::new("git")
    .args(args)
    .envs(env.iter().copied())
    .current_dir(dir)
    .output()
    .with_context(|| format!("Failed to execute git {:?}", args))?;

  if !output.status.success() {
    anyhow::bail!("git {:?} failed: {}", args, String::from_utf8_lossy(&output.stderr));
  }
  Ok(())
}

/// Initializes a git repository in the given directory with deterministic
/// settings.
///
/// Configures:
/// - Default branch name set to `main`
/// - User name and email for commits
/// - Disables commit signing for test isolation
pub fn init_git_repo(dir: &Path) -> Result<()> {
  run_git(dir, &["init"])?;
  run_git(dir, &["config", "init.defaultBranch", "main"])?;
  run_git(dir, &["branch", "-M", "main"])?;
  run_git(dir, &["config", "user.name", "Test User"])?;
  run_git(dir, &["config", "user.email", "test@example.com"])?;
  // Disable commit signing for test isolation
  run_git(dir, &["config", "commit.gpgsign", "false"])?;
  Ok(())
}

/// Stages a file and commits it with author and committer dates in `year`.
pub fn git_add_and_commit_in(dir: &Path, file: &str, year: &str) -> Result<()> {
  let date = format!("{year}-06-15T12:00:00");
  run_git(dir, &["add", file])?;
  run_git_with_env(
    dir,
    &["commit", "-m", &format!("Add {file}")],
    &[("GIT_AUTHOR_DATE", &date), ("GIT_COMMITTER_DATE", &date)],
  )
}
