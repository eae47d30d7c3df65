//! # Date Check Module
//!
//! Compares the last year of a header's year expression with the year the
//! file was last changed, as reported by the SCM.

use std::path::Path;
use std::sync::Arc;

use crate::copyright::YearExpr;
use crate::scm::{LastChanged, ScmBackend};

/// What the SCM knows about one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScmSnapshot {
  pub modified: bool,
  /// Only queried for files without local modifications.
  pub last_changed: Option<LastChanged>,
}

impl ScmSnapshot {
  /// Is the file outside version control?
  pub fn is_untracked(&self) -> bool {
    !self.modified && self.last_changed == Some(LastChanged::Untracked)
  }
}

/// Outcome of a date check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateVerdict {
  /// The header already names the authoritative year.
  Current,
  /// The header's last year differs from the authoritative year.
  Mismatch { found: String, expected: String },
  /// The SCM could not tell when the file last changed.
  Unknown,
}

/// Decides which year a file's header should end with.
#[derive(Clone)]
pub struct DateValidator {
  scm: Arc<dyn ScmBackend>,
  current_year: String,
}

impl DateValidator {
  pub fn new(scm: Arc<dyn ScmBackend>, current_year: impl Into<String>) -> Self {
    Self {
      scm,
      current_year: current_year.into(),
    }
  }

  pub fn current_year(&self) -> &str {
    &self.current_year
  }

  /// Queries the SCM for a file. History is only looked up when the file has
  /// no local modifications.
  pub async fn snapshot(&self, path: &Path) -> ScmSnapshot {
    let modified = self.scm.is_modified(path).await;
    let last_changed = if modified {
      None
    } else {
      Some(self.scm.last_changed(path).await)
    };
    ScmSnapshot { modified, last_changed }
  }

  /// The year the header should end with, or `None` when it can't be known.
  ///
  /// Locally modified files and files outside version control belong to the
  /// current year.
  pub fn authoritative_year(&self, snapshot: &ScmSnapshot) -> Option<String> {
    if snapshot.modified {
      return Some(self.current_year.clone());
    }
    match &snapshot.last_changed {
      Some(LastChanged::Year(year)) => Some(year.clone()),
      Some(LastChanged::Untracked) | None => Some(self.current_year.clone()),
      Some(LastChanged::Unknown) => None,
    }
  }

  /// Checks a header's year expression, reusing `snapshot` when the SCM was
  /// already queried for this file.
  pub async fn check(&self, path: &Path, year: &YearExpr, snapshot: Option<ScmSnapshot>) -> DateVerdict {
    let snapshot = match snapshot {
      Some(snapshot) => snapshot,
      None => self.snapshot(path).await,
    };
    let Some(expected) = self.authoritative_year(&snapshot) else {
      return DateVerdict::Unknown;
    };
    let found = year.last_year();
    if found == expected {
      DateVerdict::Current
    } else {
      DateVerdict::Mismatch {
        found: found.to_string(),
        expected,
      }
    }
  }
}
