//! # Workspace Module
//!
//! Finds the directory a run is rooted at. The root is where the config file
//! is looked up and what report paths are made relative to.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use git2::{ErrorCode, Repository};
use tracing::debug;

/// Workspace root selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Workspace {
  /// Workspace rooted at a git repository's working tree.
  Git { root: PathBuf },
  /// Workspace rooted at a plain directory.
  Directory { root: PathBuf },
}

impl Workspace {
  pub fn root(&self) -> &Path {
    match self {
      Self::Git { root } | Self::Directory { root } => root.as_path(),
    }
  }

  pub const fn is_git(&self) -> bool {
    matches!(self, Self::Git { .. })
  }
}

/// Resolve the workspace for the current directory.
pub fn resolve_workspace() -> Result<Workspace> {
  let current_dir = std::env::current_dir().with_context(|| "Failed to get current directory")?;
  resolve_workspace_from(&current_dir)
}

/// Resolve the workspace containing `dir`: the enclosing git working tree if
/// there is one, else `dir` itself.
pub fn resolve_workspace_from(dir: &Path) -> Result<Workspace> {
  match discover_repo_root(dir)? {
    Some(root) => {
      debug!("Using git workspace root: {}", root.display());
      Ok(Workspace::Git { root })
    }
    None => Ok(Workspace::Directory { root: dir.to_path_buf() }),
  }
}

/// Finds the working tree root of the git repository containing `dir`.
pub fn discover_repo_root(dir: &Path) -> Result<Option<PathBuf>> {
  match Repository::discover(dir) {
    Ok(repo) => Ok(repo.workdir().map(Path::to_path_buf)),
    Err(err) if err.code() == ErrorCode::NotFound => Ok(None),
    Err(err) => {
      Err(err).with_context(|| format!("Failed to open git repository containing {}", dir.display()))
    }
  }
}
