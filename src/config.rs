//! # Configuration Module
//!
//! Optional project configuration for copyright-check, read from a
//! `.copyright.toml` file or the file named by the `COPYRIGHT_CHECK_CONFIG`
//! environment variable. Every setting can also be given on the command line,
//! and command-line flags win.
//!
//! ```toml
//! correct-template = "etc/copyright.txt"
//! alternate-templates = ["apache-copyright.txt"]
//! excludes = ["/generated/", "*.min.js"]
//! scm = "git"
//! use-dash = true
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::scm::ScmKind;
use crate::verbose_log;

/// The default config file name.
pub const DEFAULT_CONFIG_FILENAME: &str = ".copyright.toml";

/// Environment variable for specifying config file path.
pub const CONFIG_ENV_VAR: &str = "COPYRIGHT_CHECK_CONFIG";

/// Settings loaded from a config file. Unset values fall back to the
/// command line or the built-in defaults.
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
  /// Template every file should carry. Either a bundled template name or a
  /// path, relative paths being resolved against the config file's directory.
  pub correct_template: Option<String>,

  /// Templates that are accepted as well.
  #[serde(default)]
  pub alternate_templates: Vec<String>,

  /// Template used to repair BSD-style headers.
  pub bsd_template: Option<String>,

  /// Exclude patterns (substrings, globs or `@file` lists).
  #[serde(default)]
  pub excludes: Vec<String>,

  /// Version control system to ask for last-changed dates.
  pub scm: Option<ScmKind>,

  /// Separate years with a dash instead of a comma.
  pub use_dash: Option<bool>,

  /// Keep the copyright lines of headers being replaced.
  pub preserve_copyrights: Option<bool>,

  /// Reject alternate templates and re-render stale headers in full.
  pub normalize: Option<bool>,

  /// Skip the year check.
  pub ignore_year: Option<bool>,

  /// Warn about extra copyright lines.
  pub warnings: Option<bool>,

  /// Bound on a single SCM command, in seconds.
  pub scm_timeout_secs: Option<u64>,

  /// Check hidden files too.
  pub hidden: Option<bool>,
}

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// The config file could not be read.
  #[error("Failed to read config file '{path}': {source}")]
  ReadError { path: PathBuf, source: std::io::Error },

  /// The config file contains invalid TOML.
  #[error("Failed to parse config file '{path}': {source}")]
  ParseError { path: PathBuf, source: toml::de::Error },

  /// A value is out of range.
  #[error("Invalid value for '{field}': {message}")]
  InvalidValue { field: &'static str, message: String },
}

impl Config {
  /// Load configuration from a file.
  ///
  /// # Arguments
  ///
  /// * `path` - Path to the configuration file
  ///
  /// # Returns
  ///
  /// The loaded configuration, or an error if the file cannot be read,
  /// parsed or validated.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    verbose_log!("Loading config from: {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
      path: path.to_path_buf(),
      source: e,
    })?;

    let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
      path: path.to_path_buf(),
      source: e,
    })?;

    config.validate()?;

    let base = path.parent().unwrap_or(Path::new("."));
    Ok(config.resolve_paths(base))
  }

  fn validate(&self) -> Result<(), ConfigError> {
    if self.scm_timeout_secs == Some(0) {
      return Err(ConfigError::InvalidValue {
        field: "scm-timeout-secs",
        message: "must be at least 1".to_string(),
      });
    }
    if self.correct_template.as_deref().is_some_and(str::is_empty) {
      return Err(ConfigError::InvalidValue {
        field: "correct-template",
        message: "must not be empty".to_string(),
      });
    }
    Ok(())
  }

  /// Resolves relative template paths against `base` when the file exists
  /// there. Anything else is left alone so bundled template names keep working.
  fn resolve_paths(self, base: &Path) -> Self {
    let resolve = |name: String| {
      let candidate = base.join(&name);
      if Path::new(&name).is_relative() && candidate.is_file() {
        candidate.to_string_lossy().to_string()
      } else {
        name
      }
    };

    Self {
      correct_template: self.correct_template.map(resolve),
      alternate_templates: self.alternate_templates.into_iter().map(resolve).collect(),
      bsd_template: self.bsd_template.map(resolve),
      ..self
    }
  }
}

/// Discover the configuration file path.
///
/// The configuration file is discovered in the following order:
/// 1. Path specified via `--config` flag (passed as `explicit_path`)
/// 2. Path specified via `COPYRIGHT_CHECK_CONFIG` environment variable
/// 3. `.copyright.toml` in the workspace root
///
/// # Returns
///
/// The path to the configuration file, or `None` if no config file is found.
pub fn discover_config_path(explicit_path: Option<&Path>, workspace_root: &Path) -> Option<PathBuf> {
  if let Some(path) = explicit_path {
    if path.exists() {
      verbose_log!("Using explicit config path: {}", path.display());
      return Some(path.to_path_buf());
    }
    verbose_log!("Explicit config path does not exist: {}", path.display());
    return None;
  }

  if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
    let path = PathBuf::from(&env_path);
    if path.exists() {
      verbose_log!("Using config from {}: {}", CONFIG_ENV_VAR, path.display());
      return Some(path);
    }
    verbose_log!("{} path does not exist: {}", CONFIG_ENV_VAR, env_path);
  }

  let workspace_config = workspace_root.join(DEFAULT_CONFIG_FILENAME);
  if workspace_config.exists() {
    verbose_log!("Using workspace config: {}", workspace_config.display());
    return Some(workspace_config);
  }

  verbose_log!("No config file found");
  None
}

/// Load configuration from the discovered path.
///
/// # Arguments
///
/// * `explicit_path` - Optional explicit path from CLI flag
/// * `workspace_root` - The workspace root directory
/// * `no_config` - If true, skip config file discovery
///
/// # Returns
///
/// The loaded configuration, or `None` if no config file is used.
pub fn load_config(explicit_path: Option<&Path>, workspace_root: &Path, no_config: bool) -> Result<Option<Config>> {
  if no_config {
    verbose_log!("Config file discovery disabled (--no-config)");
    return Ok(None);
  }

  match discover_config_path(explicit_path, workspace_root) {
    Some(path) => {
      let config = Config::load(&path).with_context(|| format!("Failed to load config from {}", path.display()))?;
      Ok(Some(config))
    }
    None => Ok(None),
  }
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use super::*;

  #[test]
  fn test_parse_valid_config() {
    let config_content = concat!(
      "correct-template = \"epl-copyright.txt\"\n",
      "alternate-templates = [\"apache-copyright.txt\"]\n",
      "excludes = [\"/generated/\"]\n",
      "scm = \"mercurial\"\n",
      "use-dash = true\n",
      "scm-timeout-secs = 5\n",
    );

    let config: Config = toml::from_str(config_content).expect("valid config should parse");

    assert_eq!(config.correct_template.as_deref(), Some("epl-copyright.txt"));
    assert_eq!(config.alternate_templates, vec!["apache-copyright.txt"]);
    assert_eq!(config.excludes, vec!["/generated/"]);
    assert_eq!(config.scm, Some(ScmKind::Hg));
    assert_eq!(config.use_dash, Some(true));
    assert_eq!(config.scm_timeout_secs, Some(5));
    assert_eq!(config.normalize, None);
  }

  #[test]
  fn test_parse_empty_config() {
    let config: Config = toml::from_str("").expect("empty config should parse");
    assert_eq!(config, Config::default());
  }

  #[test]
  fn test_unknown_keys_are_rejected() {
    assert!(toml::from_str::<Config>("licence = \"x\"\n").is_err());
  }

  #[test]
  fn test_zero_timeout_is_invalid() {
    let config = Config {
      scm_timeout_secs: Some(0),
      ..Config::default()
    };
    let err = config.validate().expect_err("should fail");
    assert!(matches!(err, ConfigError::InvalidValue { field: "scm-timeout-secs", .. }));
  }

  #[test]
  fn test_template_paths_resolve_against_config_dir() {
    let temp_dir = TempDir::new().expect("create temp dir");
    std::fs::create_dir(temp_dir.path().join("etc")).expect("create etc");
    std::fs::write(temp_dir.path().join("etc/header.txt"), "/*\n * Copyright YYYY\n */\n").expect("write template");
    let config_path = temp_dir.path().join(DEFAULT_CONFIG_FILENAME);
    std::fs::write(
      &config_path,
      "correct-template = \"etc/header.txt\"\nbsd-template = \"edl-copyright.txt\"\n",
    )
    .expect("write config");

    let config = Config::load(&config_path).expect("load should succeed");
    let correct = config.correct_template.expect("correct template");
    assert!(Path::new(&correct).is_absolute() || correct.starts_with(&*temp_dir.path().to_string_lossy()));
    assert!(correct.ends_with("header.txt"));
    assert_eq!(config.bsd_template.as_deref(), Some("edl-copyright.txt"));
  }

  #[test]
  fn test_discover_prefers_explicit_path() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let explicit = temp_dir.path().join("custom.toml");
    std::fs::write(&explicit, "").expect("write config");
    std::fs::write(temp_dir.path().join(DEFAULT_CONFIG_FILENAME), "").expect("write config");

    assert_eq!(discover_config_path(Some(&explicit), temp_dir.path()), Some(explicit));
  }

  #[test]
  fn test_load_config_disabled() {
    let temp_dir = TempDir::new().expect("create temp dir");
    std::fs::write(temp_dir.path().join(DEFAULT_CONFIG_FILENAME), "normalize = true\n").expect("write config");

    assert!(load_config(None, temp_dir.path(), true).expect("load").is_none());
  }
}
