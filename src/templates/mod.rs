//! # Templates Module
//!
//! This module loads license templates and compiles them into the immutable
//! [`TemplateCatalog`] shared by every file check.
//!
//! A template is a license header written as a Java block comment with a
//! `YYYY` placeholder where the copyright year goes. The catalog holds:
//!
//! - the primary ("correct") template, used for repairs,
//! - zero or more alternate templates that are also acceptable,
//! - a BSD-style template, used when repairing BSD-licensed files,
//! - the Apache-family templates, always acceptable,
//! - a fixed list of legacy templates, used only to explain what is wrong.

mod builtin;
mod compiler;

use std::fmt;
use std::path::{Path, PathBuf};

pub use builtin::{DEFAULT_ALTERNATE, DEFAULT_BSD, DEFAULT_CORRECT};
pub use compiler::YEAR_PLACEHOLDER;
use regex::{Regex, RegexBuilder};
use tracing::debug;

/// Licensor used when the primary template does not name one.
pub const DEFAULT_LICENSOR: &str = "Oracle and/or its affiliates";

const REGEX_SIZE_LIMIT: usize = 1 << 24;

/// Errors raised while loading templates.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
  /// The name is neither a bundled template nor an existing file.
  #[error("Copyright template '{name}' not found")]
  NotFound { name: String },

  /// The template file could not be read.
  #[error("Failed to read copyright template '{path}': {source}")]
  Read { path: PathBuf, source: std::io::Error },

  /// The template produced an invalid pattern.
  #[error("Copyright template '{name}' does not compile: {source}")]
  Pattern { name: String, source: regex::Error },
}

/// A compiled license template.
#[derive(Debug, Clone)]
pub struct Template {
  name: String,
  text: String,
  full: Regex,
  prefix: Regex,
}

impl Template {
  /// Compiles a template from its source text.
  pub fn compile(name: &str, source: &str) -> Result<Self, TemplateError> {
    let pattern = compiler::template_pattern(source);
    let build = |anchored: String| {
      RegexBuilder::new(&anchored)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()
        .map_err(|source| TemplateError::Pattern {
          name: name.to_string(),
          source,
        })
    };

    Ok(Self {
      name: name.to_string(),
      text: compiler::template_text(source),
      full: build(format!(r"\A(?:{pattern})\z"))?,
      prefix: build(format!(r"\A(?:{pattern})"))?,
    })
  }

  /// Loads a template by bundled name, falling back to a file path.
  pub fn load(name: &str) -> Result<Self, TemplateError> {
    if let Some(source) = builtin::lookup(name) {
      debug!("Using bundled template {}", name);
      return Self::compile(name, source);
    }
    Self::load_file(Path::new(name))
  }

  /// Loads a template from a file.
  pub fn load_file(path: &Path) -> Result<Self, TemplateError> {
    if !path.exists() {
      return Err(TemplateError::NotFound {
        name: path.display().to_string(),
      });
    }
    let source = std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    debug!("Loaded template from {}", path.display());
    Self::compile(&path.display().to_string(), &source)
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// The template body as plain text, with the year placeholder intact.
  pub fn text(&self) -> &str {
    &self.text
  }

  /// Does the whole comment match this template?
  pub fn matches(&self, comment: &str) -> bool {
    self.full.is_match(comment)
  }

  /// Does the comment start with this template?
  pub fn matches_prefix(&self, comment: &str) -> bool {
    self.prefix.is_match(comment)
  }

  /// The licensor named after the year placeholder, up to the next period.
  pub fn licensor(&self) -> Option<&str> {
    let idx = self.text.find(YEAR_PLACEHOLDER).filter(|idx| *idx > 0)?;
    let rest_start = idx + YEAR_PLACEHOLDER.len() + 1;
    let end = self.text[idx..]
      .find('.')
      .or_else(|| self.text[idx..].find('\n'))
      .map(|offset| idx + offset)?;
    self.text.get(rest_start..end).filter(|licensor| !licensor.is_empty())
  }
}

/// Known legacy license headers that are reported but never accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LegacyKind {
  Sun,
  SunApache,
  SunBsd,
  OldBsd,
  OldCddl,
  CddlGplCe,
  CddlGplNoCe,
}

impl LegacyKind {
  /// Every kind, in the order files are matched against them.
  pub const ALL: [Self; 7] = [
    Self::Sun,
    Self::SunApache,
    Self::SunBsd,
    Self::OldBsd,
    Self::OldCddl,
    Self::CddlGplCe,
    Self::CddlGplNoCe,
  ];

  /// Short label used in per-file findings, e.g. `Sun copyright`.
  pub const fn label(self) -> &'static str {
    match self {
      Self::Sun => "Sun",
      Self::SunApache => "Sun+Apache",
      Self::SunBsd => "Sun BSD",
      Self::OldBsd => "Old BSD",
      Self::OldCddl => "Old CDDL",
      Self::CddlGplCe => "CDDL+GPL+CE",
      Self::CddlGplNoCe => "CDDL+GPL-CE",
    }
  }

  /// Label used in the end-of-run summary.
  pub const fn summary_label(self) -> &'static str {
    match self {
      Self::Sun => "Sun Copyright",
      Self::SunApache => "Sun+Apache Copyright",
      Self::SunBsd => "Sun BSD Copyright",
      Self::OldBsd => "Old BSD Copyright",
      Self::OldCddl => "Old CDDL Copyright",
      Self::CddlGplCe => "CDL+GPL+CE Copyright",
      Self::CddlGplNoCe => "Copyright without CE",
    }
  }

  const fn template_names(self) -> &'static [&'static str] {
    match self {
      Self::Sun => &["sun-cddl+gpl+ce-copyright.txt"],
      Self::SunApache => &[
        "sun-cddl+gpl+ce+apache-copyright.txt",
        "sun-cddl+gpl+ce+apachenew-copyright.txt",
      ],
      Self::SunBsd => &["sun-bsd-copyright.txt"],
      Self::OldBsd => &["bsd-copyright.txt"],
      Self::OldCddl => &["cddl-copyright.txt", "cddl2-copyright.txt"],
      Self::CddlGplCe => &["cddl+gpl+ce-copyright.txt", "cddl+gpl+ce-java.net-copyright.txt"],
      Self::CddlGplNoCe => &["cddl+gpl-copyright.txt"],
    }
  }
}

impl fmt::Display for LegacyKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

/// Where the configurable templates come from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateSources {
  /// Correct template; the bundled EPL header when unset.
  pub correct: Option<String>,
  /// Alternate acceptable templates.
  pub alternates: Vec<String>,
  /// BSD-style template; the bundled EDL header when unset.
  pub bsd: Option<String>,
}

/// Every template a run needs, compiled once.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
  primary: Template,
  alternates: Vec<Template>,
  bsd: Template,
  apache_old: Template,
  apache: Template,
  oracle_apache: Template,
  legacy: Vec<(LegacyKind, Template)>,
  licensor: String,
}

impl TemplateCatalog {
  /// Builds the catalog from bundled defaults and configured templates.
  ///
  /// When no correct template is configured and no alternates are given, the
  /// Apache, old Apache, MIT and W3C headers are accepted as alternates. A
  /// configured correct template disables those defaults.
  pub fn load(sources: &TemplateSources) -> Result<Self, TemplateError> {
    let primary = match &sources.correct {
      Some(name) => Template::load(name)?,
      None => Template::load(DEFAULT_CORRECT)?,
    };

    let mut alternates = Vec::new();
    if sources.correct.is_none() && sources.alternates.is_empty() {
      for name in [
        DEFAULT_ALTERNATE,
        "apacheold-copyright.txt",
        "mitsallings-copyright.txt",
        "w3c-copyright.txt",
      ] {
        alternates.push(Template::load(name)?);
      }
    }
    for name in &sources.alternates {
      alternates.push(Template::load(name)?);
    }

    let bsd = Template::load(sources.bsd.as_deref().unwrap_or(DEFAULT_BSD))?;

    let mut legacy = Vec::new();
    for kind in LegacyKind::ALL {
      for name in kind.template_names() {
        legacy.push((kind, Template::load(name)?));
      }
    }

    let licensor = primary.licensor().unwrap_or(DEFAULT_LICENSOR).to_string();
    debug!("Licensor from {}: {}", primary.name(), licensor);

    Ok(Self {
      primary,
      alternates,
      bsd,
      apache_old: Template::load("apacheold-copyright.txt")?,
      apache: Template::load(DEFAULT_ALTERNATE)?,
      oracle_apache: Template::load("oracle-apache-copyright.txt")?,
      legacy,
      licensor,
    })
  }

  /// Catalog with every template at its bundled default.
  pub fn bundled() -> Result<Self, TemplateError> {
    Self::load(&TemplateSources::default())
  }

  pub const fn primary(&self) -> &Template {
    &self.primary
  }

  pub fn alternates(&self) -> &[Template] {
    &self.alternates
  }

  pub const fn bsd(&self) -> &Template {
    &self.bsd
  }

  /// Apache-family templates that are acceptable regardless of configuration.
  pub fn apache_family(&self) -> [&Template; 3] {
    [&self.apache_old, &self.apache, &self.oracle_apache]
  }

  /// The Apache header that carries no copyright notice of its own.
  pub const fn notice_free_apache(&self) -> &Template {
    &self.apache
  }

  pub fn legacy(&self) -> impl Iterator<Item = (LegacyKind, &Template)> {
    self.legacy.iter().map(|(kind, template)| (*kind, template))
  }

  /// The party named in the primary template's copyright line.
  pub fn licensor(&self) -> &str {
    &self.licensor
  }
}
