//! # Classifier Module
//!
//! Decides what kind of header an extracted comment is by matching it against
//! the [`TemplateCatalog`].

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Serialize;

use crate::copyright::{CopyrightLine, YearExpr};
use crate::formats::MatchMode;
use crate::templates::{LegacyKind, Template, TemplateCatalog};

/// The word "copyright" or a `(c)` mark.
static COPYRIGHT_MARK: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?m)(\b[Cc]opyright\b|\([Cc]\))").expect("copyright mark regex must compile"));

/// Why an acceptable header has no year to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoYear {
  /// The plain Apache header, which carries no copyright notice at all.
  NoticeFree,
  /// An acceptable header whose copyright line has no year.
  Absent,
}

/// The outcome of classifying a file's leading comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
  /// No comment, or a comment that says nothing about copyright.
  Missing,
  /// A comment with nothing but whitespace in it.
  Empty,
  /// A known legacy header.
  WrongKnown(LegacyKind),
  /// A copyright comment that matches no known template.
  WrongUnknown,
  /// An acceptable header and the year expression of its first copyright line.
  Good(YearExpr),
  /// An acceptable header without a year.
  GoodNoYear(NoYear),
}

impl Classification {
  /// The per-file finding reported for this classification, if any.
  pub fn finding(&self) -> Option<String> {
    match self {
      Self::Missing => Some("No copyright".to_string()),
      Self::Empty => Some("Empty copyright".to_string()),
      Self::WrongKnown(kind) => Some(format!("{} copyright", kind.label())),
      Self::WrongUnknown => Some("Wrong copyright".to_string()),
      Self::GoodNoYear(NoYear::Absent) => Some("No copyright year".to_string()),
      Self::Good(_) | Self::GoodNoYear(NoYear::NoticeFree) => None,
    }
  }

  /// Is the header missing or wrong, i.e. in need of a full replacement?
  pub const fn needs_header(&self) -> bool {
    matches!(
      self,
      Self::Missing | Self::Empty | Self::WrongKnown(_) | Self::WrongUnknown
    )
  }
}

impl fmt::Display for Classification {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Good(year) => write!(f, "good ({year})"),
      Self::GoodNoYear(NoYear::NoticeFree) => f.write_str("good (no notice)"),
      other => f.write_str(&other.finding().unwrap_or_default()),
    }
  }
}

/// Matches comments against a shared catalog.
#[derive(Debug, Clone)]
pub struct Classifier {
  catalog: Arc<TemplateCatalog>,
  normalize: bool,
}

impl Classifier {
  /// Creates a classifier. With `normalize`, alternate templates are no longer
  /// acceptable, so files using them are reported as wrong.
  pub const fn new(catalog: Arc<TemplateCatalog>, normalize: bool) -> Self {
    Self { catalog, normalize }
  }

  pub fn catalog(&self) -> &TemplateCatalog {
    &self.catalog
  }

  /// Classifies an extracted comment.
  ///
  /// # Parameters
  ///
  /// * `comment` - The de-prefixed comment text, `None` if the file has none
  /// * `mode` - Whether the whole comment or only its start must match
  pub fn classify(&self, comment: Option<&str>, mode: MatchMode) -> Classification {
    let Some(text) = comment else {
      return Classification::Missing;
    };
    if text.trim().is_empty() {
      return Classification::Empty;
    }
    if !COPYRIGHT_MARK.is_match(text) {
      return Classification::Missing;
    }

    let catalog = &self.catalog;
    let matches = |template: &Template| match mode {
      MatchMode::Anchored => template.matches(text),
      MatchMode::Prefix => template.matches_prefix(text),
    };

    let good = matches(catalog.primary())
      || (!self.normalize && catalog.alternates().iter().any(|template| matches(template)))
      || matches(catalog.bsd())
      || catalog.apache_family().into_iter().any(|template| matches(template));

    if !good {
      return catalog
        .legacy()
        .find(|(_, template)| matches(*template))
        .map_or(Classification::WrongUnknown, |(kind, _)| Classification::WrongKnown(kind));
    }

    if matches(catalog.notice_free_apache()) {
      return Classification::GoodNoYear(NoYear::NoticeFree);
    }

    match CopyrightLine::find_in(text) {
      Some(line) => Classification::Good(line.year_expr()),
      None => Classification::GoodNoYear(NoYear::Absent),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn classifier() -> Classifier {
    Classifier::new(Arc::new(TemplateCatalog::bundled().expect("bundled templates")), false)
  }

  fn render(catalog: &TemplateCatalog, year: &str) -> String {
    catalog.primary().text().replace("YYYY", year)
  }

  #[test]
  fn test_missing_and_empty() {
    let classifier = classifier();
    assert_eq!(classifier.classify(None, MatchMode::Anchored), Classification::Missing);
    assert_eq!(classifier.classify(Some(" \n\n"), MatchMode::Anchored), Classification::Empty);
    assert_eq!(
      classifier.classify(Some("Just a helpful note.\n"), MatchMode::Anchored),
      Classification::Missing
    );
  }

  #[test]
  fn test_primary_template_is_good() {
    let classifier = classifier();
    let text = render(classifier.catalog(), "2010, 2019");
    assert_eq!(
      classifier.classify(Some(&text), MatchMode::Anchored),
      Classification::Good(YearExpr::new("2010, 2019"))
    );
  }

  #[test]
  fn test_unknown_copyright_is_wrong() {
    let classifier = classifier();
    assert_eq!(
      classifier.classify(Some("Copyright 2012 Someone Else\n\nAll yours.\n"), MatchMode::Anchored),
      Classification::WrongUnknown
    );
  }

  #[test]
  fn test_prefix_mode_accepts_trailing_text() {
    let classifier = classifier();
    let text = format!("{}\nMore text after the header.\n", render(classifier.catalog(), "2021"));
    assert_eq!(classifier.classify(Some(&text), MatchMode::Anchored), Classification::WrongUnknown);
    assert!(matches!(
      classifier.classify(Some(&text), MatchMode::Prefix),
      Classification::Good(_)
    ));
  }

  #[test]
  fn test_notice_free_apache_is_silent() {
    let classifier = classifier();
    let text = classifier.catalog().notice_free_apache().text().to_string();
    let result = classifier.classify(Some(&text), MatchMode::Anchored);
    assert_eq!(result, Classification::GoodNoYear(NoYear::NoticeFree));
    assert_eq!(result.finding(), None);
  }

  #[test]
  fn test_finding_labels() {
    assert_eq!(
      Classification::WrongKnown(LegacyKind::Sun).finding().as_deref(),
      Some("Sun copyright")
    );
    assert_eq!(
      Classification::GoodNoYear(NoYear::Absent).finding().as_deref(),
      Some("No copyright year")
    );
  }
}
