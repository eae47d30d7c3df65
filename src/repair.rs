//! # Repair Module
//!
//! Regenerates license headers. A repair either replaces the whole leading
//! comment with a freshly rendered header, or rewrites just the first year
//! expression of the existing header and leaves every other byte alone.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::copyright::{ALL_RIGHTS_RESERVED, CopyrightLine, YearStyle, add_copyright_date, copyright_lines};
use crate::formats::{CommentFormat, LineEnding, split_lines};
use crate::templates::{TemplateCatalog, YEAR_PLACEHOLDER};

/// Existing BSD or EDL licenses are repaired with the BSD template.
static BSD_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?m)(THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS)|(SPDX-License-Identifier: BSD-3-Clause)")
    .expect("BSD signature regex must compile")
});

/// The copyright line of a template, with its line terminator.
static TEMPLATE_COPYRIGHT_LINE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?m)^Copyright (?:\(c\) )?YYYY (?:by )?[A-Za-z].*$\n").expect("template line regex must compile")
});

/// Separates a derived work's own notice from the license it incorporates.
const DERIVED_WORK_INTRO: &str =
  "\n\nThis file incorporates work covered by the following copyright and\npermission notice:\n\n";

const SUN_MICROSYSTEMS: &str = "Sun Microsystems";

/// Errors raised while repairing a file.
#[derive(Debug, Error)]
pub enum RepairError {
  /// The file has nothing but blank or preamble lines.
  #[error("NO CONTENT, repair failed")]
  NoContent,

  /// The header has no copyright year to update.
  #[error("no copyright year to update, repair failed")]
  YearNotFound,

  /// The format can't tell where its header ends.
  #[error("{format} files can't be repaired")]
  NotRepairable { format: &'static str },

  #[error("failed to write repaired file: {0}")]
  Io(#[from] std::io::Error),
}

/// What a repair should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairPlan {
  /// Render a complete new header. `existing` is the comment being replaced;
  /// without one, the header is inserted in front of the file's content.
  ReplaceFull { target_year: String, existing: Option<String> },
  /// Rewrite only the first year expression of the existing header.
  UpdateDateOnly { target_year: String },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RepairOptions {
  /// Keep the copyright lines of a replaced header.
  pub preserve: bool,
  pub style: YearStyle,
}

/// Applies repair plans using the catalog's templates.
#[derive(Debug, Clone)]
pub struct Repairer {
  catalog: Arc<TemplateCatalog>,
  options: RepairOptions,
}

impl Repairer {
  pub const fn new(catalog: Arc<TemplateCatalog>, options: RepairOptions) -> Self {
    Self { catalog, options }
  }

  /// Repairs `content`, returning the new file content with line terminators
  /// canonicalized for the format.
  pub fn apply(&self, format: &dyn CommentFormat, content: &str, plan: &RepairPlan) -> Result<String, RepairError> {
    if !format.repairable() {
      return Err(RepairError::NotRepairable { format: format.name() });
    }
    let lines = split_lines(content);
    let ending = format.line_ending(LineEnding::detect(content));

    let repaired = match plan {
      RepairPlan::ReplaceFull { target_year, existing } => {
        debug!("Replacing header with target year {}", target_year);
        let existing = existing.as_deref();
        format.replace_header(&lines, existing.is_some(), &mut |first_year: Option<&str>| {
          let year = first_year.map_or_else(
            || target_year.clone(),
            |first| add_copyright_date(first, target_year, self.options.style),
          );
          self.render_header(&year, existing)
        })
      }
      RepairPlan::UpdateDateOnly { target_year } => {
        debug!("Updating header year to {}", target_year);
        self.update_date(format, &lines, target_year)?
      }
    };
    Ok(ending.apply(&repaired))
  }

  /// Renders the plain text of a new header carrying `year`.
  ///
  /// An existing BSD license is replaced with the BSD template. An existing
  /// Apache license is kept as the template itself, with its own copyright
  /// lines merged in.
  pub fn render_header(&self, year: &str, existing: Option<&str>) -> String {
    let licensor = self.catalog.licensor();
    let Some(comment) = existing else {
      return fix_copyright(self.catalog.primary().text(), year, licensor);
    };

    let mut preserve = self.options.preserve;
    let template = if BSD_SIGNATURE.is_match(comment) {
      debug!("Existing header is a BSD license");
      self.catalog.bsd().text().to_string()
    } else if comment.contains("Apache") {
      debug!("Existing header is an Apache license");
      preserve = true;
      let license = comment
        .find(DERIVED_WORK_INTRO)
        .map_or(comment, |idx| &comment[idx + DERIVED_WORK_INTRO.len()..]);
      with_year_placeholder(license)
    } else {
      self.catalog.primary().text().to_string()
    };

    let existing_lines = copyright_lines(comment);
    if preserve && !existing_lines.is_empty() {
      merge_copyrights(&template, existing_lines, year, licensor)
    } else {
      fix_copyright(&template, year, licensor)
    }
  }

  fn update_date(&self, format: &dyn CommentFormat, lines: &[&str], target_year: &str) -> Result<String, RepairError> {
    let extracted = format.extract(lines);
    if extracted.content_start.is_none() {
      return Err(RepairError::NoContent);
    }
    let span = extracted.span.ok_or(RepairError::YearNotFound)?;
    let (line_idx, statement) = lines[span.clone()]
      .iter()
      .enumerate()
      .filter(|(_, line)| line.contains("Copyright"))
      .find_map(|(offset, line)| CopyrightLine::find(line).map(|statement| (span.start + offset, statement)))
      .ok_or(RepairError::YearNotFound)?;

    let year = add_copyright_date(statement.year(), target_year, self.options.style);
    let mut out = String::new();
    for (idx, line) in lines.iter().enumerate() {
      if idx == line_idx {
        out.push_str(&statement.with_year(&year));
      } else {
        out.push_str(line);
      }
      out.push('\n');
    }
    Ok(out)
  }
}

/// Replaces the year placeholder, and the rest of its line, with
/// `<date> <licensor>. All rights reserved.`.
pub fn fix_copyright(template: &str, date: &str, licensor: &str) -> String {
  let Some(start) = template.find(YEAR_PLACEHOLDER) else {
    return template.to_string();
  };
  let end = template[start..].find('\n').map_or(template.len(), |offset| start + offset);
  format!(
    "{}{date} {licensor}. {ALL_RIGHTS_RESERVED}{}",
    &template[..start],
    &template[end..]
  )
}

/// Builds a header from `template` that keeps the given copyright lines.
///
/// The template's own copyright line is dropped in favour of the existing
/// lines. The first line naming `licensor` gets `date` as its year (a line is
/// added at the top if none names the licensor), and Sun Microsystems lines
/// after it are dropped. Exactly one blank line separates the copyright lines
/// from the rest of the template.
pub fn merge_copyrights(template: &str, mut existing: Vec<String>, date: &str, licensor: &str) -> String {
  let mut out = String::with_capacity(template.len() + existing.len() * 80);
  let mut tail = template;
  let mut need_blank = true;
  if let Some(found) = TEMPLATE_COPYRIGHT_LINE.find(template) {
    out.push_str(&template[..found.start()]);
    tail = &template[found.end()..];
    need_blank = false;
  }

  if !existing.is_empty() && !existing.iter().any(|line| line.contains(licensor)) {
    existing.insert(0, format!("Copyright (c) {date} {licensor}. {ALL_RIGHTS_RESERVED}"));
  }

  let mut refreshed = false;
  for line in &existing {
    if !refreshed && line.contains(licensor) {
      refreshed = true;
      match CopyrightLine::parse(line) {
        Some(statement) => out.push_str(&statement.with_year(date)),
        None => out.push_str(line),
      }
    } else if refreshed && line.contains(SUN_MICROSYSTEMS) {
      continue;
    } else {
      out.push_str(line);
    }
    out.push('\n');
  }

  if need_blank {
    out.push('\n');
  }
  out.push_str(tail);
  out
}

/// Turns license text into a template by replacing the year expression of its
/// first copyright line with the placeholder.
fn with_year_placeholder(text: &str) -> String {
  let mut offset = 0;
  for line in text.split_inclusive('\n') {
    if let Some(statement) = CopyrightLine::find(line) {
      let span = statement.year_span();
      return format!(
        "{}{YEAR_PLACEHOLDER}{}",
        &text[..offset + span.start],
        &text[offset + span.end..]
      );
    }
    offset += line.len();
  }
  text.to_string()
}
