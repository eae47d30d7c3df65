//! # Copyright Line Module
//!
//! A small parser and formatter for copyright statements of the form
//!
//! ```text
//! [Portions ]Copyright [(c) ]<year-expression> [by ]<licensor>
//! ```
//!
//! The year expression is either a single year (`2014`), a range (`2010-2014`)
//! or a list (`2010, 2012, 2014`). Edits to the year go through
//! [`CopyrightLine::with_year`], which splices the new expression into the
//! exact byte span of the old one and leaves the rest of the line untouched.

use std::fmt;
use std::ops::Range;

const COPYRIGHT_TOKEN: &str = "Copyright ";
const PORTIONS_TOKEN: &str = "Portions ";
const CIRCLE_C_TOKEN: &str = "(c) ";

/// The continuation line that may follow a copyright statement.
pub const ALL_RIGHTS_RESERVED: &str = "All rights reserved.";

/// Separator style used when a new year is appended to a year expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YearStyle {
  /// `2010, 2015`
  #[default]
  Comma,
  /// `2010-2015`
  Dash,
}

impl YearStyle {
  /// The character expected directly after the first year of a range or list.
  pub const fn separator(self) -> char {
    match self {
      Self::Comma => ',',
      Self::Dash => '-',
    }
  }

  const fn joiner(self) -> &'static str {
    match self {
      Self::Comma => ", ",
      Self::Dash => "-",
    }
  }
}

/// A year expression taken from a copyright statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearExpr(String);

impl YearExpr {
  pub fn new(expr: impl Into<String>) -> Self {
    Self(expr.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// The last four-digit year of the expression, ignoring a trailing comma.
  pub fn last_year(&self) -> &str {
    let expr = self.0.strip_suffix(',').unwrap_or(&self.0);
    expr.get(expr.len().saturating_sub(4)..).unwrap_or(expr)
  }
}

impl fmt::Display for YearExpr {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// One parsed copyright statement within a single line of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyrightLine<'a> {
  line: &'a str,
  year: Range<usize>,
  licensor_start: usize,
}

impl<'a> CopyrightLine<'a> {
  /// Parses a line that *is* a copyright statement, i.e. one that starts with
  /// `Copyright ` or `Portions Copyright `.
  pub fn parse(line: &'a str) -> Option<Self> {
    let start = if line.starts_with(PORTIONS_TOKEN) {
      PORTIONS_TOKEN.len()
    } else {
      0
    };
    if !line[start..].starts_with(COPYRIGHT_TOKEN) {
      return None;
    }
    Self::parse_at(line, start + COPYRIGHT_TOKEN.len())
  }

  /// Finds the first copyright statement anywhere in the line.
  pub fn find(line: &'a str) -> Option<Self> {
    line
      .match_indices(COPYRIGHT_TOKEN)
      .find_map(|(idx, token)| Self::parse_at(line, idx + token.len()))
  }

  /// Finds the first copyright statement in a block of text, line by line.
  pub fn find_in(text: &'a str) -> Option<Self> {
    text.lines().find_map(Self::find)
  }

  fn parse_at(line: &'a str, mut pos: usize) -> Option<Self> {
    if line[pos..].starts_with(CIRCLE_C_TOKEN) {
      pos += CIRCLE_C_TOKEN.len();
    }

    let run_len = line[pos..]
      .bytes()
      .take_while(|b| b.is_ascii_digit() || matches!(b, b'-' | b',' | b' '))
      .count();
    let run_end = pos + run_len;

    // The run must end with the single space that separates it from the
    // licensor, and the licensor (or "by ") must start with a letter.
    if run_len < 2 || line.as_bytes()[run_end - 1] != b' ' {
      return None;
    }
    if !line[run_end..].starts_with(|c: char| c.is_ascii_alphabetic()) {
      return None;
    }

    let year_text = line[pos..run_end - 1].trim_end();
    if !is_year_expression(year_text) {
      return None;
    }

    Some(Self {
      line,
      year: pos..pos + year_text.len(),
      licensor_start: run_end,
    })
  }

  /// The raw year expression, exactly as written.
  pub fn year(&self) -> &'a str {
    &self.line[self.year.clone()]
  }

  pub fn year_expr(&self) -> YearExpr {
    YearExpr::new(self.year())
  }

  /// The licensor text, including a leading `by ` if present.
  pub fn licensor(&self) -> &'a str {
    &self.line[self.licensor_start..]
  }

  /// Byte span of the year expression within the line.
  pub fn year_span(&self) -> Range<usize> {
    self.year.clone()
  }

  /// Returns the line with its year expression replaced by `year`.
  pub fn with_year(&self, year: &str) -> String {
    let mut out = String::with_capacity(self.line.len() + year.len());
    out.push_str(&self.line[..self.year.start]);
    out.push_str(year);
    out.push_str(&self.line[self.year.end..]);
    out
  }
}

fn is_year_expression(text: &str) -> bool {
  let bytes = text.as_bytes();
  let body = text.strip_suffix(',').unwrap_or(text).as_bytes();
  bytes.len() >= 4
    && body.len() >= 4
    && bytes[..4].iter().all(u8::is_ascii_digit)
    && body[body.len() - 4..].iter().all(u8::is_ascii_digit)
}

/// Folds `target` into an existing year expression.
///
/// A single year gains `target` as a second year unless they are equal. A
/// range or list whose last year is already `target` and whose separator
/// matches `style` is kept; anything else collapses to `first<sep>target`.
pub fn add_copyright_date(date: &str, target: &str, style: YearStyle) -> String {
  let date = date.strip_suffix(',').unwrap_or(date);
  let join = |first: &str| {
    if first == target {
      first.to_string()
    } else {
      format!("{first}{}{target}", style.joiner())
    }
  };

  if date.len() == 4 {
    return join(date);
  }

  let Some(first) = date.get(..4) else {
    return join(date);
  };
  let last = date.get(date.len().saturating_sub(4)..).unwrap_or(date);
  // The separator is the character right after the first year, so a list
  // like "2010, 2012, 2014" already ending in `target` is kept whole.
  let separator = date[4..].chars().next();
  if last == target && separator == Some(style.separator()) {
    date.to_string()
  } else {
    join(first)
  }
}

/// Collects every copyright statement line in `text`.
///
/// A statement directly followed by an `All rights reserved.` line keeps that
/// line attached, separated by `\n`.
pub fn copyright_lines(text: &str) -> Vec<String> {
  let lines: Vec<&str> = text.lines().collect();
  let mut found = Vec::new();
  let mut idx = 0;
  while idx < lines.len() {
    let line = lines[idx];
    idx += 1;
    if CopyrightLine::parse(line).is_none() {
      continue;
    }
    if lines.get(idx).is_some_and(|next| *next == ALL_RIGHTS_RESERVED) {
      found.push(format!("{line}\n{ALL_RIGHTS_RESERVED}"));
      idx += 1;
    } else {
      found.push(line.to_string());
    }
  }
  found
}
