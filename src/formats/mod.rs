//! # Formats Module
//!
//! One adapter per comment syntax. Each adapter knows how to recognize its
//! files, pull the leading comment out of them (with delimiters and per-line
//! prefixes stripped), render header text back into its syntax, and splice a
//! new header into a file.
//!
//! Adapters are selected by scanning [`FormatRegistry`] in a fixed order; the
//! first adapter whose [`CommentFormat::supports`] accepts the file wins, and
//! the plain-text adapter catches everything else.

mod block;
mod line;
mod markdown;
mod text;

use std::ops::Range;

pub use block::BlockFormat;
pub use line::LineFormat;
pub use markdown::MarkdownFormat;
use serde::Serialize;
pub use text::TextFormat;

use crate::copyright::CopyrightLine;

/// Coarse groups of formats that can be switched on and off together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatGroup {
  /// Java-like `/* ... */` sources.
  Java,
  /// XML, HTML and JSP.
  Xml,
  /// Properties-style `#` files.
  Properties,
  /// Everything else: batch, markdown, asciidoc and plain text.
  Text,
}

/// Which format groups a run checks. All groups are on unless at least one
/// is selected explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatGroups {
  pub java: bool,
  pub xml: bool,
  pub properties: bool,
  pub text: bool,
}

impl FormatGroups {
  pub const fn enabled(&self, group: FormatGroup) -> bool {
    if !self.java && !self.xml && !self.properties && !self.text {
      return true;
    }
    match group {
      FormatGroup::Java => self.java,
      FormatGroup::Xml => self.xml,
      FormatGroup::Properties => self.properties,
      FormatGroup::Text => self.text,
    }
  }
}

/// How an extracted comment is compared with a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
  /// The whole comment must match.
  Anchored,
  /// The comment only has to start with the template.
  Prefix,
}

/// Line terminator of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
  #[default]
  Lf,
  CrLf,
  Cr,
}

impl LineEnding {
  /// The first terminator in the content, `\n` when there is none.
  pub fn detect(content: &str) -> Self {
    let bytes = content.as_bytes();
    match bytes.iter().position(|b| matches!(b, b'\n' | b'\r')) {
      Some(idx) if bytes[idx] == b'\r' => {
        if bytes.get(idx + 1) == Some(&b'\n') {
          Self::CrLf
        } else {
          Self::Cr
        }
      }
      _ => Self::Lf,
    }
  }

  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Lf => "\n",
      Self::CrLf => "\r\n",
      Self::Cr => "\r",
    }
  }

  /// Converts `\n`-terminated text to this terminator.
  pub fn apply(self, text: &str) -> String {
    match self {
      Self::Lf => text.to_string(),
      other => text.replace('\n', other.as_str()),
    }
  }
}

/// The leading comment of a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedComment {
  /// Comment body without delimiters or prefixes; `None` when the file does
  /// not start with a comment.
  pub text: Option<String>,
  /// Preamble lines seen before the comment, trailing whitespace removed.
  pub preamble: Vec<String>,
  /// Line range of the comment, delimiters included.
  pub span: Option<Range<usize>>,
  /// Text following the closing delimiter on the same line.
  pub trailer: String,
  /// Index of the first line after blank and preamble lines.
  pub content_start: Option<usize>,
  /// Number of leading lines the extraction looked at.
  pub consumed: usize,
}

impl ExtractedComment {
  fn without_comment(preamble: Vec<String>, content_start: Option<usize>, line_count: usize) -> Self {
    Self {
      text: None,
      preamble,
      span: None,
      trailer: String::new(),
      content_start,
      consumed: content_start.map_or(line_count, |idx| idx + 1),
    }
  }
}

/// Produces the plain header text for a repair. It receives the year
/// expression of the first copyright statement in the comment being
/// replaced, if any.
pub type HeaderRenderer<'r> = dyn FnMut(Option<&str>) -> String + 'r;

/// A comment syntax.
pub trait CommentFormat: Send + Sync {
  /// Short name used in logs.
  fn name(&self) -> &'static str;

  fn group(&self) -> FormatGroup;

  /// Does this format handle the file? `content` is the decoded file.
  fn supports(&self, file_name: &str, content: &str) -> bool;

  /// Extracts the leading comment from the file's lines.
  fn extract(&self, lines: &[&str]) -> ExtractedComment;

  /// Renders plain header text in this syntax.
  fn to_comment(&self, text: &str) -> String;

  /// Rewrites the file with a new header. With `replace_existing` the leading
  /// comment is dropped in favour of the new header; otherwise the header is
  /// inserted in front of whatever the file starts with. The result uses
  /// `\n` terminators.
  fn replace_header(&self, lines: &[&str], replace_existing: bool, render: &mut HeaderRenderer<'_>) -> String;

  /// Terminator for rewritten files, given the one observed in the original.
  fn line_ending(&self, observed: LineEnding) -> LineEnding {
    observed
  }

  fn match_mode(&self) -> MatchMode {
    MatchMode::Anchored
  }

  fn repairable(&self) -> bool {
    true
  }
}

/// All formats, in selection order.
pub struct FormatRegistry {
  formats: Vec<Box<dyn CommentFormat>>,
  fallback: TextFormat,
}

impl FormatRegistry {
  pub fn new() -> Self {
    Self {
      formats: vec![
        Box::new(BlockFormat::java()),
        Box::new(BlockFormat::jsp()),
        Box::new(BlockFormat::xml()),
        Box::new(LineFormat::bat()),
        Box::new(MarkdownFormat),
        Box::new(BlockFormat::asciidoc()),
        Box::new(LineFormat::signature()),
        Box::new(LineFormat::properties()),
      ],
      fallback: TextFormat,
    }
  }

  /// Picks the format for a file.
  pub fn select(&self, file_name: &str, content: &str) -> &dyn CommentFormat {
    self
      .formats
      .iter()
      .find(|format| format.supports(file_name, content))
      .map_or(&self.fallback as &dyn CommentFormat, |format| format.as_ref())
  }
}

impl Default for FormatRegistry {
  fn default() -> Self {
    Self::new()
  }
}

/// Splits content into lines on `\n`, `\r\n` or `\r`, dropping terminators.
pub fn split_lines(content: &str) -> Vec<&str> {
  let bytes = content.as_bytes();
  let mut lines = Vec::new();
  let mut start = 0;
  let mut idx = 0;
  while idx < bytes.len() {
    match bytes[idx] {
      b'\n' => {
        lines.push(&content[start..idx]);
        idx += 1;
        start = idx;
      }
      b'\r' => {
        lines.push(&content[start..idx]);
        idx += 1;
        if bytes.get(idx) == Some(&b'\n') {
          idx += 1;
        }
        start = idx;
      }
      _ => idx += 1,
    }
  }
  if start < bytes.len() {
    lines.push(&content[start..]);
  }
  lines
}

/// Removes trailing spaces and tabs.
pub(crate) fn strip(line: &str) -> &str {
  line.trim_end_matches([' ', '\t'])
}

/// The leading run of decoration before the first character of real text.
///
/// Returns `None` when the line has no such character at all.
pub(crate) fn find_prefix(line: &str) -> Option<&str> {
  line
    .char_indices()
    .find(|(_, c)| c.is_alphanumeric() || matches!(c, '"' | '[' | '(' | '%'))
    .map(|(idx, _)| &line[..idx])
}

/// Removes `prefix` from a comment line. A line that is itself a truncated
/// prefix (e.g. ` *` for ` * `) becomes empty.
pub(crate) fn strip_comment_prefix<'a>(line: &'a str, prefix: &str) -> &'a str {
  match line.strip_prefix(prefix) {
    Some(rest) => rest,
    None if prefix.starts_with(line) => "",
    None => line,
  }
}

/// Does the content start with `prefix`, ignoring carriage returns?
pub(crate) fn starts_with_ignoring_cr(content: &str, prefix: &str) -> bool {
  let mut chars = content.chars().filter(|c| *c != '\r');
  prefix.chars().all(|expected| chars.next() == Some(expected))
}

/// Case-insensitive `starts_with` that ignores surrounding whitespace.
pub(crate) fn starts_with_ignore_case(line: &str, prefix: &str) -> bool {
  line
    .trim()
    .get(..prefix.len())
    .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Year expression of the first copyright statement in the given lines.
pub(crate) fn first_year<'a>(lines: &[&'a str]) -> Option<&'a str> {
  lines
    .iter()
    .filter(|line| line.contains("Copyright"))
    .find_map(|line| CopyrightLine::find(line))
    .map(|statement| statement.year())
}

/// Appends each line followed by `\n`.
pub(crate) fn push_lines(out: &mut String, lines: &[&str]) {
  for line in lines {
    out.push_str(line);
    out.push('\n');
  }
}

/// Drops one trailing blank line from an extracted body.
pub(crate) fn trim_trailing_blank(body: &mut String) {
  if body.ends_with("\n\n") {
    body.pop();
  }
}
