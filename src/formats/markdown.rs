//! Markdown, where comments are written as unreferenced link definitions:
//!
//! ```text
//! [//]: # " Copyright (c) 2021 Acme. All rights reserved. "
//! ```

use super::{
  CommentFormat, ExtractedComment, FormatGroup, HeaderRenderer, first_year, push_lines, strip, trim_trailing_blank,
};

const LINE_PREFIX: &str = "[//]: # \" ";
const LINE_SUFFIX: &str = " \"";
const ESCAPED_QUOTE: &str = "''";

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownFormat;

impl MarkdownFormat {
  fn first_non_blank(lines: &[&str]) -> Option<usize> {
    lines.iter().position(|line| !strip(line).is_empty())
  }

  fn run_end(lines: &[&str], start: usize) -> usize {
    lines[start..]
      .iter()
      .position(|line| !strip(line).starts_with(LINE_PREFIX))
      .map_or(lines.len(), |offset| start + offset)
  }
}

impl CommentFormat for MarkdownFormat {
  fn name(&self) -> &'static str {
    "markdown"
  }

  fn group(&self) -> FormatGroup {
    FormatGroup::Text
  }

  fn supports(&self, file_name: &str, _content: &str) -> bool {
    file_name.ends_with(".md") || file_name.ends_with(".md.vm")
  }

  fn extract(&self, lines: &[&str]) -> ExtractedComment {
    let content_start = Self::first_non_blank(lines);
    let Some(start) = content_start.filter(|idx| strip(lines[*idx]).starts_with(LINE_PREFIX)) else {
      return ExtractedComment::without_comment(Vec::new(), content_start, lines.len());
    };

    let end = Self::run_end(lines, start);
    let mut body = String::new();
    for line in &lines[start..end] {
      let inner = &strip(line)[LINE_PREFIX.len()..];
      let inner = inner.strip_suffix(LINE_SUFFIX).unwrap_or(inner);
      body.push_str(&strip(inner).replace(ESCAPED_QUOTE, "\""));
      body.push('\n');
    }
    trim_trailing_blank(&mut body);

    ExtractedComment {
      text: Some(body),
      preamble: Vec::new(),
      span: Some(start..end),
      trailer: String::new(),
      content_start,
      consumed: (end + 1).min(lines.len()),
    }
  }

  fn to_comment(&self, text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for line in text.lines() {
      out.push_str(LINE_PREFIX);
      out.push_str(&strip(line).replace('"', ESCAPED_QUOTE));
      out.push_str(LINE_SUFFIX);
      out.push('\n');
    }
    out.push('\n');
    out
  }

  fn replace_header(&self, lines: &[&str], replace_existing: bool, render: &mut HeaderRenderer<'_>) -> String {
    let content_start = Self::first_non_blank(lines);
    let mut next = content_start.unwrap_or(lines.len());
    let mut year = None;
    if replace_existing && content_start.is_some_and(|idx| strip(lines[idx]).starts_with(LINE_PREFIX)) {
      let end = Self::run_end(lines, next);
      year = first_year(&lines[next..end]);
      next = end;
    }

    let mut out = self.to_comment(&render(year));
    if let Some(line) = lines.get(next) {
      if !line.is_empty() {
        out.push_str(line);
        out.push('\n');
      }
      push_lines(&mut out, &lines[next + 1..]);
    }
    out
  }
}
