//! Plain text fallback. There is no way to tell where a header ends, so the
//! first lines of the file are compared against the start of each template
//! and the file is never rewritten.

use super::{CommentFormat, ExtractedComment, FormatGroup, HeaderRenderer, MatchMode, push_lines};

const MAX_LINES: usize = 100;

#[derive(Debug, Clone, Copy, Default)]
pub struct TextFormat;

/// Drops leading decoration (comment characters, bullets, whitespace).
fn canon(line: &str) -> &str {
  line
    .char_indices()
    .find(|(_, c)| c.is_alphanumeric() || matches!(c, '"' | '[' | '('))
    .map_or("", |(idx, _)| line[idx..].trim())
}

impl CommentFormat for TextFormat {
  fn name(&self) -> &'static str {
    "text"
  }

  fn group(&self) -> FormatGroup {
    FormatGroup::Text
  }

  fn supports(&self, _file_name: &str, _content: &str) -> bool {
    true
  }

  fn extract(&self, lines: &[&str]) -> ExtractedComment {
    let mut body = String::new();
    let mut taken = 0;
    let mut consumed = 0;
    let mut content_start = None;
    for (idx, line) in lines.iter().enumerate() {
      consumed = idx + 1;
      let cline = canon(line);
      if body.is_empty() && (line.starts_with("#!") || cline.is_empty()) {
        continue;
      }
      content_start.get_or_insert(idx);
      body.push_str(cline);
      body.push('\n');
      taken += 1;
      if taken >= MAX_LINES {
        break;
      }
    }

    ExtractedComment {
      text: Some(body),
      content_start,
      consumed,
      ..ExtractedComment::default()
    }
  }

  fn to_comment(&self, text: &str) -> String {
    text.to_string()
  }

  fn replace_header(&self, lines: &[&str], _replace_existing: bool, _render: &mut HeaderRenderer<'_>) -> String {
    let mut out = String::new();
    push_lines(&mut out, lines);
    out
  }

  fn match_mode(&self) -> MatchMode {
    MatchMode::Prefix
  }

  fn repairable(&self) -> bool {
    false
  }
}
