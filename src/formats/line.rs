//! Comments made of consecutive marker-prefixed lines: properties-style `#`
//! files, signature files and Windows batch files.

use super::{
  CommentFormat, ExtractedComment, FormatGroup, HeaderRenderer, LineEnding, first_year, push_lines,
  starts_with_ignoring_cr, strip, strip_comment_prefix, trim_trailing_blank,
};

const PROPERTIES_SUFFIXES: &[&str] = &[".properties", ".prefs", ".py", ".sh", ".ksh"];
const PROPERTIES_NAME_PREFIXES: &[&str] = &["Makefile", "GNUmakefile", "Rakefile"];

/// A line comment syntax.
#[derive(Debug, Clone)]
pub struct LineFormat {
  name: &'static str,
  group: FormatGroup,
  marker: &'static str,
  prefix: &'static str,
  header: fn(&str) -> bool,
  supports: fn(&str, &str) -> bool,
  ending: Option<LineEnding>,
}

impl LineFormat {
  /// `#` comments: properties files, shell and python scripts, makefiles.
  /// Shebang and editor mode lines stay above the header.
  pub fn properties() -> Self {
    Self {
      name: "properties",
      group: FormatGroup::Properties,
      marker: "#",
      prefix: "# ",
      header: |line| line.starts_with("#!") || line.starts_with("# -*-"),
      supports: |name, content| {
        PROPERTIES_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
          || PROPERTIES_NAME_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
          || name == "osgi.bundle"
          || starts_with_ignoring_cr(content, "#")
      },
      ending: None,
    }
  }

  /// API signature files, whose `#Signature` and `#Version` lines come first.
  pub fn signature() -> Self {
    Self {
      name: "signature",
      group: FormatGroup::Properties,
      marker: "#",
      prefix: "# ",
      header: |line| line.starts_with("#Signature") || line.starts_with("#Version"),
      supports: |name, _| name.ends_with(".sig"),
      ending: None,
    }
  }

  /// Batch files. Rewritten files always use CRLF.
  pub fn bat() -> Self {
    Self {
      name: "bat",
      group: FormatGroup::Text,
      marker: "REM",
      prefix: "REM  ",
      header: |line| line.starts_with("@echo"),
      supports: |name, _| name.ends_with(".bat"),
      ending: Some(LineEnding::CrLf),
    }
  }

  /// Skips header lines, blank lines and (when `skip_bare`) marker-only
  /// lines. Returns the header lines and the index of the first other line.
  fn skip_header(&self, lines: &[&str], skip_bare: bool) -> (Vec<String>, Option<usize>) {
    let mut header = Vec::new();
    for (idx, raw) in lines.iter().enumerate() {
      let line = strip(raw);
      if (self.header)(line) {
        header.push(line.to_string());
      } else if skip_bare && line == self.marker {
        continue;
      } else if !line.is_empty() {
        return (header, Some(idx));
      }
    }
    (header, None)
  }

  /// End of the run of comment lines starting at `start`.
  fn run_end(&self, lines: &[&str], start: usize) -> usize {
    lines[start..]
      .iter()
      .position(|line| line.is_empty() || !line.starts_with(self.marker))
      .map_or(lines.len(), |offset| start + offset)
  }
}

impl CommentFormat for LineFormat {
  fn name(&self) -> &'static str {
    self.name
  }

  fn group(&self) -> FormatGroup {
    self.group
  }

  fn supports(&self, file_name: &str, content: &str) -> bool {
    (self.supports)(file_name, content)
  }

  fn extract(&self, lines: &[&str]) -> ExtractedComment {
    let (preamble, content_start) = self.skip_header(lines, true);
    let Some(start) = content_start.filter(|idx| strip(lines[*idx]).starts_with(self.marker)) else {
      return ExtractedComment::without_comment(preamble, content_start, lines.len());
    };

    let end = self.run_end(lines, start);
    let mut body = String::new();
    for line in &lines[start..end] {
      body.push_str(strip(strip_comment_prefix(strip(line), self.prefix)));
      body.push('\n');
    }
    trim_trailing_blank(&mut body);

    ExtractedComment {
      text: Some(body),
      preamble,
      span: Some(start..end),
      trailer: String::new(),
      content_start,
      consumed: (end + 1).min(lines.len()),
    }
  }

  fn to_comment(&self, text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    out.push_str(self.marker);
    out.push('\n');
    for line in text.lines() {
      out.push_str(strip(&format!("{}{line}", self.prefix)));
      out.push('\n');
    }
    out.push_str(self.marker);
    out.push_str("\n\n");
    out
  }

  fn replace_header(&self, lines: &[&str], replace_existing: bool, render: &mut HeaderRenderer<'_>) -> String {
    let (header_lines, content_start) = self.skip_header(lines, replace_existing);
    let mut out = String::new();
    for line in &header_lines {
      out.push_str(line);
      out.push('\n');
    }

    let mut next = content_start.unwrap_or(lines.len());
    let mut year = None;
    if replace_existing && content_start.is_some_and(|idx| strip(lines[idx]).starts_with(self.marker)) {
      let end = self.run_end(lines, next);
      year = first_year(&lines[next..end]);
      next = end;
    }
    out.push_str(&self.to_comment(&render(year)));

    // The new header already ends with a blank line.
    if let Some(line) = lines.get(next) {
      if !line.is_empty() {
        out.push_str(line);
        out.push('\n');
      }
      push_lines(&mut out, &lines[next + 1..]);
    }
    out
  }

  fn line_ending(&self, observed: LineEnding) -> LineEnding {
    self.ending.unwrap_or(observed)
  }
}
