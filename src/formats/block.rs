//! Block comments with an opening and a closing delimiter: Java-like
//! sources, JSP, XML/HTML and Asciidoc.

use super::{
  CommentFormat, ExtractedComment, FormatGroup, HeaderRenderer, find_prefix, first_year, push_lines,
  starts_with_ignore_case, starts_with_ignoring_cr, strip, strip_comment_prefix, trim_trailing_blank,
};

/// Asciidoc comments are rendered with a fence this long.
const ASCIIDOC_FENCE: &str = "///////////////////////////////////////////////////////////////////////////////";
const ASCIIDOC_FENCE_MIN: usize = 4;

const JAVA_SUFFIXES: &[&str] = &[".java", ".g", ".c", ".h", ".css", ".js"];
const XML_SUFFIXES: &[&str] = &[
  ".xml", ".xsl", ".html", ".xhtml", ".htm", ".dtd", ".xsd", ".wsdl", ".inc", ".jnlp", ".tld", ".xcs", ".jsf", ".hs",
  ".jhm",
];
const XML_PREAMBLE: &[&str] = &["<?xml ", "<!DOCTYPE", "<html", "<head>", "<meta"];

/// How a block comment opens and closes.
#[derive(Debug, Clone, Copy)]
enum Delimiters {
  /// Fixed start and end tokens, e.g. `/*` and ` */`.
  Marker { start: &'static str, end: &'static str },
  /// A line of four or more slashes, closed by an identical line.
  Fence,
}

impl Delimiters {
  fn is_start(self, line: &str) -> bool {
    match self {
      Self::Marker { start, .. } => line.contains(start),
      Self::Fence => is_fence(line),
    }
  }

  fn is_end(self, line: &str, opening: &str) -> bool {
    match self {
      Self::Marker { end, .. } => line.contains(end.trim()),
      Self::Fence => line == opening,
    }
  }

  /// Lines inside a comment that carry another start token are ignored.
  fn is_nested_start(self, line: &str) -> bool {
    match self {
      Self::Marker { start, .. } => line.contains(start),
      Self::Fence => false,
    }
  }

  fn trailer(self, line: &str) -> &str {
    match self {
      Self::Marker { end, .. } => {
        let end = end.trim();
        line.find(end).map_or("", |idx| line[idx + end.len()..].trim())
      }
      Self::Fence => "",
    }
  }

  /// Inner text and trailer of a comment that opens and closes on one line.
  fn single_line(self, line: &str) -> Option<(&str, &str)> {
    let Self::Marker { start, end } = self else {
      return None;
    };
    let end = end.trim();
    let open = line.find(start)? + start.len();
    let close = line[open..].find(end)? + open;
    Some((&line[open..close], line[close + end.len()..].trim()))
  }

  const fn opening(self) -> &'static str {
    match self {
      Self::Marker { start, .. } => start,
      Self::Fence => ASCIIDOC_FENCE,
    }
  }

  const fn closing(self) -> &'static str {
    match self {
      Self::Marker { end, .. } => end,
      Self::Fence => ASCIIDOC_FENCE,
    }
  }
}

fn is_fence(line: &str) -> bool {
  line.len() >= ASCIIDOC_FENCE_MIN && line.bytes().all(|b| b == b'/')
}

/// A block comment syntax.
#[derive(Debug, Clone)]
pub struct BlockFormat {
  name: &'static str,
  group: FormatGroup,
  delimiters: Delimiters,
  prefix: &'static str,
  blank_lines: bool,
  move_preamble: bool,
  preamble: fn(&str) -> bool,
  supports: fn(&str, &str) -> bool,
}

impl BlockFormat {
  /// `/* ... */` sources. A leading `package` line is moved below a new header.
  pub fn java() -> Self {
    Self {
      name: "java",
      group: FormatGroup::Java,
      delimiters: Delimiters::Marker { start: "/*", end: " */" },
      prefix: " * ",
      blank_lines: false,
      move_preamble: true,
      preamble: |line| line.starts_with("package "),
      supports: |name, content| {
        JAVA_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) || starts_with_ignoring_cr(content, "/*\n")
      },
    }
  }

  pub fn jsp() -> Self {
    Self {
      name: "jsp",
      group: FormatGroup::Xml,
      delimiters: Delimiters::Marker {
        start: "<%--",
        end: "--%>",
      },
      prefix: "    ",
      blank_lines: true,
      move_preamble: false,
      preamble: |_| false,
      supports: |name, _| name.ends_with(".jsp"),
    }
  }

  /// XML and HTML. Prolog, doctype and opening html/head/meta lines may come
  /// before the header.
  pub fn xml() -> Self {
    Self {
      name: "xml",
      group: FormatGroup::Xml,
      delimiters: Delimiters::Marker {
        start: "<!--",
        end: "-->",
      },
      prefix: "    ",
      blank_lines: true,
      move_preamble: false,
      preamble: |line| XML_PREAMBLE.iter().any(|prefix| starts_with_ignore_case(line, prefix)),
      supports: |name, content| {
        XML_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
          || (name == "build.properties" && starts_with_ignoring_cr(content, "<"))
          || starts_with_ignoring_cr(content, "<?xml")
      },
    }
  }

  pub fn asciidoc() -> Self {
    Self {
      name: "asciidoc",
      group: FormatGroup::Text,
      delimiters: Delimiters::Fence,
      prefix: "    ",
      blank_lines: true,
      move_preamble: false,
      preamble: |_| false,
      supports: |name, _| name.ends_with(".adoc"),
    }
  }

  /// Skips blank and preamble lines, returning the collected preamble and
  /// the index of the first other line.
  fn skip_preamble(&self, lines: &[&str]) -> (Vec<String>, Option<usize>) {
    let mut preamble = Vec::new();
    for (idx, raw) in lines.iter().enumerate() {
      let line = strip(raw);
      if (self.preamble)(line) {
        preamble.push(line.to_string());
      } else if !line.is_empty() {
        return (preamble, Some(idx));
      }
    }
    (preamble, None)
  }
}

impl CommentFormat for BlockFormat {
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
    let (preamble, content_start) = self.skip_preamble(lines);
    let Some(start) = content_start else {
      return ExtractedComment::without_comment(preamble, None, lines.len());
    };
    let opening = strip(lines[start]);
    if !self.delimiters.is_start(opening) {
      return ExtractedComment::without_comment(preamble, Some(start), lines.len());
    }

    if let Some((inner, trailer)) = self.delimiters.single_line(opening) {
      let inner = inner.trim();
      let inner = find_prefix(inner).map_or("", |prefix| &inner[prefix.len()..]);
      let text = if inner.is_empty() {
        String::new()
      } else {
        format!("{}\n", strip(inner))
      };
      return ExtractedComment {
        text: Some(text),
        preamble,
        span: Some(start..start + 1),
        trailer: trailer.to_string(),
        content_start,
        consumed: start + 1,
      };
    }

    let mut body = String::new();
    let mut prefix: Option<&str> = None;
    let mut trailer = String::new();
    let mut end = lines.len();
    for (idx, line) in lines.iter().enumerate().skip(start + 1) {
      if self.delimiters.is_nested_start(line) {
        continue;
      }
      if self.delimiters.is_end(line, opening) {
        trailer = self.delimiters.trailer(line).to_string();
        end = idx + 1;
        break;
      }
      let current = match prefix {
        Some(current) => current,
        None => match find_prefix(line) {
          Some(found) => *prefix.insert(found),
          None => continue,
        },
      };
      body.push_str(strip(strip_comment_prefix(line, current)));
      body.push('\n');
    }
    trim_trailing_blank(&mut body);

    ExtractedComment {
      text: Some(body),
      preamble,
      span: Some(start..end),
      trailer,
      content_start,
      consumed: end,
    }
  }

  fn to_comment(&self, text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    out.push_str(self.delimiters.opening());
    out.push('\n');
    if self.blank_lines {
      out.push_str(strip(self.prefix));
      out.push('\n');
    }
    for line in text.lines() {
      out.push_str(strip(&format!("{}{line}", self.prefix)));
      out.push('\n');
    }
    if self.blank_lines {
      out.push_str(strip(self.prefix));
      out.push('\n');
    }
    out.push_str(self.delimiters.closing());
    out
  }

  fn replace_header(&self, lines: &[&str], replace_existing: bool, render: &mut HeaderRenderer<'_>) -> String {
    let extracted = self.extract(lines);
    let mut out = String::new();
    if !self.move_preamble {
      for line in &extracted.preamble {
        out.push_str(line);
        out.push('\n');
      }
    }
    let push_moved_preamble = |out: &mut String| {
      if self.move_preamble && !extracted.preamble.is_empty() {
        for line in &extracted.preamble {
          out.push_str(line);
          out.push('\n');
        }
        out.push('\n');
      }
    };

    match extracted.span.as_ref().filter(|_| replace_existing) {
      Some(span) => {
        let header = render(first_year(&lines[span.clone()]));
        out.push_str(&self.to_comment(&header));
        out.push_str(&extracted.trailer);
        out.push_str("\n\n");
        push_moved_preamble(&mut out);
        let rest = &lines[span.end..];
        let first_content = rest.iter().position(|line| !line.trim().is_empty()).unwrap_or(rest.len());
        push_lines(&mut out, &rest[first_content..]);
      }
      None => {
        let header = render(None);
        out.push_str(&self.to_comment(&header));
        out.push_str("\n\n");
        push_moved_preamble(&mut out);
        let rest = extracted.content_start.map_or(&[][..], |idx| &lines[idx..]);
        push_lines(&mut out, rest);
      }
    }
    out
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::formats::split_lines;

  fn extract(format: &BlockFormat, content: &str) -> ExtractedComment {
    format.extract(&split_lines(content))
  }

  #[test]
  fn test_java_extraction_strips_prefix() {
    let content = "/*\n * Copyright (c) 2018 Acme. All rights reserved.\n *\n * Licensed.\n */\n\npackage x;\n";
    let comment = extract(&BlockFormat::java(), content);
    assert_eq!(
      comment.text.as_deref(),
      Some("Copyright (c) 2018 Acme. All rights reserved.\n\nLicensed.\n")
    );
    assert_eq!(comment.span, Some(0..5));
  }

  #[test]
  fn test_java_package_preamble() {
    let content = "package foo;\n\n/*\n * Copyright 2018 Acme\n */\nclass X {}\n";
    let comment = extract(&BlockFormat::java(), content);
    assert_eq!(comment.preamble, vec!["package foo;".to_string()]);
    assert_eq!(comment.text.as_deref(), Some("Copyright 2018 Acme\n"));
  }

  #[test]
  fn test_no_comment_and_empty_comment() {
    let java = BlockFormat::java();
    assert_eq!(extract(&java, "\n\nclass X {}\n").text, None);
    assert_eq!(extract(&java, "/*\n */\nclass X {}\n").text.as_deref(), Some(""));
    assert_eq!(extract(&java, "").text, None);
  }

  #[test]
  fn test_single_line_comment() {
    let comment = extract(&BlockFormat::xml(), "<!-- Copyright 2010 Acme --> trailing\n<root/>\n");
    assert_eq!(comment.text.as_deref(), Some("Copyright 2010 Acme\n"));
    assert_eq!(comment.trailer, "trailing");
  }

  #[test]
  fn test_xml_preamble_and_trailer() {
    let content = "<?xml version=\"1.0\"?>\n<!--\n\n    Copyright 2019 Acme\n\n--><root>\n";
    let comment = extract(&BlockFormat::xml(), content);
    assert_eq!(comment.preamble, vec!["<?xml version=\"1.0\"?>".to_string()]);
    assert_eq!(comment.text.as_deref(), Some("Copyright 2019 Acme\n"));
    assert_eq!(comment.trailer, "<root>");
  }

  #[test]
  fn test_asciidoc_fence() {
    let content = "////\n    Copyright 2020 Acme\n////\n= Title\n";
    let comment = extract(&BlockFormat::asciidoc(), content);
    assert_eq!(comment.text.as_deref(), Some("Copyright 2020 Acme\n"));
    assert_eq!(comment.span, Some(0..3));
  }

  #[test]
  fn test_to_comment_shapes() {
    assert_eq!(BlockFormat::java().to_comment("A\n\nB\n"), "/*\n * A\n *\n * B\n */");
    assert_eq!(BlockFormat::xml().to_comment("A\n"), "<!--\n\n    A\n\n-->");
  }

  #[test]
  fn test_replace_existing_moves_package_below_header() {
    let java = BlockFormat::java();
    let lines = split_lines("package foo;\n/*\n * Copyright 2015 Old\n */\n\n\nclass X {}\n");
    let mut seen = None;
    let out = java.replace_header(&lines, true, &mut |year: Option<&str>| {
      seen = year.map(str::to_string);
      "New header\n".to_string()
    });
    assert_eq!(seen.as_deref(), Some("2015"));
    assert_eq!(out, "/*\n * New header\n */\n\npackage foo;\n\nclass X {}\n");
  }

  #[test]
  fn test_insert_keeps_existing_comment() {
    let xml = BlockFormat::xml();
    let lines = split_lines("<?xml version=\"1.0\"?>\n<!-- generated -->\n<root/>\n");
    let out = xml.replace_header(&lines, false, &mut |_: Option<&str>| "H\n".to_string());
    assert_eq!(out, "<?xml version=\"1.0\"?>\n<!--\n\n    H\n\n-->\n\n<!-- generated -->\n<root/>\n");
  }
}
