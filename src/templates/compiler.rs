//! Template compilation.
//!
//! Templates are written as a Java block comment: an opening `/*` line, body
//! lines carrying a three character ` * ` prefix, and a closing ` */` line.
//! The body is rendered two ways: as plain text for writing new headers, and
//! as a regular expression for recognizing existing ones.

/// Placeholder for the copyright year in template text.
pub const YEAR_PLACEHOLDER: &str = "YYYY";

/// A single copyright statement, optionally followed by "All rights reserved.".
const COPYRIGHT_LINE: &str =
  r"^(?:Portions )?Copyright (?:\(c\) )?[-0-9, ]+ (?:by )?[A-Za-z].*(?:\nAll rights reserved.)?$";

/// Boilerplate an old IDE put in front of new files.
const IDE_BOILERPLATE: &str = r"(?:To change this template, choose Tools \| Templates\nand open the template in the editor\.\n\n)?";

const BODY_PREFIX_LEN: usize = 3;

fn body_lines(source: &str) -> impl Iterator<Item = &str> {
  source
    .lines()
    .skip(1)
    .take_while(|line| *line != " */")
    .map(|line| line.get(BODY_PREFIX_LEN..).unwrap_or(""))
}

/// Drops one trailing blank line, matching how comment bodies are extracted.
fn trim_trailing_blank(text: &mut String) {
  if text.ends_with("\n\n") {
    text.pop();
  }
}

/// Renders the template body as plain text, placeholder intact.
pub fn template_text(source: &str) -> String {
  let mut text = String::with_capacity(source.len());
  for line in body_lines(source) {
    text.push_str(line);
    text.push('\n');
  }
  trim_trailing_blank(&mut text);
  text
}

/// Renders the template body as a regular expression source.
///
/// Every line matches literally, except the line carrying the year
/// placeholder, which accepts one or more stacked copyright statements from
/// anyone. A template without a placeholder accepts an optional block of
/// copyright statements (followed by a blank line) in front of its text.
pub fn template_pattern(source: &str) -> String {
  let mut body = String::with_capacity(source.len() * 2);
  let mut saw_placeholder = false;
  for line in body_lines(source) {
    if line.contains(YEAR_PLACEHOLDER) {
      saw_placeholder = true;
      body.push_str(COPYRIGHT_LINE);
      body.push_str(r"(?:\n");
      body.push_str(COPYRIGHT_LINE);
      body.push_str(")*");
    } else {
      body.push_str(&regex::escape(line));
    }
    body.push('\n');
  }
  if !saw_placeholder {
    body.insert_str(0, &format!(r"(?:(?:{COPYRIGHT_LINE}\n)+\n)?"));
  }
  trim_trailing_blank(&mut body);
  format!("(?m){IDE_BOILERPLATE}{body}")
}
