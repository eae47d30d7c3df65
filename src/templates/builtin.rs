//! Templates bundled into the binary.

/// Name of the default correct template.
pub const DEFAULT_CORRECT: &str = "epl-copyright.txt";
/// Name of the default alternate template.
pub const DEFAULT_ALTERNATE: &str = "apache-copyright.txt";
/// Name of the default BSD-style template.
pub const DEFAULT_BSD: &str = "edl-copyright.txt";

macro_rules! bundled {
  ($($name:literal),* $(,)?) => {
    &[$(($name, include_str!(concat!("../../resources/copyright-templates/", $name)))),*]
  };
}

static BUNDLED: &[(&str, &str)] = bundled![
  "epl-copyright.txt",
  "edl-copyright.txt",
  "apache-copyright.txt",
  "apacheold-copyright.txt",
  "oracle-apache-copyright.txt",
  "mitsallings-copyright.txt",
  "w3c-copyright.txt",
  "sun-cddl+gpl+ce-copyright.txt",
  "sun-cddl+gpl+ce+apache-copyright.txt",
  "sun-cddl+gpl+ce+apachenew-copyright.txt",
  "sun-bsd-copyright.txt",
  "bsd-copyright.txt",
  "cddl-copyright.txt",
  "cddl2-copyright.txt",
  "cddl+gpl+ce-copyright.txt",
  "cddl+gpl+ce-java.net-copyright.txt",
  "cddl+gpl-copyright.txt",
];

/// Looks up a bundled template by file name, with or without the
/// `-copyright.txt` suffix (`"epl"` and `"epl-copyright.txt"` are the same).
pub fn lookup(name: &str) -> Option<&'static str> {
  let full = if name.ends_with(".txt") {
    name.to_string()
  } else {
    format!("{name}-copyright.txt")
  };
  BUNDLED.iter().find(|(bundled, _)| *bundled == full).map(|(_, text)| *text)
}

/// Names of all bundled templates.
#[cfg(test)]
pub fn names() -> impl Iterator<Item = &'static str> {
  BUNDLED.iter().map(|(name, _)| *name)
}
