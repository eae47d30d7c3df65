//! # File I/O Module
//!
//! Reads and writes source files for the processor. Files are treated as
//! ISO-8859-1 so that every byte survives a read/repair/write cycle unchanged,
//! whatever the file's real encoding is.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, trace};

/// Suffix of the sibling file a repair is written to before it replaces the
/// original.
pub const REPAIRED_SUFFIX: &str = ".new";

/// File I/O operations for the processor.
///
/// This struct provides static methods for reading and writing files.
pub struct FileIO;

impl FileIO {
  /// Reads a whole file, mapping each byte to the character with the same
  /// code point.
  ///
  /// # Parameters
  ///
  /// * `path` - Path to the file to read
  ///
  /// # Returns
  ///
  /// The decoded file content.
  pub async fn read_latin1(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
      .await
      .with_context(|| format!("Failed to read file: {}", path.display()))?;
    Ok(decode_latin1(&bytes))
  }

  /// Path of the sibling file used to stage a repair.
  pub fn repaired_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(REPAIRED_SUFFIX);
    PathBuf::from(name)
  }

  /// Writes repaired content next to the original as `<file>.new`, then copies
  /// it over the original and removes the sibling.
  ///
  /// With `keep_sibling` (dry-run), the `.new` file is left in place and the
  /// original is not touched.
  ///
  /// # Parameters
  ///
  /// * `path` - The file being repaired
  /// * `content` - The repaired content
  /// * `keep_sibling` - Leave the repaired copy in `<file>.new` instead of replacing the original
  ///
  /// # Returns
  ///
  /// The path the repaired content ended up in.
  pub async fn write_repaired(path: &Path, content: &str, keep_sibling: bool) -> Result<PathBuf> {
    let sibling = Self::repaired_path(path);
    tokio::fs::write(&sibling, encode_latin1(content))
      .await
      .with_context(|| format!("Failed to write file: {}", sibling.display()))?;

    if keep_sibling {
      debug!("Left repaired copy in {}", sibling.display());
      return Ok(sibling);
    }

    let copied = tokio::fs::copy(&sibling, path)
      .await
      .with_context(|| format!("Failed to replace {} with {}", path.display(), sibling.display()));
    if let Err(err) = tokio::fs::remove_file(&sibling).await {
      trace!("Could not remove {}: {}", sibling.display(), err);
    }
    copied?;
    Ok(path.to_path_buf())
  }

  /// Reads a list of exclude patterns, one per line. Blank lines and lines
  /// starting with `#` are ignored.
  pub fn read_exclude_list(path: &Path) -> Result<Vec<String>> {
    let content =
      std::fs::read_to_string(path).with_context(|| format!("Failed to read exclude list: {}", path.display()))?;
    Ok(
      content
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.trim().starts_with('#'))
        .map(str::to_string)
        .collect(),
    )
  }
}

/// Decodes ISO-8859-1 bytes.
pub fn decode_latin1(bytes: &[u8]) -> String {
  bytes.iter().map(|&b| char::from(b)).collect()
}

/// Encodes text as ISO-8859-1. Characters outside the range become `?`.
pub fn encode_latin1(text: &str) -> Vec<u8> {
  text.chars().map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?')).collect()
}
