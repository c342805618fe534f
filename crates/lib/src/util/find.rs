//! Upward file discovery.

use std::path::{Path, PathBuf};

/// Search `start` and its ancestors for a file named `name`.
///
/// Returns the path of the first match, walking upward; the first directory
/// that contains the file wins.
pub fn find_up(start: &Path, name: &str) -> Option<PathBuf> {
  let mut dir = Some(start);
  while let Some(d) = dir {
    let candidate = d.join(name);
    if candidate.is_file() {
      return Some(candidate);
    }
    dir = d.parent();
  }
  None
}
