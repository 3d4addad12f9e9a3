//! External tool discovery.

use std::path::PathBuf;

/// Absolute path of `name` on `PATH`, if present.
pub fn find_tool(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}
