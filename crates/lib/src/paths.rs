//! Well-known filesystem locations.

use std::path::{Path, PathBuf};

use crate::consts::{APP_NAME, LOGS_DIR, STATE_DIR};

/// Returns the user's home directory
#[cfg(windows)]
pub fn home_dir() -> Option<PathBuf> {
  std::env::var_os("USERPROFILE").map(PathBuf::from)
}

/// Returns the user's home directory
#[cfg(not(windows))]
pub fn home_dir() -> Option<PathBuf> {
  std::env::var_os("HOME").map(PathBuf::from)
}

/// Default install root: `~/kb-platform`, or `./kb-platform` without a home.
pub fn default_platform_dir() -> PathBuf {
  home_dir().unwrap_or_else(|| PathBuf::from(".")).join(APP_NAME)
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
  let rest = if path == "~" { Some("") } else { path.strip_prefix("~/") };
  match (rest, home_dir()) {
    (Some(""), Some(home)) => home,
    (Some(rest), Some(home)) => home.join(rest),
    _ => PathBuf::from(path),
  }
}

/// `<dir>/.kb`, used in both the platform and the project directory.
pub fn state_dir(dir: &Path) -> PathBuf {
  dir.join(STATE_DIR)
}

/// `<platform>/.kb/logs`
pub fn logs_dir(platform_dir: &Path) -> PathBuf {
  state_dir(platform_dir).join(LOGS_DIR)
}
