//! Install log: every stage label and package-manager line of a run.
//!
//! Lines go to `<platform>/.kb/logs/install-<timestamp>.log` and are mirrored
//! as `info` events, which the CLI prints to stderr only with `--verbose` or
//! a matching `RUST_LOG`.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::Local;
use thiserror::Error;
use tracing::{info, warn};

use crate::paths::logs_dir;

/// Accepts formatted log lines. The engine's only logging dependency.
pub trait LineSink: Send + Sync {
  fn line(&self, line: &str);
}

#[derive(Debug, Error)]
pub enum LogError {
  #[error("failed to create logs directory {}: {source}", .path.display())]
  CreateDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to create log file {}: {source}", .path.display())]
  CreateFile {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// File-backed [`LineSink`].
#[derive(Debug)]
pub struct InstallLog {
  file: Option<(PathBuf, Mutex<File>)>,
}

impl InstallLog {
  /// Start a new timestamped log file in the platform's logs directory.
  pub fn create(platform_dir: &Path) -> Result<Self, LogError> {
    let dir = logs_dir(platform_dir);
    fs::create_dir_all(&dir).map_err(|source| LogError::CreateDir {
      path: dir.clone(),
      source,
    })?;

    let path = dir.join(format!("install-{}.log", Local::now().format("%Y%m%d-%H%M%S")));
    let file = File::create(&path).map_err(|source| LogError::CreateFile {
      path: path.clone(),
      source,
    })?;

    Ok(Self {
      file: Some((path, Mutex::new(file))),
    })
  }

  /// A log that only emits tracing events.
  pub fn discard() -> Self {
    Self { file: None }
  }

  /// Path of the log file, `None` for [`InstallLog::discard`].
  pub fn path(&self) -> Option<&Path> {
    self.file.as_ref().map(|(path, _)| path.as_path())
  }
}

impl LineSink for InstallLog {
  fn line(&self, line: &str) {
    info!("{}", line);

    let Some((path, file)) = &self.file else {
      return;
    };
    let mut file = file.lock().unwrap_or_else(PoisonError::into_inner);
    if let Err(e) = writeln!(file, "{}", line) {
      warn!(path = %path.display(), error = %e, "failed to write install log");
    }
  }
}

/// Most recent install log in `platform_dir`, if any.
///
/// File names embed a sortable timestamp, so name order is chronological.
pub fn latest_log_path(platform_dir: &Path) -> Option<PathBuf> {
  let entries = fs::read_dir(logs_dir(platform_dir)).ok()?;
  entries
    .filter_map(Result::ok)
    .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
    .map(|e| e.path())
    .max()
}
