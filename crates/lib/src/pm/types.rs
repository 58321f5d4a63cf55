use std::io;

use serde::Deserialize;
use thiserror::Error;
use tokio::sync::mpsc;

/// Buffer size of progress channels created by callers.
pub const PROGRESS_BUFFER: usize = 64;

/// One raw output line from the package tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
  pub line: String,
}

impl Progress {
  pub fn line(line: impl Into<String>) -> Self {
    Self { line: line.into() }
  }
}

pub type ProgressSender = mpsc::Sender<Progress>;

/// A package found in a platform directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
  pub name: String,
  pub version: String,
}

/// Errors raised by package-manager backends.
#[derive(Debug, Error)]
pub enum PmError {
  /// The tool could not be started at all.
  #[error("failed to start {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: io::Error,
  },

  /// The tool ran and exited unsuccessfully.
  #[error("{program} exited with code {code:?}{}", detail_suffix(.detail))]
  CommandFailed {
    program: String,
    code: Option<i32>,
    /// Last non-blank stderr line, if any.
    detail: String,
  },

  #[error("io error: {0}")]
  Io(#[from] io::Error),

  #[error("failed to parse package list: {0}")]
  ParseList(#[from] serde_json::Error),
}

fn detail_suffix(detail: &str) -> String {
  if detail.is_empty() {
    String::new()
  } else {
    format!(": {}", detail)
  }
}

/// `dependencies` entry of `npm list --json` / `pnpm list --json`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListedDependency {
  #[serde(default)]
  pub version: String,
}
