use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use super::diff::UpdateDiff;
use crate::config::ConfigError;
use crate::pm::PmError;

/// Result of a successful install.
#[derive(Debug, Clone)]
pub struct InstallResult {
  pub platform_dir: PathBuf,
  pub project_dir: PathBuf,
  pub config_path: PathBuf,
  pub duration: Duration,
}

/// Result of a successful update.
#[derive(Debug, Clone)]
pub struct UpdateResult {
  pub diff: UpdateDiff,
  pub duration: Duration,
}

/// Named stage of an install or update, reported with every failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  InstallPackages,
  WriteConfig,
  PrepareProjectDir,
  LoadConfig,
  AddPackages,
  UpdatePackages,
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let label = match self {
      Stage::InstallPackages => "install packages",
      Stage::WriteConfig => "write config",
      Stage::PrepareProjectDir => "prepare project dir",
      Stage::LoadConfig => "load config",
      Stage::AddPackages => "add new packages",
      Stage::UpdatePackages => "update packages",
    };
    f.write_str(label)
  }
}

/// Failure category, independent of which stage failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// No snapshot where one was required.
  ConfigNotFound,
  /// Snapshot present but unreadable as a record.
  ConfigCorrupt,
  /// The package manager failed.
  Execution,
  /// Directory creation or file write failed.
  Filesystem,
}

/// Errors that abort an install or update.
#[derive(Debug, Error)]
pub enum InstallError {
  #[error("{stage}: {source}")]
  Package {
    stage: Stage,
    #[source]
    source: PmError,
  },

  #[error("{stage}: {source}")]
  Config {
    stage: Stage,
    #[source]
    source: ConfigError,
  },

  #[error("{stage}: failed to create {}: {source}", .path.display())]
  Filesystem {
    stage: Stage,
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

impl InstallError {
  pub fn stage(&self) -> Stage {
    match self {
      InstallError::Package { stage, .. } | InstallError::Config { stage, .. } | InstallError::Filesystem { stage, .. } => {
        *stage
      }
    }
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      InstallError::Package {
        source: PmError::Io(_), ..
      } => ErrorKind::Filesystem,
      InstallError::Package { .. } => ErrorKind::Execution,
      InstallError::Config { source, .. } => match source {
        ConfigError::NotFound { .. } => ErrorKind::ConfigNotFound,
        ConfigError::Parse { .. } => ErrorKind::ConfigCorrupt,
        ConfigError::Read(_) | ConfigError::CreateDir(_) | ConfigError::Write(_) | ConfigError::Serialize(_) => {
          ErrorKind::Filesystem
        }
      },
      InstallError::Filesystem { .. } => ErrorKind::Filesystem,
    }
  }
}
