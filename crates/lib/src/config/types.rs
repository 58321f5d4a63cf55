use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::manifest::Manifest;

/// Current snapshot schema version.
pub const CONFIG_VERSION: u32 = 1;

/// Persistent state of an installed platform.
///
/// `installed_at` is the first install date; updates only replace `manifest`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConfig {
  pub installed_at: DateTime<Utc>,
  pub platform: PathBuf,
  pub cwd: PathBuf,
  #[serde(alias = "packageManagerName")]
  pub pm: String,
  pub manifest: Manifest,
  #[serde(alias = "schemaVersion")]
  pub version: u32,
}

impl PlatformConfig {
  /// A fresh record stamped with the current time.
  pub fn new(platform_dir: &Path, cwd: &Path, pm: &str, manifest: Manifest) -> Self {
    Self {
      installed_at: Utc::now(),
      platform: absolute(platform_dir),
      cwd: absolute(cwd),
      pm: pm.to_string(),
      manifest,
      version: CONFIG_VERSION,
    }
  }
}

fn absolute(path: &Path) -> PathBuf {
  std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Errors that can occur while loading or saving the snapshot.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// No snapshot where one was required.
  #[error("no config found at {}; is the platform installed?", .path.display())]
  NotFound { path: PathBuf },

  /// The file exists but is not a valid snapshot.
  #[error("failed to parse config {}: {source}", .path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("failed to read config: {0}")]
  Read(#[source] io::Error),

  #[error("failed to create config directory: {0}")]
  CreateDir(#[source] io::Error),

  #[error("failed to write config: {0}")]
  Write(#[source] io::Error),

  #[error("failed to serialize config: {0}")]
  Serialize(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn new_config_uses_absolute_paths() {
    let cfg = PlatformConfig::new(Path::new("platform"), Path::new("project"), "npm", Manifest::default());

    assert!(cfg.platform.is_absolute());
    assert!(cfg.cwd.is_absolute());
    assert!(cfg.platform.ends_with("platform"));
    assert_eq!(cfg.pm, "npm");
    assert_eq!(cfg.version, CONFIG_VERSION);
  }

  #[test]
  fn serializes_with_wire_field_names() {
    let cfg = PlatformConfig::new(Path::new("/opt/kb"), Path::new("/work/app"), "pnpm", Manifest::default());
    let value = serde_json::to_value(&cfg).unwrap();

    for field in ["installedAt", "platform", "cwd", "pm", "manifest", "version"] {
      assert!(value.get(field).is_some(), "missing field {field}");
    }
    assert_eq!(value["pm"], "pnpm");
  }

  #[test]
  fn accepts_descriptive_aliases() {
    let json = r#"{
      "installedAt": "2026-01-02T03:04:05Z",
      "platform": "/opt/kb",
      "cwd": "/work/app",
      "packageManagerName": "npm",
      "manifest": { "version": "1.0.0" },
      "schemaVersion": 1
    }"#;

    let cfg: PlatformConfig = serde_json::from_str(json).unwrap();
    assert_eq!(cfg.pm, "npm");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.installed_at.to_rfc3339(), "2026-01-02T03:04:05+00:00");
  }
}
