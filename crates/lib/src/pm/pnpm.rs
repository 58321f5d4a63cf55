use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use super::PackageManager;
use super::process::{ensure_package_json, run_captured, run_streaming};
use super::types::{InstalledPackage, ListedDependency, PmError, ProgressSender};

/// pnpm backend. New packages go through `pnpm add`; `update` only refreshes.
#[derive(Debug, Clone)]
pub struct PnpmManager {
  program: PathBuf,
}

/// One project entry of `pnpm list --json`, which prints an array.
#[derive(Debug, Deserialize)]
struct PnpmProject {
  #[serde(default)]
  dependencies: BTreeMap<String, ListedDependency>,
}

impl PnpmManager {
  pub fn new() -> Self {
    Self::with_program("pnpm")
  }

  /// Use a specific pnpm executable.
  pub fn with_program(program: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
    }
  }

  async fn run(&self, verb: &str, dir: &Path, pkgs: &[String], progress: &ProgressSender) -> Result<(), PmError> {
    // Flat install into dir; no pnpm-workspace.yaml is ever created.
    ensure_package_json(dir).await?;
    let mut args = vec![verb.to_string(), "--dir".to_string(), dir.display().to_string()];
    args.extend(pkgs.iter().cloned());
    run_streaming(&self.program, &args, dir, progress).await
  }
}

impl Default for PnpmManager {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl PackageManager for PnpmManager {
  fn name(&self) -> &str {
    "pnpm"
  }

  async fn install(&self, dir: &Path, pkgs: &[String], progress: &ProgressSender) -> Result<(), PmError> {
    self.run("add", dir, pkgs, progress).await
  }

  async fn update(&self, dir: &Path, pkgs: &[String], progress: &ProgressSender) -> Result<(), PmError> {
    self.run("update", dir, pkgs, progress).await
  }

  async fn list_installed(&self, dir: &Path) -> Result<Vec<InstalledPackage>, PmError> {
    if !tokio::fs::try_exists(dir).await? {
      return Ok(Vec::new());
    }

    let args = vec![
      "list".to_string(),
      "--dir".to_string(),
      dir.display().to_string(),
      "--json".to_string(),
      "--depth=0".to_string(),
    ];
    let stdout = run_captured(&self.program, &args, dir).await?;
    let projects: Vec<PnpmProject> = serde_json::from_slice(&stdout)?;

    let Some(project) = projects.into_iter().next() else {
      return Ok(Vec::new());
    };

    Ok(
      project
        .dependencies
        .into_iter()
        .map(|(name, dep)| InstalledPackage {
          name,
          version: dep.version,
        })
        .collect(),
    )
  }
}
