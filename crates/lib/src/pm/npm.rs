use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use super::PackageManager;
use super::process::{ensure_package_json, run_captured, run_streaming};
use super::types::{InstalledPackage, ListedDependency, PmError, ProgressSender};

/// npm backend. `install` is additive, so it is safe to call with the full set.
#[derive(Debug, Clone)]
pub struct NpmManager {
  program: PathBuf,
}

#[derive(Debug, Deserialize)]
struct NpmList {
  #[serde(default)]
  dependencies: BTreeMap<String, ListedDependency>,
}

impl NpmManager {
  pub fn new() -> Self {
    Self::with_program("npm")
  }

  /// Use a specific npm executable.
  pub fn with_program(program: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
    }
  }

  async fn run(&self, verb: &str, dir: &Path, pkgs: &[String], progress: &ProgressSender) -> Result<(), PmError> {
    ensure_package_json(dir).await?;
    run_streaming(&self.program, &prefixed_args(verb, dir, pkgs), dir, progress).await
  }
}

impl Default for NpmManager {
  fn default() -> Self {
    Self::new()
  }
}

fn prefixed_args(verb: &str, dir: &Path, pkgs: &[String]) -> Vec<String> {
  let mut args = vec![verb.to_string(), "--prefix".to_string(), dir.display().to_string()];
  args.extend(pkgs.iter().cloned());
  args
}

#[async_trait]
impl PackageManager for NpmManager {
  fn name(&self) -> &str {
    "npm"
  }

  async fn install(&self, dir: &Path, pkgs: &[String], progress: &ProgressSender) -> Result<(), PmError> {
    self.run("install", dir, pkgs, progress).await
  }

  async fn update(&self, dir: &Path, pkgs: &[String], progress: &ProgressSender) -> Result<(), PmError> {
    self.run("update", dir, pkgs, progress).await
  }

  async fn list_installed(&self, dir: &Path) -> Result<Vec<InstalledPackage>, PmError> {
    if !tokio::fs::try_exists(dir.join("node_modules")).await? {
      return Ok(Vec::new());
    }

    let mut args = prefixed_args("list", dir, &[]);
    args.extend(["--json".to_string(), "--depth=0".to_string()]);
    let stdout = run_captured(&self.program, &args, dir).await?;
    let list: NpmList = serde_json::from_slice(&stdout)?;

    Ok(
      list
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

#[cfg(all(test, unix))]
mod tests {
  use super::*;
  use crate::pm::testutil::{collect_lines, stub_program};
  use tempfile::TempDir;

  #[test]
  fn name_is_npm() {
    assert_eq!(NpmManager::new().name(), "npm");
  }

  #[tokio::test]
  async fn install_passes_prefix_and_packages() {
    let temp = TempDir::new().unwrap();
    let program = stub_program(temp.path(), "echo \"args: $*\"\necho \"npm warn deprecated\" >&2\n");
    let platform = temp.path().join("platform");
    let npm = NpmManager::with_program(&program);

    let pkgs = vec!["@kb-labs/cli-bin".to_string(), "@kb-labs/sdk".to_string()];
    let lines = collect_lines(|tx| async move { npm.install(&platform, &pkgs, &tx).await }).await;

    let lines = lines.unwrap();
    let expected = format!(
      "args: install --prefix {} @kb-labs/cli-bin @kb-labs/sdk",
      temp.path().join("platform").display()
    );
    assert!(lines.contains(&expected), "got {lines:?}");
    assert!(lines.contains(&"npm warn deprecated".to_string()));
    assert!(temp.path().join("platform").join("package.json").exists());
  }

  #[tokio::test]
  async fn update_uses_update_verb() {
    let temp = TempDir::new().unwrap();
    let program = stub_program(temp.path(), "echo \"$1\"\n");
    let npm = NpmManager::with_program(&program);
    let dir = temp.path().to_path_buf();

    let lines = collect_lines(|tx| async move { npm.update(&dir, &["a".to_string()], &tx).await })
      .await
      .unwrap();
    assert_eq!(lines, vec!["update"]);
  }

  #[tokio::test]
  async fn failing_install_reports_command_failed() {
    let temp = TempDir::new().unwrap();
    let program = stub_program(temp.path(), "echo progress\necho \"npm ERR! 404\" >&2\nexit 1\n");
    let npm = NpmManager::with_program(&program);
    let dir = temp.path().to_path_buf();

    let err = collect_lines(|tx| async move { npm.install(&dir, &["missing".to_string()], &tx).await })
      .await
      .unwrap_err();
    match err {
      PmError::CommandFailed { program, code, detail } => {
        assert!(program.ends_with("stub.sh"));
        assert_eq!(code, Some(1));
        assert_eq!(detail, "npm ERR! 404");
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[tokio::test]
  async fn list_installed_empty_without_node_modules() {
    let temp = TempDir::new().unwrap();
    let npm = NpmManager::with_program("/nonexistent/npm");

    let pkgs = npm.list_installed(temp.path()).await.unwrap();
    assert!(pkgs.is_empty());
  }

  #[tokio::test]
  async fn list_installed_parses_dependencies() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("node_modules")).unwrap();
    let program = stub_program(
      temp.path(),
      "cat <<'JSON'\n{\"dependencies\":{\"@kb-labs/sdk\":{\"version\":\"1.2.0\"},\"@kb-labs/cli-bin\":{\"version\":\"0.9.1\"}}}\nJSON\n",
    );
    let npm = NpmManager::with_program(&program);

    let pkgs = npm.list_installed(temp.path()).await.unwrap();
    assert_eq!(pkgs, vec![
      InstalledPackage {
        name: "@kb-labs/cli-bin".to_string(),
        version: "0.9.1".to_string(),
      },
      InstalledPackage {
        name: "@kb-labs/sdk".to_string(),
        version: "1.2.0".to_string(),
      },
    ]);
  }
}
