mod diff;
mod install;
mod logs;
mod status;
mod update;

pub use diff::cmd_diff;
pub use install::{InstallArgs, cmd_install};
pub use logs::cmd_logs;
pub use status::cmd_status;
pub use update::cmd_update;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, ValueEnum};
use tokio::runtime::Runtime;
use tracing::warn;

use kb_create_lib::config::{ConfigStore, PlatformConfig};
use kb_create_lib::installer::{ErrorKind, InstallError, Stage};
use kb_create_lib::manifest::{LoadOptions, Manifest};
use kb_create_lib::paths::expand_home;
use kb_create_lib::pm::{self, PackageManager};

/// Where to read the manifest from. Without either flag the built-in one is used.
#[derive(Debug, Clone, Default, Args)]
pub struct ManifestArgs {
  /// Local manifest file, used when the remote one is unavailable
  #[arg(long, value_name = "FILE")]
  pub manifest: Option<PathBuf>,

  /// Remote manifest URL, tried first
  #[arg(long, value_name = "URL")]
  pub manifest_url: Option<String>,
}

impl ManifestArgs {
  fn load(&self, rt: &Runtime) -> Result<Manifest> {
    let options = LoadOptions {
      remote_url: self.manifest_url.clone(),
      local_override: self.manifest.clone(),
      timeout: None,
    };
    rt.block_on(Manifest::load(&options)).context("Failed to load manifest")
  }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PmChoice {
  Npm,
  Pnpm,
}

impl PmChoice {
  fn name(self) -> &'static str {
    match self {
      PmChoice::Npm => "npm",
      PmChoice::Pnpm => "pnpm",
    }
  }
}

fn runtime() -> Result<Runtime> {
  Runtime::new().context("Failed to create async runtime")
}

/// Platform directory for commands that act on an existing install.
///
/// An explicit `--platform` wins. Otherwise the current directory is used
/// when it holds a snapshot, and the recorded platform path is returned.
fn resolve_platform_dir(platform: Option<&str>) -> Result<PathBuf> {
  if let Some(dir) = platform {
    return Ok(expand_home(dir));
  }

  let cwd = std::env::current_dir().context("Failed to read current directory")?;
  match ConfigStore::new(&cwd).load_if_exists() {
    Ok(Some(config)) => Ok(config.platform),
    Ok(None) => bail!("Platform directory not specified. Use --platform or run from the platform directory."),
    Err(e) => Err(e).with_context(|| format!("Failed to read platform config in {}", cwd.display())),
  }
}

/// The backend recorded in the snapshot, falling back to detection.
fn package_manager_for(recorded: &str) -> Arc<dyn PackageManager> {
  match pm::by_name(recorded) {
    Some(pm) => pm,
    None => {
      warn!(pm = recorded, "unknown package manager in snapshot, detecting");
      pm::detect()
    }
  }
}

/// Load the snapshot of `platform_dir`, with a hint when it is missing or broken.
fn load_snapshot(platform_dir: &Path) -> Result<PlatformConfig> {
  ConfigStore::new(platform_dir).load().map_err(|source| {
    explain(
      InstallError::Config {
        stage: Stage::LoadConfig,
        source,
      },
      platform_dir,
    )
  })
}

/// Attach a next-step hint to engine errors a user can act on.
fn explain(err: InstallError, platform_dir: &Path) -> anyhow::Error {
  let hint = match err.kind() {
    ErrorKind::ConfigNotFound => Some(format!(
      "No installation found in {}. Run 'kb-create install' first.",
      platform_dir.display()
    )),
    ErrorKind::ConfigCorrupt => Some(format!(
      "The platform config in {} is unreadable. Reinstall to recreate it.",
      platform_dir.display()
    )),
    ErrorKind::Execution | ErrorKind::Filesystem => None,
  };
  match hint {
    Some(hint) => anyhow::Error::new(err).context(hint),
    None => anyhow::Error::new(err),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn explicit_platform_wins() {
    assert_eq!(
      resolve_platform_dir(Some("/opt/kb")).unwrap(),
      PathBuf::from("/opt/kb")
    );
  }

  #[test]
  fn package_manager_for_known_names() {
    assert_eq!(package_manager_for("npm").name(), "npm");
    assert_eq!(package_manager_for("pnpm").name(), "pnpm");
  }

  #[test]
  fn missing_snapshot_gets_install_hint() {
    let temp = TempDir::new().unwrap();

    let err = load_snapshot(temp.path()).unwrap_err();

    assert!(format!("{:#}", err).contains("Run 'kb-create install' first"));
  }

  #[test]
  fn corrupt_snapshot_gets_reinstall_hint() {
    let temp = TempDir::new().unwrap();
    let path = kb_create_lib::config::config_path(temp.path());
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "not json").unwrap();

    let err = load_snapshot(temp.path()).unwrap_err();

    assert!(format!("{:#}", err).contains("Reinstall"));
  }
}
