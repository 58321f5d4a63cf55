//! Package-manager capability.
//!
//! The installer talks to npm-compatible tools only through the
//! [`PackageManager`] trait. Backends stream every non-blank output line as a
//! [`Progress`] value while the external process runs.
//!
//! Backends are not interchangeable verb for verb: npm's `install` is
//! additive and idempotent, while pnpm distinguishes `add` from `update`.
//! Callers must use `install` for new packages and `update` for refreshing
//! already-tracked ones.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

mod npm;
mod pnpm;
mod process;
#[cfg(test)]
mod testutil;
mod types;

pub use npm::NpmManager;
pub use pnpm::PnpmManager;
pub use types::*;

/// Abstract install/update/list operations over an external package tool.
///
/// Implementations send progress lines through the borrowed sender and must
/// not keep clones of it after returning, so the caller can close the channel
/// once the call completes.
#[async_trait]
pub trait PackageManager: Send + Sync {
  /// Stable backend identifier, persisted in the platform snapshot.
  fn name(&self) -> &str;

  /// Install `pkgs` into `dir`. Re-installing present packages is not an error.
  async fn install(&self, dir: &Path, pkgs: &[String], progress: &ProgressSender) -> Result<(), PmError>;

  /// Bring already-installed `pkgs` in `dir` up to date.
  async fn update(&self, dir: &Path, pkgs: &[String], progress: &ProgressSender) -> Result<(), PmError>;

  /// Packages present in `dir`. Empty when nothing is installed yet.
  async fn list_installed(&self, dir: &Path) -> Result<Vec<InstalledPackage>, PmError>;
}

/// Pick pnpm when it is on `PATH`, otherwise npm.
pub fn detect() -> Arc<dyn PackageManager> {
  if which::which("pnpm").is_ok() {
    debug!("pnpm found on PATH");
    return Arc::new(PnpmManager::new());
  }
  debug!("pnpm not found, using npm");
  Arc::new(NpmManager::new())
}

/// Backend by its [`PackageManager::name`].
pub fn by_name(name: &str) -> Option<Arc<dyn PackageManager>> {
  match name {
    "npm" => Some(Arc::new(NpmManager::new())),
    "pnpm" => Some(Arc::new(PnpmManager::new())),
    _ => None,
  }
}
