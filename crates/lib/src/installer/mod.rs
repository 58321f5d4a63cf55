//! Install and update orchestration.
//!
//! The [`Installer`] turns a [`Selection`] and a [`Manifest`] into package
//! manager calls, persists the platform snapshot, and later diffs and applies
//! a newer manifest against that snapshot.
//!
//! # Progress
//!
//! Each package-manager call gets a bounded progress channel. A drain task
//! forwards every line to the log sink and the optional `on_line` callback.
//! The call only returns after the sender is dropped and the drain task has
//! finished, so no buffered line is lost.
//!
//! # Failure policy
//!
//! A failed stage aborts the run and is reported with its [`Stage`]. The
//! snapshot is only written after every package-manager call succeeded.
//! Update is not transactional: if `update` fails after new packages were
//! added, the platform is ahead of its snapshot until the next update.

mod diff;
mod types;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{info, warn};

pub use diff::{UpdateDiff, compute_diff};
pub use types::*;

use crate::config::{ConfigStore, PlatformConfig};
use crate::log::LineSink;
use crate::manifest::Manifest;
use crate::paths::state_dir;
use crate::pm::{PROGRESS_BUFFER, PackageManager, PmError, Progress};
use crate::selection::Selection;

/// Stage callback: `(step, total, label)`.
pub type StepCallback = Arc<dyn Fn(usize, usize, &str) + Send + Sync>;

/// Receives each raw package-manager line.
pub type LineCallback = Arc<dyn Fn(&str) + Send + Sync>;

const INSTALL_STEPS: usize = 3;

#[derive(Debug, Clone, Copy)]
enum PmOp {
  Install,
  Update,
}

/// Orchestrates platform installation and updates.
pub struct Installer {
  pm: Arc<dyn PackageManager>,
  log: Arc<dyn LineSink>,
  on_step: Option<StepCallback>,
  on_line: Option<LineCallback>,
}

impl Installer {
  pub fn new(pm: Arc<dyn PackageManager>, log: Arc<dyn LineSink>) -> Self {
    Self {
      pm,
      log,
      on_step: None,
      on_line: None,
    }
  }

  /// Called at the start of each named stage.
  pub fn on_step(mut self, callback: impl Fn(usize, usize, &str) + Send + Sync + 'static) -> Self {
    self.on_step = Some(Arc::new(callback));
    self
  }

  /// Called for every non-empty package-manager output line.
  pub fn on_line(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
    self.on_line = Some(Arc::new(callback));
    self
  }

  /// Install core packages plus the selected components, then write the snapshot.
  ///
  /// All packages go to the package manager in one call so it can resolve the
  /// whole set at once.
  pub async fn install(&self, selection: &Selection, manifest: &Manifest) -> Result<InstallResult, InstallError> {
    let start = Instant::now();
    let pkgs = selection.package_refs(manifest);

    self.step(
      1,
      INSTALL_STEPS,
      &format!("Installing {} packages via {}", pkgs.len(), self.pm.name()),
    );
    self
      .run_group(PmOp::Install, &selection.platform_dir, &pkgs)
      .await
      .map_err(|source| InstallError::Package {
        stage: Stage::InstallPackages,
        source,
      })?;

    self.step(2, INSTALL_STEPS, "Writing config");
    let config = PlatformConfig::new(
      &selection.platform_dir,
      &selection.project_dir,
      self.pm.name(),
      manifest.clone(),
    );
    let config_path = ConfigStore::new(&selection.platform_dir)
      .save(&config)
      .map_err(|source| InstallError::Config {
        stage: Stage::WriteConfig,
        source,
      })?;

    self.step(3, INSTALL_STEPS, "Preparing project directory");
    let project_state = state_dir(&selection.project_dir);
    tokio::fs::create_dir_all(&project_state)
      .await
      .map_err(|source| InstallError::Filesystem {
        stage: Stage::PrepareProjectDir,
        path: project_state.clone(),
        source,
      })?;

    let duration = start.elapsed();
    info!(
      platform = %selection.platform_dir.display(),
      packages = pkgs.len(),
      duration_ms = duration.as_millis() as u64,
      "install complete"
    );

    Ok(InstallResult {
      platform_dir: selection.platform_dir.clone(),
      project_dir: selection.project_dir.clone(),
      config_path,
      duration,
    })
  }

  /// Compare the installed snapshot of `platform_dir` with `current`.
  ///
  /// Fails with [`ErrorKind::ConfigNotFound`] when nothing was installed.
  pub fn diff(&self, platform_dir: &Path, current: &Manifest) -> Result<UpdateDiff, InstallError> {
    let config = self.status(platform_dir)?;
    Ok(compute_diff(&config.manifest, current))
  }

  /// Load the snapshot of `platform_dir`.
  pub fn status(&self, platform_dir: &Path) -> Result<PlatformConfig, InstallError> {
    ConfigStore::new(platform_dir)
      .load()
      .map_err(|source| InstallError::Config {
        stage: Stage::LoadConfig,
        source,
      })
  }

  /// Apply `current` to an installed platform.
  ///
  /// New packages are added first, then every package in `current` is
  /// updated regardless of the original selection. The snapshot keeps its
  /// original `installed_at`; only the manifest is replaced.
  pub async fn update(&self, platform_dir: &Path, current: &Manifest) -> Result<UpdateResult, InstallError> {
    let start = Instant::now();
    let diff = self.diff(platform_dir, current)?;

    let total = if diff.added.is_empty() { 2 } else { 3 };
    let mut step = 0;

    if !diff.added.is_empty() {
      step += 1;
      self.step(step, total, &format!("Installing {} new packages", diff.added.len()));
      self.log.line(&format!("Installing new packages: {}", diff.added.join(" ")));
      self
        .run_group(PmOp::Install, platform_dir, &diff.added)
        .await
        .map_err(|source| InstallError::Package {
          stage: Stage::AddPackages,
          source,
        })?;
    }

    let all_pkgs = current.package_refs();
    step += 1;
    self.step(
      step,
      total,
      &format!("Updating {} packages via {}", all_pkgs.len(), self.pm.name()),
    );
    self
      .run_group(PmOp::Update, platform_dir, &all_pkgs)
      .await
      .map_err(|source| InstallError::Package {
        stage: Stage::UpdatePackages,
        source,
      })?;

    step += 1;
    self.step(step, total, "Writing config");
    let store = ConfigStore::new(platform_dir);
    let mut config = store.load().map_err(|source| InstallError::Config {
      stage: Stage::LoadConfig,
      source,
    })?;
    config.manifest = current.clone();
    store.save(&config).map_err(|source| InstallError::Config {
      stage: Stage::WriteConfig,
      source,
    })?;

    Ok(UpdateResult {
      diff,
      duration: start.elapsed(),
    })
  }

  fn step(&self, step: usize, total: usize, label: &str) {
    self.log.line(&format!("[{}/{}] {}", step, total, label));
    if let Some(on_step) = &self.on_step {
      on_step(step, total, label);
    }
  }

  /// Run one package-manager call while draining its progress channel.
  async fn run_group(&self, op: PmOp, dir: &Path, pkgs: &[String]) -> Result<(), PmError> {
    let (tx, mut rx) = mpsc::channel::<Progress>(PROGRESS_BUFFER);

    let log = Arc::clone(&self.log);
    let on_line = self.on_line.clone();
    let drain = tokio::spawn(async move {
      while let Some(progress) = rx.recv().await {
        if progress.line.is_empty() {
          continue;
        }
        log.line(&format!("  {}", progress.line));
        if let Some(on_line) = &on_line {
          on_line(&progress.line);
        }
      }
    });

    let result = match op {
      PmOp::Install => self.pm.install(dir, pkgs, &tx).await,
      PmOp::Update => self.pm.update(dir, pkgs, &tx).await,
    };

    // Closing the channel lets the drain task finish once it has flushed.
    drop(tx);
    if let Err(e) = drain.await {
      warn!(error = %e, "progress drain task failed");
    }

    result
  }
}
