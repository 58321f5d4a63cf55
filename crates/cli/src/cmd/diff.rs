//! Diff command implementation.
//!
//! Compares the installed snapshot with the current manifest.

use std::sync::Arc;

use anyhow::Result;

use kb_create_lib::installer::Installer;
use kb_create_lib::log::InstallLog;

use super::{ManifestArgs, explain, load_snapshot, package_manager_for, resolve_platform_dir, runtime};
use crate::output::{print_diff, print_json, print_success};

pub fn cmd_diff(manifest: &ManifestArgs, platform: Option<&str>, json: bool) -> Result<()> {
  let platform_dir = resolve_platform_dir(platform)?;
  let config = load_snapshot(&platform_dir)?;
  let current = manifest.load(&runtime()?)?;

  let installer = Installer::new(package_manager_for(&config.pm), Arc::new(InstallLog::discard()));
  let diff = installer
    .diff(&platform_dir, &current)
    .map_err(|e| explain(e, &platform_dir))?;

  if json {
    print_json(&diff)?;
  } else if diff.has_changes() {
    print_diff(&diff);
  } else {
    print_success("Already up to date");
  }

  Ok(())
}
