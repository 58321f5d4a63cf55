//! Implementation of the `kb-create update` command.
//!
//! Shows what changed between the installed snapshot and the current
//! manifest, then adds new packages and updates everything after
//! confirmation.

use std::sync::Arc;

use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};

use kb_create_lib::installer::Installer;
use kb_create_lib::log::InstallLog;

use super::{ManifestArgs, explain, load_snapshot, package_manager_for, resolve_platform_dir, runtime};
use crate::output::{Spinner, format_duration, print_diff, print_info, print_success, symbols};
use crate::prompts::confirm;

/// Execute the update command.
///
/// # Errors
///
/// Returns an error if nothing is installed, the manifest cannot be loaded,
/// or a package-manager call fails.
pub fn cmd_update(manifest: &ManifestArgs, platform: Option<&str>, yes: bool) -> Result<()> {
  let platform_dir = resolve_platform_dir(platform)?;
  let config = load_snapshot(&platform_dir)?;
  let rt = runtime()?;
  let current = manifest.load(&rt)?;

  let log = Arc::new(InstallLog::create(&platform_dir).context("Failed to create install log")?);
  let installer = Installer::new(package_manager_for(&config.pm), log.clone());

  print_info("Checking for updates...");
  let diff = installer
    .diff(&platform_dir, &current)
    .map_err(|e| explain(e, &platform_dir))?;

  if !diff.has_changes() {
    print_success("Already up to date");
    return Ok(());
  }

  print_diff(&diff);

  if !confirm("Apply updates?", yes)? {
    println!("Cancelled.");
    return Ok(());
  }

  let spinner = Spinner::start();
  let installer = installer
    .on_step({
      let spinner = spinner.clone();
      move |step, total, label| spinner.set_label(format!("[{}/{}] {}", step, total, label))
    })
    .on_line({
      let spinner = spinner.clone();
      move |line| spinner.set_detail(line)
    });

  let result = rt.block_on(installer.update(&platform_dir, &current));
  spinner.finish(result.is_ok());

  let result = result.with_context(|| match log.path() {
    Some(path) => format!("Update failed, see {}", path.display()),
    None => "Update failed".to_string(),
  })?;

  println!();
  println!(
    "{} {}  {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    "Update complete".if_supports_color(Stream::Stdout, |s| s.bold()),
    format!("({})", format_duration(result.duration)).if_supports_color(Stream::Stdout, |s| s.dimmed())
  );

  Ok(())
}
