//! Implementation of the `kb-create install` command.
//!
//! Installs core packages plus the chosen services and plugins into the
//! platform directory and records the result as the platform snapshot.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use owo_colors::{OwoColorize, Stream};

use kb_create_lib::installer::{InstallResult, Installer};
use kb_create_lib::log::{InstallLog, LineSink};
use kb_create_lib::manifest::Manifest;
use kb_create_lib::paths::{default_platform_dir, expand_home};
use kb_create_lib::pm::{self, PackageManager};
use kb_create_lib::selection::Selection;

use super::{ManifestArgs, PmChoice, runtime};
use crate::output::{Spinner, format_duration, print_info, print_stat, print_warning, symbols};

#[derive(Debug, Clone, Default, Args)]
pub struct InstallArgs {
  /// Project directory (default: current directory)
  pub project: Option<PathBuf>,

  /// Also install every component the manifest marks as default
  #[arg(short, long)]
  pub yes: bool,

  /// Service id to install (repeatable)
  #[arg(long = "service", value_name = "ID")]
  pub services: Vec<String>,

  /// Plugin id to install (repeatable)
  #[arg(long = "plugin", value_name = "ID")]
  pub plugins: Vec<String>,

  /// Package manager (default: pnpm when available, otherwise npm)
  #[arg(long, value_enum)]
  pub pm: Option<PmChoice>,

  #[command(flatten)]
  pub manifest: ManifestArgs,
}

/// Execute the install command.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded, the platform directory
/// cannot be created, or any install stage fails.
pub fn cmd_install(args: &InstallArgs, platform: Option<&str>) -> Result<()> {
  let start = Instant::now();
  let rt = runtime()?;

  let project_dir = match &args.project {
    Some(dir) => std::path::absolute(dir).with_context(|| format!("Invalid project directory: {}", dir.display()))?,
    None => std::env::current_dir().context("Failed to read current directory")?,
  };
  let platform_dir = platform.map(expand_home).unwrap_or_else(default_platform_dir);

  let manifest = args.manifest.load(&rt)?;
  let selection = build_selection(&manifest, args, platform_dir, project_dir);

  std::fs::create_dir_all(&selection.platform_dir)
    .with_context(|| format!("Failed to create platform directory: {}", selection.platform_dir.display()))?;
  let log = Arc::new(InstallLog::create(&selection.platform_dir).context("Failed to create install log")?);

  let pm: Arc<dyn PackageManager> = match args.pm {
    Some(choice) => pm::by_name(choice.name()).unwrap_or_else(pm::detect),
    None => pm::detect(),
  };
  log.line(&format!("Using {}", pm.name()));

  println!();
  let spinner = Spinner::start();
  let installer = Installer::new(pm, log.clone())
    .on_step({
      let spinner = spinner.clone();
      move |step, total, label| spinner.set_label(format!("[{}/{}] {}", step, total, label))
    })
    .on_line({
      let spinner = spinner.clone();
      move |line| spinner.set_detail(line)
    });

  let result = rt.block_on(installer.install(&selection, &manifest));
  spinner.finish(result.is_ok());

  let result = result.with_context(|| match log.path() {
    Some(path) => format!("Installation failed, see {}", path.display()),
    None => "Installation failed".to_string(),
  })?;

  print_summary(&result, start);
  Ok(())
}

/// Selected components: defaults with `--yes`, plus anything named explicitly.
fn build_selection(manifest: &Manifest, args: &InstallArgs, platform_dir: PathBuf, project_dir: PathBuf) -> Selection {
  let mut selection = if args.yes {
    Selection::with_defaults(manifest, platform_dir, project_dir)
  } else {
    Selection::new(platform_dir, project_dir)
  };

  for id in &args.services {
    if manifest.service(id).is_none() {
      print_warning(&format!("Unknown service '{}', skipping", id));
    }
    selection = selection.with_service(id.as_str());
  }
  for id in &args.plugins {
    if manifest.plugin(id).is_none() {
      print_warning(&format!("Unknown plugin '{}', skipping", id));
    }
    selection = selection.with_plugin(id.as_str());
  }

  selection
}

fn print_summary(result: &InstallResult, start: Instant) {
  println!();
  println!(
    "{} {}  {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    "Installation complete".if_supports_color(Stream::Stdout, |s| s.bold()),
    format!("({})", format_duration(start.elapsed())).if_supports_color(Stream::Stdout, |s| s.dimmed())
  );
  println!();
  print_stat("Platform", &result.platform_dir.display().to_string());
  print_stat("Project", &result.project_dir.display().to_string());
  print_stat("Config", &result.config_path.display().to_string());
  println!();
  print_info(&format!("Next steps: cd {} && kb dev:start", result.project_dir.display()));
}
