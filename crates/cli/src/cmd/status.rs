//! Status command implementation.
//!
//! Displays the installed snapshot: directories, package manager, install
//! time, manifest version and the packages it covers.

use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};

use kb_create_lib::config::PlatformConfig;
use kb_create_lib::manifest::Component;
use kb_create_lib::pm::InstalledPackage;

use super::{load_snapshot, package_manager_for, resolve_platform_dir, runtime};
use crate::output::{print_json, print_stat, symbols};

pub fn cmd_status(platform: Option<&str>, json: bool, installed: bool) -> Result<()> {
  let platform_dir = resolve_platform_dir(platform)?;
  let config = load_snapshot(&platform_dir)?;

  let packages = if installed {
    let pm = package_manager_for(&config.pm);
    let list = runtime()?
      .block_on(pm.list_installed(&platform_dir))
      .with_context(|| format!("Failed to list packages via {}", pm.name()))?;
    Some(list)
  } else {
    None
  };

  if json {
    let mut output = serde_json::to_value(&config).context("Failed to serialize config")?;
    if let (Some(packages), Some(object)) = (&packages, output.as_object_mut()) {
      let list: Vec<_> = packages
        .iter()
        .map(|p| serde_json::json!({ "name": p.name, "version": p.version }))
        .collect();
      object.insert("installed".to_string(), serde_json::Value::Array(list));
    }
    print_json(&output)?;
  } else {
    print_human_status(&config, packages.as_deref());
  }

  Ok(())
}

fn print_human_status(config: &PlatformConfig, installed: Option<&[InstalledPackage]>) {
  println!();
  print_stat("Platform", &config.platform.display().to_string());
  print_stat("Project", &config.cwd.display().to_string());
  print_stat("PM", &config.pm);
  print_stat("Installed", &config.installed_at.format("%Y-%m-%d %H:%M").to_string());
  print_stat("Manifest", &config.manifest.version);

  println!();
  println!("Core packages:");
  for pkg in &config.manifest.core {
    println!("  {} {}", bullet(), pkg.name);
  }

  print_components("Services", &config.manifest.services);
  print_components("Plugins", &config.manifest.plugins);

  if let Some(installed) = installed {
    println!();
    println!("Installed ({}):", installed.len());
    for pkg in installed {
      println!(
        "  {} {} {}",
        bullet(),
        pkg.name,
        pkg.version.if_supports_color(Stream::Stdout, |s| s.dimmed())
      );
    }
  }
  println!();
}

fn print_components(title: &str, components: &[Component]) {
  if components.is_empty() {
    return;
  }
  println!();
  println!("{}:", title);
  for c in components {
    println!(
      "  {} {:<15} {}",
      bullet(),
      c.id,
      c.description.if_supports_color(Stream::Stdout, |s| s.dimmed())
    );
  }
}

fn bullet() -> String {
  symbols::BULLET
    .if_supports_color(Stream::Stdout, |s| s.green())
    .to_string()
}
