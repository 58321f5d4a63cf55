//! Implementation of the `kb-create logs` command.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use kb_create_lib::log::latest_log_path;

use super::resolve_platform_dir;

/// How often `--follow` checks the log file for new content.
const FOLLOW_INTERVAL: Duration = Duration::from_millis(300);

/// Print the most recent install log, optionally following it like `tail -f`.
pub fn cmd_logs(platform: Option<&str>, follow: bool) -> Result<()> {
  let platform_dir = resolve_platform_dir(platform)?;
  let Some(path) = latest_log_path(&platform_dir) else {
    bail!("No install logs found in {}", platform_dir.display());
  };

  let mut file = File::open(&path).with_context(|| format!("Failed to open log: {}", path.display()))?;
  let mut stdout = io::stdout().lock();
  copy_new_content(&mut file, &mut stdout, &path)?;

  if !follow {
    return Ok(());
  }

  loop {
    thread::sleep(FOLLOW_INTERVAL);
    copy_new_content(&mut file, &mut stdout, &path)?;
  }
}

/// Copy everything after the current read position and flush.
fn copy_new_content(file: &mut File, out: &mut impl Write, path: &Path) -> Result<u64> {
  let mut buf = Vec::new();
  let read = file
    .read_to_end(&mut buf)
    .with_context(|| format!("Failed to read log: {}", path.display()))?;
  out.write_all(&buf)?;
  out.flush()?;
  Ok(read as u64)
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn copies_only_appended_content() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("install.log");
    std::fs::write(&path, "[1/3] Installing\n").unwrap();

    let mut file = File::open(&path).unwrap();
    let mut out = Vec::new();
    copy_new_content(&mut file, &mut out, &path).unwrap();
    assert_eq!(out, b"[1/3] Installing\n");

    let mut writer = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    writeln!(writer, "  added 3 packages").unwrap();

    out.clear();
    let read = copy_new_content(&mut file, &mut out, &path).unwrap();
    assert_eq!(read, 19);
    assert_eq!(out, b"  added 3 packages\n");
  }

  #[test]
  fn missing_logs_is_an_error() {
    let temp = TempDir::new().unwrap();
    let platform = temp.path().to_str().unwrap();

    let err = cmd_logs(Some(platform), false).unwrap_err();
    assert!(err.to_string().contains("No install logs found"));
  }
}
