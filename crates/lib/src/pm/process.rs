//! Process plumbing shared by the npm and pnpm backends.

use std::io;
use std::path::Path;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, info};

use super::types::{PmError, Progress, ProgressSender};

const PACKAGE_JSON: &str = "package.json";
const PACKAGE_JSON_CONTENT: &str = "{\"name\":\"kb-platform\",\"version\":\"1.0.0\",\"private\":true}\n";

/// Create `dir` and a minimal `package.json` inside it unless one exists.
pub(crate) async fn ensure_package_json(dir: &Path) -> Result<(), PmError> {
  tokio::fs::create_dir_all(dir).await?;

  let path = dir.join(PACKAGE_JSON);
  if tokio::fs::try_exists(&path).await? {
    return Ok(());
  }

  debug!(path = %path.display(), "writing minimal package.json");
  tokio::fs::write(&path, PACKAGE_JSON_CONTENT).await?;
  Ok(())
}

/// Run `program args…` in `dir`, forwarding stdout and stderr lines as progress.
///
/// Both streams are drained concurrently until EOF before the exit status is
/// collected. Ordering is preserved per stream only.
pub(crate) async fn run_streaming(
  program: &Path,
  args: &[String],
  dir: &Path,
  progress: &ProgressSender,
) -> Result<(), PmError> {
  let program_name = program.display().to_string();
  info!(program = %program_name, args = ?args, dir = %dir.display(), "running package manager");

  let mut child = Command::new(program)
    .args(args)
    .current_dir(dir)
    .stdin(Stdio::null())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .kill_on_drop(true)
    .spawn()
    .map_err(|source| PmError::Spawn {
      program: program_name.clone(),
      source,
    })?;

  let stdout = child.stdout.take();
  let stderr = child.stderr.take();

  let (stdout_result, stderr_result) = tokio::join!(forward_lines(stdout, progress), forward_lines(stderr, progress));
  finish(&mut child, &program_name, stdout_result, stderr_result).await
}

/// Reap `child`, then report read errors before the exit status.
async fn finish(
  child: &mut Child,
  program_name: &str,
  stdout_result: io::Result<Option<String>>,
  stderr_result: io::Result<Option<String>>,
) -> Result<(), PmError> {
  let status = child.wait().await;
  stdout_result?;
  let last_stderr = stderr_result?;

  let status = status?;
  if !status.success() {
    return Err(PmError::CommandFailed {
      program: program_name.to_string(),
      code: status.code(),
      detail: last_stderr.unwrap_or_default(),
    });
  }

  debug!(program = %program_name, "package manager finished");
  Ok(())
}

/// Run `program args…` in `dir` and return its stdout.
///
/// A non-zero exit is tolerated as long as something was printed: list
/// commands exit non-zero on peer dependency warnings but still emit JSON.
pub(crate) async fn run_captured(program: &Path, args: &[String], dir: &Path) -> Result<Vec<u8>, PmError> {
  let program_name = program.display().to_string();
  debug!(program = %program_name, args = ?args, "capturing package manager output");

  let output = Command::new(program)
    .args(args)
    .current_dir(dir)
    .stdin(Stdio::null())
    .output()
    .await
    .map_err(|source| PmError::Spawn {
      program: program_name.clone(),
      source,
    })?;

  if !output.status.success() && output.stdout.is_empty() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    return Err(PmError::CommandFailed {
      program: program_name,
      code: output.status.code(),
      detail: last_non_blank(&stderr).unwrap_or_default(),
    });
  }

  Ok(output.stdout)
}

/// Forward non-blank lines from `reader`, returning the last one seen.
async fn forward_lines<R>(reader: Option<R>, progress: &ProgressSender) -> io::Result<Option<String>>
where
  R: AsyncRead + Unpin,
{
  let Some(reader) = reader else {
    return Ok(None);
  };

  let mut segments = BufReader::new(reader).split(b'\n');
  let mut last = None;

  while let Some(segment) = segments.next_segment().await? {
    let line = String::from_utf8_lossy(&segment);
    let line = line.trim_end_matches('\r');
    if line.trim().is_empty() {
      continue;
    }

    last = Some(line.to_string());
    // A closed receiver must not stop draining, or the child blocks on a full pipe.
    let _ = progress.send(Progress::line(line)).await;
  }

  Ok(last)
}

fn last_non_blank(text: &str) -> Option<String> {
  text
    .lines()
    .rev()
    .find(|l| !l.trim().is_empty())
    .map(|l| l.trim_end().to_string())
}
