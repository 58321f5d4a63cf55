//! Helpers for exercising backends against stub executables.

use std::future::Future;
use std::path::{Path, PathBuf};

use tokio::sync::mpsc;

use super::types::{PROGRESS_BUFFER, PmError, Progress, ProgressSender};

/// Write an executable `/bin/sh` script named `stub.sh` into `dir`.
#[cfg(unix)]
pub fn stub_program(dir: &Path, body: &str) -> PathBuf {
  use std::os::unix::fs::PermissionsExt;

  let path = dir.join("stub.sh");
  std::fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
  std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
  path
}

/// Run `op` with a fresh progress channel and return every line it sent.
pub async fn collect_lines<F, Fut>(op: F) -> Result<Vec<String>, PmError>
where
  F: FnOnce(ProgressSender) -> Fut,
  Fut: Future<Output = Result<(), PmError>>,
{
  let (tx, mut rx) = mpsc::channel::<Progress>(PROGRESS_BUFFER);
  let drain = tokio::spawn(async move {
    let mut lines = Vec::new();
    while let Some(progress) = rx.recv().await {
      lines.push(progress.line);
    }
    lines
  });

  let result = op(tx).await;
  let lines = drain.await.unwrap();
  result.map(|()| lines)
}
