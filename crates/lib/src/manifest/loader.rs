//! Manifest loading with a remote, local, embedded fallback chain.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use super::types::Manifest;

/// Manifest shipped inside the binary.
const EMBEDDED_MANIFEST: &str = include_str!("default.json");

/// Timeout for the remote fetch when [`LoadOptions::timeout`] is unset.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur while loading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("failed to read manifest override {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse manifest: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("failed to fetch manifest from {url}: {message}")]
  Fetch { url: String, message: String },
}

/// Where to load the manifest from.
///
/// The default value loads the embedded manifest only.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
  /// Tried first. Any failure falls through to the next source.
  pub remote_url: Option<String>,
  /// Tried after the remote. A missing file falls through; a broken one is fatal.
  pub local_override: Option<PathBuf>,
  /// Remote fetch timeout, [`DEFAULT_FETCH_TIMEOUT`] when unset.
  pub timeout: Option<Duration>,
}

impl Manifest {
  /// Load a manifest: remote URL, then local override, then embedded default.
  pub async fn load(options: &LoadOptions) -> Result<Manifest, ManifestError> {
    if let Some(url) = &options.remote_url {
      match fetch_remote(url, options.timeout.unwrap_or(DEFAULT_FETCH_TIMEOUT)).await {
        Ok(manifest) => return Ok(manifest),
        Err(e) => warn!(url = %url, error = %e, "remote manifest unavailable, falling back"),
      }
    }

    if let Some(path) = &options.local_override {
      if let Some(manifest) = load_override(path)? {
        return Ok(manifest);
      }
      debug!(path = %path.display(), "manifest override not found, using embedded manifest");
    }

    Self::embedded()
  }

  /// Parse the manifest embedded in the binary.
  pub fn embedded() -> Result<Manifest, ManifestError> {
    Self::from_json(EMBEDDED_MANIFEST)
  }

  pub fn from_json(content: &str) -> Result<Manifest, ManifestError> {
    Ok(serde_json::from_str(content)?)
  }
}

/// Returns `Ok(None)` when the override file does not exist.
fn load_override(path: &Path) -> Result<Option<Manifest>, ManifestError> {
  match std::fs::read_to_string(path) {
    Ok(content) => Manifest::from_json(&content).map(Some),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
    Err(source) => Err(ManifestError::Read {
      path: path.to_path_buf(),
      source,
    }),
  }
}

async fn fetch_remote(url: &str, timeout: Duration) -> Result<Manifest, ManifestError> {
  let fetch_err = |message: String| ManifestError::Fetch {
    url: url.to_string(),
    message,
  };

  let client = reqwest::Client::builder()
    .timeout(timeout)
    .build()
    .map_err(|e| fetch_err(e.to_string()))?;

  let response = client.get(url).send().await.map_err(|e| fetch_err(e.to_string()))?;
  if !response.status().is_success() {
    return Err(fetch_err(format!("status {}", response.status())));
  }

  let body = response.text().await.map_err(|e| fetch_err(e.to_string()))?;
  Manifest::from_json(&body)
}
