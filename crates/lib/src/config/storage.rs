//! Snapshot storage.
//!
//! # Storage Layout
//!
//! ```text
//! {platform}/.kb/
//! ├── kb.config.json       # PlatformConfig
//! └── kb.config.json.tmp   # transient, only during a write
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::types::{CONFIG_VERSION, ConfigError, PlatformConfig};
use crate::consts::{CONFIG_FILENAME, STATE_DIR};

/// Path of the snapshot file for `platform_dir`.
pub fn config_path(platform_dir: &Path) -> PathBuf {
  platform_dir.join(STATE_DIR).join(CONFIG_FILENAME)
}

/// Reads and writes the snapshot of one platform directory.
///
/// Writes go to a temporary file that is renamed over the target, so readers
/// only ever see a complete record.
#[derive(Debug, Clone)]
pub struct ConfigStore {
  platform_dir: PathBuf,
}

impl ConfigStore {
  pub fn new(platform_dir: impl Into<PathBuf>) -> Self {
    Self {
      platform_dir: platform_dir.into(),
    }
  }

  pub fn platform_dir(&self) -> &Path {
    &self.platform_dir
  }

  pub fn path(&self) -> PathBuf {
    config_path(&self.platform_dir)
  }

  fn temp_path(&self) -> PathBuf {
    self.platform_dir.join(STATE_DIR).join(format!("{}.tmp", CONFIG_FILENAME))
  }

  /// Load the snapshot.
  ///
  /// A missing file is [`ConfigError::NotFound`]; an unparsable one is
  /// [`ConfigError::Parse`], never treated as absent.
  pub fn load(&self) -> Result<PlatformConfig, ConfigError> {
    let path = self.path();

    let content = match fs::read_to_string(&path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(ConfigError::NotFound { path }),
      Err(e) => return Err(ConfigError::Read(e)),
    };

    let config: PlatformConfig = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.clone(),
      source,
    })?;

    // No migrations exist yet; other versions are used as read.
    if config.version != CONFIG_VERSION {
      debug!(version = config.version, path = %path.display(), "config schema version differs");
    }

    Ok(config)
  }

  /// Load the snapshot, or `Ok(None)` when none exists.
  pub fn load_if_exists(&self) -> Result<Option<PlatformConfig>, ConfigError> {
    match self.load() {
      Ok(config) => Ok(Some(config)),
      Err(ConfigError::NotFound { .. }) => Ok(None),
      Err(e) => Err(e),
    }
  }

  /// Replace the snapshot with `config`. Returns the file path.
  pub fn save(&self, config: &PlatformConfig) -> Result<PathBuf, ConfigError> {
    let dir = self.platform_dir.join(STATE_DIR);
    fs::create_dir_all(&dir).map_err(ConfigError::CreateDir)?;

    let path = self.path();
    let temp_path = self.temp_path();

    let content = serde_json::to_string_pretty(config).map_err(ConfigError::Serialize)?;
    fs::write(&temp_path, &content).map_err(ConfigError::Write)?;
    fs::rename(&temp_path, &path).map_err(ConfigError::Write)?;

    debug!(path = %path.display(), "config saved");
    Ok(path)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::manifest::{Manifest, Package};
  use tempfile::TempDir;

  fn temp_store() -> (TempDir, ConfigStore) {
    let temp_dir = TempDir::new().unwrap();
    let store = ConfigStore::new(temp_dir.path());
    (temp_dir, store)
  }

  fn make_config(store: &ConfigStore, version: &str) -> PlatformConfig {
    let manifest = Manifest {
      version: version.to_string(),
      core: vec![Package {
        name: "@kb-labs/cli-bin".to_string(),
      }],
      ..Default::default()
    };
    PlatformConfig::new(store.platform_dir(), Path::new("/work/app"), "npm", manifest)
  }

  #[test]
  fn config_path_layout() {
    assert_eq!(
      config_path(Path::new("/opt/kb")),
      PathBuf::from("/opt/kb").join(".kb").join("kb.config.json")
    );
  }

  #[test]
  fn save_and_load_roundtrip() {
    let (_temp, store) = temp_store();
    let config = make_config(&store, "1.0.0");

    let path = store.save(&config).unwrap();
    assert_eq!(path, store.path());

    let loaded = store.load().unwrap();
    assert_eq!(loaded, config);
  }

  #[test]
  fn load_missing_is_not_found() {
    let (_temp, store) = temp_store();
    assert!(matches!(store.load(), Err(ConfigError::NotFound { .. })));
    assert!(store.load_if_exists().unwrap().is_none());
  }

  #[test]
  fn save_overwrites_whole_record() {
    let (_temp, store) = temp_store();
    store.save(&make_config(&store, "1.0.0")).unwrap();

    let replacement = make_config(&store, "2.0.0");
    store.save(&replacement).unwrap();

    assert_eq!(store.load().unwrap(), replacement);
    assert!(!store.temp_path().exists());
  }

  #[test]
  fn load_handles_corrupted_json() {
    let (_temp, store) = temp_store();
    fs::create_dir_all(store.path().parent().unwrap()).unwrap();
    fs::write(store.path(), "not valid json {{{").unwrap();

    let result = store.load();
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
    // Corrupt is never reported as absent.
    assert!(store.load_if_exists().is_err());
  }

  #[test]
  fn load_handles_wrong_schema() {
    let (_temp, store) = temp_store();
    fs::create_dir_all(store.path().parent().unwrap()).unwrap();
    fs::write(store.path(), r#"{"foo": "bar"}"#).unwrap();

    assert!(matches!(store.load(), Err(ConfigError::Parse { .. })));
  }

  #[test]
  fn load_keeps_other_schema_versions_verbatim() {
    let (_temp, store) = temp_store();
    let mut config = make_config(&store, "1.0.0");
    config.version = 0;
    store.save(&config).unwrap();

    assert_eq!(store.load().unwrap().version, 0);
  }
}
