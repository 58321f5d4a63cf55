//! What a caller chose to install.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::manifest::{Component, Manifest};

/// Target directories and chosen optional component ids for one run.
///
/// Unknown ids are tolerated and contribute no package. Ids are sets, so
/// choosing the same component twice has no further effect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
  /// Where the platform packages are installed.
  pub platform_dir: PathBuf,
  /// The caller's own working directory.
  pub project_dir: PathBuf,
  pub services: BTreeSet<String>,
  pub plugins: BTreeSet<String>,
}

impl Selection {
  /// A selection with no optional components.
  pub fn new(platform_dir: impl Into<PathBuf>, project_dir: impl Into<PathBuf>) -> Self {
    Self {
      platform_dir: platform_dir.into(),
      project_dir: project_dir.into(),
      ..Default::default()
    }
  }

  /// Pre-select every component the manifest marks as default.
  pub fn with_defaults(manifest: &Manifest, platform_dir: impl Into<PathBuf>, project_dir: impl Into<PathBuf>) -> Self {
    let mut selection = Self::new(platform_dir, project_dir);
    selection.services = default_ids(&manifest.services);
    selection.plugins = default_ids(&manifest.plugins);
    selection
  }

  pub fn with_service(mut self, id: impl Into<String>) -> Self {
    self.services.insert(id.into());
    self
  }

  pub fn with_plugin(mut self, id: impl Into<String>) -> Self {
    self.plugins.insert(id.into());
    self
  }

  /// Packages to install: all core packages plus the chosen components, in
  /// manifest order.
  pub fn package_refs(&self, manifest: &Manifest) -> Vec<String> {
    let mut refs = manifest.core_package_names();
    refs.extend(selected_packages(&manifest.services, &self.services));
    refs.extend(selected_packages(&manifest.plugins, &self.plugins));
    refs
  }
}

fn default_ids(components: &[Component]) -> BTreeSet<String> {
  components.iter().filter(|c| c.default).map(|c| c.id.clone()).collect()
}

fn selected_packages(components: &[Component], ids: &BTreeSet<String>) -> Vec<String> {
  components
    .iter()
    .filter(|c| ids.contains(&c.id))
    .map(|c| c.pkg.clone())
    .collect()
}
