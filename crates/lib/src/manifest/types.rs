//! Manifest types.
//!
//! The JSON layout matches the published catalog:
//!
//! ```json
//! {
//!   "version": "1.4.0",
//!   "registryUrl": "https://registry.npmjs.org",
//!   "core": [{ "name": "@kb-labs/cli-bin" }],
//!   "services": [{ "id": "rest", "pkg": "@kb-labs/rest-api", "description": "REST API", "default": true }],
//!   "plugins": []
//! }
//! ```
//!
//! `pkg` is the package reference handed to the package manager and the only
//! key used when comparing manifests. `id` is a selection handle.

use serde::{Deserialize, Serialize};

/// A core package, always installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
  pub name: String,
}

/// An optional service or plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
  pub id: String,
  pub pkg: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub default: bool,
}

/// Everything the platform can install.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
  #[serde(default)]
  pub version: String,
  #[serde(default)]
  pub registry_url: String,
  #[serde(default)]
  pub core: Vec<Package>,
  #[serde(default)]
  pub services: Vec<Component>,
  #[serde(default)]
  pub plugins: Vec<Component>,
}

impl Manifest {
  /// Package names of the core set, in manifest order.
  pub fn core_package_names(&self) -> Vec<String> {
    self.core.iter().map(|p| p.name.clone()).collect()
  }

  /// Every package reference in the manifest: core, then services, then plugins.
  ///
  /// Selection does not apply here. Updates use this to refresh everything a
  /// platform tracks.
  pub fn package_refs(&self) -> Vec<String> {
    let mut refs = self.core_package_names();
    refs.extend(self.components().map(|c| c.pkg.clone()));
    refs
  }

  /// Services followed by plugins.
  pub fn components(&self) -> impl Iterator<Item = &Component> {
    self.services.iter().chain(self.plugins.iter())
  }

  pub fn service(&self, id: &str) -> Option<&Component> {
    self.services.iter().find(|c| c.id == id)
  }

  pub fn plugin(&self, id: &str) -> Option<&Component> {
    self.plugins.iter().find(|c| c.id == id)
  }
}
