//! Diff between an installed snapshot's manifest and a candidate manifest.
//!
//! Packages are compared by reference only. Every package present in both
//! manifests is reported as updated: installed versions are never queried,
//! so "present in both" means "may have changed".

use std::collections::BTreeSet;

use serde::Serialize;

use crate::manifest::Manifest;

/// Classification of package references. Lists are sorted.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateDiff {
  /// In both manifests.
  pub updated: Vec<String>,
  /// Only in the candidate manifest.
  pub added: Vec<String>,
  /// Only in the installed manifest.
  pub removed: Vec<String>,
}

impl UpdateDiff {
  /// Returns true if there is anything to update.
  pub fn has_changes(&self) -> bool {
    !(self.updated.is_empty() && self.added.is_empty() && self.removed.is_empty())
  }
}

/// Compute the diff from `installed` to `candidate`.
///
/// # Diff Logic
///
/// - In candidate but not installed → `added`
/// - In both → `updated`
/// - In installed but not candidate → `removed`
pub fn compute_diff(installed: &Manifest, candidate: &Manifest) -> UpdateDiff {
  let installed_set = package_set(installed);
  let candidate_set = package_set(candidate);

  UpdateDiff {
    updated: candidate_set.intersection(&installed_set).cloned().collect(),
    added: candidate_set.difference(&installed_set).cloned().collect(),
    removed: installed_set.difference(&candidate_set).cloned().collect(),
  }
}

fn package_set(manifest: &Manifest) -> BTreeSet<String> {
  manifest.package_refs().into_iter().collect()
}
