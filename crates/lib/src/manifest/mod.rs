//! Platform manifest: the catalog of installable packages.
//!
//! A manifest splits packages into always-installed `core` packages and
//! independently selectable `services` and `plugins`. The installer never
//! produces manifests; it loads them through [`Manifest::load`] and stores a
//! copy in the platform snapshot.

mod loader;
mod types;

pub use loader::{DEFAULT_FETCH_TIMEOUT, LoadOptions, ManifestError};
pub use types::*;
