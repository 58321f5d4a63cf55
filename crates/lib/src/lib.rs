//! kb-create-lib: installer core for the kb-labs platform
//!
//! This crate provides the pieces the `kb-create` CLI is built from:
//! - `Manifest`: the catalog of core packages, services and plugins
//! - `PackageManager`: npm and pnpm backends with streamed progress
//! - `PlatformConfig`: the snapshot written after a successful install
//! - `Installer`: install, diff and update orchestration

pub mod config;
pub mod consts;
pub mod installer;
pub mod log;
pub mod manifest;
pub mod paths;
pub mod pm;
pub mod selection;
