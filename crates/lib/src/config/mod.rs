//! Platform configuration snapshot.
//!
//! The snapshot records which manifest was active when the platform was last
//! installed or updated. It lives at `<platform>/.kb/kb.config.json` and is
//! always replaced as a whole.

mod storage;
mod types;

pub use storage::{ConfigStore, config_path};
pub use types::*;
