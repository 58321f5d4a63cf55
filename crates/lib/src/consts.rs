/// Name used for the platform state directory and the default install root.
pub const APP_NAME: &str = "kb-platform";

/// State directory created inside both the platform and the project directory.
pub const STATE_DIR: &str = ".kb";

/// Snapshot file name inside [`STATE_DIR`].
pub const CONFIG_FILENAME: &str = "kb.config.json";

/// Log directory name inside [`STATE_DIR`].
pub const LOGS_DIR: &str = "logs";
