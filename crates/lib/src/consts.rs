//! Crate-wide constants.

/// Application name, used in paths and output.
pub const APP_NAME: &str = "gearbox";

/// Sentinel file name searched for in the working directory and its ancestors.
pub const GLOBAL_CONFIG_FILENAME: &str = ".gearbox.json";

/// Default manifest file name, looked up in the working directory.
pub const DEFAULT_BUILD_FILE: &str = "build.json";

/// Default artifact output directory, relative to the working directory.
pub const DEFAULT_BUILD_DIR: &str = "build";

/// Whether the global config file search is on when the caller says nothing.
pub const DEFAULT_GLOBAL_CONFIG: bool = true;
