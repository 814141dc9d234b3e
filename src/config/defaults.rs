//! Default configuration values
//!
//! Single source of truth for defaults, environment variable names and
//! well-known paths.

use std::env;
use std::path::PathBuf;

/// Environment variable prefix for all settings (`KUBE_ENDPOINT_STORE_DIR`, ...)
pub const ENV_PREFIX: &str = "KUBE_ENDPOINT";

/// Environment variable naming an explicit settings file
pub const CONFIG_FILE_ENV: &str = "KUBE_ENDPOINT_CONFIG_FILE";

/// Default settings file name
pub const DEFAULT_CONFIG_FILE: &str = "kube-endpoint.json";

/// Store directory, relative to the home directory
pub const STORE_DIR_NAME: &str = ".kube-endpoint";

/// Default log level as string
pub const LOG_LEVEL_STR: &str = "info";

/// Environment variable listing kubeconfig files, as kubectl reads it
pub const KUBECONFIG_ENV: &str = "KUBECONFIG";

/// Kubeconfig location relative to the home directory
pub const RECOMMENDED_KUBECONFIG: &str = ".kube/config";

/// The user's home directory
pub fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
}

/// Default store directory
pub fn store_dir() -> PathBuf {
    match home_dir() {
        Some(home) => home.join(STORE_DIR_NAME),
        None => PathBuf::from(STORE_DIR_NAME),
    }
}

/// Default log level
pub fn log_level() -> String {
    LOG_LEVEL_STR.to_string()
}
